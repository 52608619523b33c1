use bimap::BiMap;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Weekday};
use rand::{seq::SliceRandom, Rng};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use api::models::{Class, Course, Id};
use api::normalize;

const NIGHT_SHIFT: &str = "noche";

/// Spanish weekday names (lowercase, unaccented) numbered from Sunday = 0.
pub struct WeekdayNames(BiMap<&'static str, u32>);

impl WeekdayNames {
    pub fn new() -> Self {
        let names = [
            "domingo",
            "lunes",
            "martes",
            "miercoles",
            "jueves",
            "viernes",
            "sabado",
        ];

        Self(
            names
                .iter()
                .enumerate()
                .map(|(number, name)| (*name, number as u32))
                .collect(),
        )
    }

    /// Accepts any case and accents: "Miércoles", "MIERCOLES", "miercoles".
    pub fn weekday(&self, name: &str) -> Option<Weekday> {
        let number = *self.0.get_by_left(normalize(name).as_str())?;
        Some((0..number).fold(Weekday::Sun, |day, _| day.succ()))
    }

    pub fn label(&self, weekday: Weekday) -> &'static str {
        self.0
            .get_by_right(&weekday.num_days_from_sunday())
            .copied()
            .unwrap_or_default()
    }
}

/// Reads the calendar day of a backend date, ignoring any time of day. Datetimes with an offset
/// keep the day as written in that offset.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|datetime| datetime.date())
}

pub fn is_night_shift(shift: &str) -> bool {
    normalize(shift) == NIGHT_SHIFT
}

/// Every `weekday` from `start` to `end`, both inclusive.
pub fn days_on(start: NaiveDate, end: NaiveDate, weekday: Weekday) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| day.weekday() == weekday)
        .collect()
}

/// Remembers the integrator Saturday picked for each night course, so reloading a course shows
/// the same day.
#[derive(Default)]
pub struct IntegratorMemo {
    picks: Mutex<HashMap<Id, NaiveDate>>,
}

impl IntegratorMemo {
    /// Returns the Saturday already picked for `course_id` if it is still one of `saturdays`,
    /// otherwise picks a new one at random.
    pub fn pick<R: Rng + ?Sized>(
        &self,
        course_id: Id,
        saturdays: &[NaiveDate],
        rng: &mut R,
    ) -> Option<NaiveDate> {
        let mut picks = self.picks.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(day) = picks.get(&course_id) {
            if saturdays.contains(day) {
                return Some(*day);
            }
            picks.remove(&course_id);
        }

        let day = *saturdays.choose(rng)?;
        picks.insert(course_id, day);
        Some(day)
    }

    pub fn forget(&self, course_id: Id) {
        let mut picks = self.picks.lock().unwrap_or_else(PoisonError::into_inner);
        picks.remove(&course_id);
    }

    #[cfg(test)]
    pub fn remembered(&self, course_id: Id) -> Option<NaiveDate> {
        let picks = self.picks.lock().unwrap_or_else(PoisonError::into_inner);
        picks.get(&course_id).copied()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    /// On the course's weekly day.
    Regular,
    /// The extra Saturday session of a night course.
    Integrator,
    /// Off the weekly pattern, present because a class was recorded on it.
    Recorded,
}

/// One selectable day of a course, with the classes already recorded on it.
#[derive(Debug, Serialize)]
pub struct DayBox<'a> {
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub kind: DayKind,
    pub classes: Vec<&'a Class>,
}

/// Derives the ordered class days of `course`.
///
/// Regular days follow the course's weekday between its start and end dates. Night courses get
/// one integrator Saturday, unless a class already falls on a Saturday in range. Days of recorded
/// classes are always included. Days are unique by calendar date; unreadable dates are skipped.
pub fn derive_schedule<'a, R: Rng + ?Sized>(
    course: &Course,
    classes: &'a [Class],
    memo: &IntegratorMemo,
    rng: &mut R,
) -> Vec<DayBox<'a>> {
    let names = WeekdayNames::new();

    let recorded: Vec<(NaiveDate, &Class)> = classes
        .iter()
        .filter_map(|class| Some((parse_day(class.fields.date.as_deref()?)?, class)))
        .collect();

    let start = course.fields.start.as_deref().and_then(parse_day);
    let end = course.fields.end.as_deref().and_then(parse_day);

    let mut days: BTreeMap<NaiveDate, DayKind> = BTreeMap::new();

    if let (Some(start), Some(end)) = (start, end) {
        if let Some(weekday) = names.weekday(&course.fields.day) {
            for day in days_on(start, end, weekday) {
                days.insert(day, DayKind::Regular);
            }
        }

        if is_night_shift(&course.fields.shift) {
            let recorded_saturdays: Vec<NaiveDate> = recorded
                .iter()
                .map(|(day, _)| *day)
                .filter(|day| day.weekday() == Weekday::Sat && start <= *day && *day <= end)
                .collect();

            if recorded_saturdays.is_empty() {
                let saturdays = days_on(start, end, Weekday::Sat);
                if let Some(day) = memo.pick(course.id, &saturdays, rng) {
                    days.entry(day).or_insert(DayKind::Integrator);
                }
            } else {
                for day in recorded_saturdays {
                    days.entry(day).or_insert(DayKind::Integrator);
                }
            }
        }
    }

    for (day, _) in &recorded {
        days.entry(*day).or_insert(DayKind::Recorded);
    }

    days.into_iter()
        .map(|(date, kind)| DayBox {
            date,
            weekday: names.label(date.weekday()),
            kind,
            classes: recorded
                .iter()
                .filter(|(day, _)| *day == date)
                .map(|(_, class)| *class)
                .collect(),
        })
        .collect()
}
