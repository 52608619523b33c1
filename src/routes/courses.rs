use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use warp::{filters::BoxedFilter, Filter};

use super::globals::{
    normalized_page_number, render, same_text, success, Failure, ItemResponse, ListResponse,
    Response, SimpleSuccessResponse,
};
use super::resource;
use crate::schedule::{derive_schedule, DayBox, IntegratorMemo};
use crate::validation::Validate;
use api::{
    models::{Course, CourseFields, Enrollment, EnrollmentRole, Id, Resource},
    search, Api,
};
use filters::{authed, with_api};

pub type Memo = Arc<IntegratorMemo>;

fn with_memo(memo: Memo) -> impl Filter<Extract = (Memo,), Error = Infallible> + Clone {
    warp::any().map(move || memo.clone())
}

pub fn routes(api: &Api, memo: &Memo) -> BoxedFilter<(Response,)> {
    let list_route = warp::path!("api" / "courses")
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::query::<ListRequest>())
        .and_then(|api, request| render(list(api, request)))
        .boxed();

    let update_route = warp::path!("api" / "courses" / Id)
        .and(warp::put())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(with_memo(memo.clone()))
        .and(warp::body::content_length_limit(1024 * 16).and(warp::body::json()))
        .and_then(|id, api, memo, payload| render(update(id, api, memo, payload)))
        .boxed();

    let schedule_route = warp::path!("api" / "courses" / Id / "schedule")
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(with_memo(memo.clone()))
        .and_then(|id, api, memo| render(schedule(id, api, memo)))
        .boxed();

    let enrollments_route = warp::path!("api" / "courses" / Id / "enrollments")
        .and(warp::get())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(warp::query::<EnrollmentsRequest>())
        .and_then(|id, api, request| render(enrollments(id, api, request)))
        .boxed();

    let delete_route = warp::path!("api" / "courses" / Id)
        .and(warp::delete())
        .and(authed(api))
        .and(with_api(api.clone()))
        .and(with_memo(memo.clone()))
        .and_then(|id, api, memo| render(delete(id, api, memo)))
        .boxed();

    list_route
        .or(update_route)
        .unify()
        .or(delete_route)
        .unify()
        .or(schedule_route)
        .unify()
        .or(enrollments_route)
        .unify()
        .or(resource::get_route::<Course>(api, "courses"))
        .unify()
        .or(resource::create_route::<Course>(api, "courses"))
        .unify()
        .boxed()
}

#[derive(Deserialize)]
struct ListRequest {
    query: Option<String>,
    page: Option<i64>,
    subject_id: Option<Id>,
    shift: Option<String>,
    period: Option<String>,
    status: Option<String>,
}

async fn list(api: Api, request: ListRequest) -> Result<Response, Failure> {
    let courses = api.list::<Course>().await?;

    let found = search(
        &courses,
        Course::search_text,
        normalized_page_number(request.page),
        request.query.as_deref(),
        |c| {
            request.subject_id.map_or(true, |id| c.fields.subject_id == id)
                && same_text(request.shift.as_deref(), &c.fields.shift)
                && same_text(
                    request.period.as_deref(),
                    c.fields.period.as_deref().unwrap_or(""),
                )
                && same_text(
                    request.status.as_deref(),
                    c.fields.status.as_deref().unwrap_or(""),
                )
        },
    );

    Ok(success(&ListResponse::new(found)))
}

/// Dates or weekday may have moved, so the integrator Saturday is picked again.
async fn update(
    id: Id,
    api: Api,
    memo: Memo,
    payload: CourseFields,
) -> Result<Response, Failure> {
    payload.validate_update(id)?;
    let course = api.update::<Course>(id, &payload).await?;
    memo.forget(id);

    Ok(success(&ItemResponse::new(&course)))
}

async fn delete(id: Id, api: Api, memo: Memo) -> Result<Response, Failure> {
    api.delete::<Course>(id).await?;
    memo.forget(id);

    Ok(success(&SimpleSuccessResponse::new()))
}

#[derive(Serialize)]
struct ScheduleResponse<'a> {
    status: &'static str,
    course_id: Id,
    days: Vec<DayBox<'a>>,
}

async fn schedule(id: Id, api: Api, memo: Memo) -> Result<Response, Failure> {
    let (course, classes) = tokio::try_join!(api.get::<Course>(id), api.course_classes(id))?;

    let days = {
        let mut rng = rand::thread_rng();
        derive_schedule(&course, &classes, &memo, &mut rng)
    };

    Ok(success(&ScheduleResponse {
        status: "success",
        course_id: course.id,
        days,
    }))
}

#[derive(Deserialize)]
struct EnrollmentsRequest {
    role: Option<EnrollmentRole>,
}

async fn enrollments(id: Id, api: Api, request: EnrollmentsRequest) -> Result<Response, Failure> {
    let enrollments = api.course_enrollments(id).await?;

    let found: Vec<&Enrollment> = enrollments
        .iter()
        .filter(|e| request.role.map_or(true, |role| e.role == role))
        .collect();

    Ok(success(&ListResponse::new((found.len(), found))))
}
