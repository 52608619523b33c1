use thiserror::Error;

use crate::schedule::parse_day;
use api::models::{
    CareerFields, Class, ClassFields, ClassState, ClassType, CourseFields, Id, PriceFields,
    PriceKind, PriceValue, Proposal, ProposalState, RoleFields, SiteFields, SpaceFields,
    SubjectFields, UserFields,
};

const MAX_CAREER_YEARS: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} is not a valid date")]
    InvalidDate { field: &'static str },
    #[error("the end date must come after the start date")]
    EndBeforeStart,
    #[error("{field} is out of range")]
    InvalidCapacity { field: &'static str },
    #[error("{field} cannot be negative")]
    NegativeValue { field: &'static str },
    #[error("a numeric price needs a numeric value")]
    NotANumber,
    #[error("the duration must be between 1 and {} years", MAX_CAREER_YEARS)]
    InvalidDuration,
    #[error("a subject cannot be its own prerequisite")]
    SelfPrerequisite,
    #[error("the course already has a {class_type:?} class")]
    DuplicateClassType { class_type: ClassType },
    #[error("the proposal was already decided")]
    AlreadyDecided,
}

impl ValidationError {
    /// Form field the front end should highlight.
    pub fn field(&self) -> Option<&'static str> {
        use ValidationError::*;

        match self {
            Required { field } | InvalidDate { field } => Some(*field),
            InvalidCapacity { field } | NegativeValue { field } => Some(*field),
            EndBeforeStart => Some("fecha_fin"),
            NotANumber => Some("valor"),
            InvalidDuration => Some("duracion"),
            SelfPrerequisite => Some("correlativas"),
            DuplicateClassType { .. } => Some("tipo"),
            AlreadyDecided => None,
        }
    }
}

/// Local checks run on a form before it is submitted.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;

    /// Checks for a form saved over the existing record `id`.
    fn validate_update(&self, _id: Id) -> Result<(), ValidationError> {
        self.validate()
    }
}

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(())
    }
}

fn required_option(value: Option<&str>, field: &'static str) -> Result<(), ValidationError> {
    required(value.unwrap_or(""), field)
}

impl Validate for UserFields {
    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.first_name, "nombre")?;
        required(&self.last_name, "apellido")?;
        required_option(self.institutional_email.as_deref(), "email_institucional")
    }
}

impl Validate for RoleFields {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.base_salary {
            Some(salary) if salary < 0.0 => Err(ValidationError::NegativeValue {
                field: "sueldo_base",
            }),
            _ => Ok(()),
        }
    }
}

impl Validate for CareerFields {
    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nombre")?;
        required(&self.code, "codigo")?;
        required(&self.faculty, "facultad")?;
        required(&self.modality, "modalidad")?;

        if self.duration == 0 || self.duration > MAX_CAREER_YEARS {
            return Err(ValidationError::InvalidDuration);
        }

        Ok(())
    }
}

impl Validate for SubjectFields {
    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nombre")?;
        required(&self.approval_method, "modalidad_aprobacion")
    }

    fn validate_update(&self, id: Id) -> Result<(), ValidationError> {
        self.validate()?;
        check_prerequisites(id, self)
    }
}

/// A subject being edited cannot list itself among its prerequisites.
pub fn check_prerequisites(id: Id, subject: &SubjectFields) -> Result<(), ValidationError> {
    if subject.prerequisites.contains(&id) {
        Err(ValidationError::SelfPrerequisite)
    } else {
        Ok(())
    }
}

impl Validate for CourseFields {
    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.day, "dia")?;
        required(&self.shift, "turno")?;
        required_option(self.start.as_deref(), "fecha_inicio")?;
        required_option(self.end.as_deref(), "fecha_fin")?;

        let start = self
            .start
            .as_deref()
            .and_then(parse_day)
            .ok_or(ValidationError::InvalidDate {
                field: "fecha_inicio",
            })?;
        let end = self
            .end
            .as_deref()
            .and_then(parse_day)
            .ok_or(ValidationError::InvalidDate { field: "fecha_fin" })?;

        if end <= start {
            return Err(ValidationError::EndBeforeStart);
        }

        if self.max_capacity == 0 {
            return Err(ValidationError::InvalidCapacity {
                field: "cupo_maximo",
            });
        }

        if self.min_capacity > self.max_capacity {
            return Err(ValidationError::InvalidCapacity {
                field: "cupo_minimo",
            });
        }

        Ok(())
    }
}

impl Validate for ClassFields {
    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.title, "titulo")?;
        required_option(self.date.as_deref(), "fecha")?;

        match self.date.as_deref().and_then(parse_day) {
            Some(_) => Ok(()),
            None => Err(ValidationError::InvalidDate { field: "fecha" }),
        }
    }
}

/// Rejects `class` when its type must be unique and another non-cancelled class of the course
/// already has it. `editing` is the id of the class being updated, which does not count.
pub fn check_unique_class_type(
    existing: &[Class],
    class: &ClassFields,
    editing: Option<Id>,
) -> Result<(), ValidationError> {
    if !class.class_type.is_unique() || class.state == ClassState::Cancelled {
        return Ok(());
    }

    let taken = existing.iter().any(|other| {
        Some(other.id) != editing
            && other.fields.class_type == class.class_type
            && other.fields.state != ClassState::Cancelled
    });

    if taken {
        Err(ValidationError::DuplicateClassType {
            class_type: class.class_type,
        })
    } else {
        Ok(())
    }
}

impl Validate for SpaceFields {
    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nombre")?;
        required(&self.space_type, "tipo")?;

        if self.capacity == 0 {
            return Err(ValidationError::InvalidCapacity { field: "capacidad" });
        }

        Ok(())
    }
}

impl Validate for SiteFields {
    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nombre")
    }
}

impl Validate for PriceFields {
    fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "nombre")?;

        match (&self.kind, &self.value) {
            (PriceKind::Numeric, PriceValue::Number(value)) if *value < 0.0 => {
                Err(ValidationError::NegativeValue { field: "valor" })
            }
            (PriceKind::Numeric, PriceValue::Text(_)) => Err(ValidationError::NotANumber),
            (PriceKind::Text, PriceValue::Text(value)) => required(value, "valor"),
            _ => Ok(()),
        }
    }
}

pub fn check_pending(proposal: &Proposal) -> Result<(), ValidationError> {
    if proposal.state == ProposalState::Pending {
        Ok(())
    } else {
        Err(ValidationError::AlreadyDecided)
    }
}
