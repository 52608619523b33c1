use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub type Id = u32;

/// A collection exposed by the core API with the usual CRUD endpoints.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection path on the core API, without slashes.
    const PATH: &'static str;

    /// Body accepted by both create and update.
    type Payload: Serialize + DeserializeOwned + Send + Sync + 'static;

    fn id(&self) -> Id;

    /// Text matched by free-text search.
    fn search_text(&self) -> String;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "ACTIVO", alias = "activo", alias = "ACTIVE")]
    Active,
    #[serde(rename = "INACTIVO", alias = "inactivo", alias = "INACTIVE")]
    Inactive,
}

impl Default for Status {
    fn default() -> Self {
        Status::Active
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    #[serde(flatten)]
    pub fields: UserFields,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserFields {
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    #[serde(rename = "email_personal", default)]
    pub personal_email: Option<String>,
    #[serde(rename = "email_institucional", default)]
    pub institutional_email: Option<String>,
    #[serde(rename = "telefono", default)]
    pub phone_number: Option<String>,
    #[serde(rename = "dni", default)]
    pub document: Option<String>,
    #[serde(rename = "rol_id", default)]
    pub role_id: Option<Id>,
    #[serde(rename = "estado", default)]
    pub status: Status,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.fields.first_name, self.fields.last_name)
    }
}

impl Resource for User {
    const PATH: &'static str = "usuarios";
    type Payload = UserFields;

    fn id(&self) -> Id {
        self.id
    }

    fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.full_name(),
            self.fields.institutional_email.as_deref().unwrap_or("")
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleCategory {
    Administrator,
    Student,
    Teacher,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Role {
    pub id: Id,
    #[serde(flatten)]
    pub fields: RoleFields,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoleFields {
    #[serde(rename = "categoria")]
    pub category: RoleCategory,
    #[serde(rename = "subcategoria", default)]
    pub subcategory: Option<String>,
    #[serde(rename = "sueldo_base", default)]
    pub base_salary: Option<f64>,
    #[serde(rename = "estado", default)]
    pub status: Status,
}

impl Resource for Role {
    const PATH: &'static str = "roles";
    type Payload = RoleFields;

    fn id(&self) -> Id {
        self.id
    }

    fn search_text(&self) -> String {
        let category = match self.fields.category {
            RoleCategory::Administrator => "administrator",
            RoleCategory::Student => "student",
            RoleCategory::Teacher => "teacher",
        };
        format!(
            "{} {}",
            category,
            self.fields.subcategory.as_deref().unwrap_or("")
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Career {
    pub id: Id,
    #[serde(flatten)]
    pub fields: CareerFields,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CareerFields {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "facultad")]
    pub faculty: String,
    #[serde(rename = "modalidad")]
    pub modality: String,
    /// Years.
    #[serde(rename = "duracion")]
    pub duration: u8,
}

impl Resource for Career {
    const PATH: &'static str = "carreras";
    type Payload = CareerFields;

    fn id(&self) -> Id {
        self.id
    }

    fn search_text(&self) -> String {
        format!("{} {}", self.fields.name, self.fields.code)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Subject {
    pub id: Id,
    #[serde(flatten)]
    pub fields: SubjectFields,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubjectFields {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "modalidad_aprobacion")]
    pub approval_method: String,
    #[serde(rename = "electiva", default)]
    pub elective: bool,
    #[serde(rename = "carrera_id", default)]
    pub career_id: Option<Id>,
    /// Prerequisite subjects.
    #[serde(rename = "correlativas", default)]
    pub prerequisites: Vec<Id>,
}

impl Resource for Subject {
    const PATH: &'static str = "materias";
    type Payload = SubjectFields;

    fn id(&self) -> Id {
        self.id
    }

    fn search_text(&self) -> String {
        self.fields.name.clone()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Course {
    pub id: Id,
    #[serde(flatten)]
    pub fields: CourseFields,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CourseFields {
    #[serde(rename = "materia_id")]
    pub subject_id: Id,
    /// Spanish weekday name, e.g. "Miércoles".
    #[serde(rename = "dia")]
    pub day: String,
    /// "Mañana", "Tarde" or "Noche".
    #[serde(rename = "turno")]
    pub shift: String,
    #[serde(rename = "periodo", default)]
    pub period: Option<String>,
    #[serde(rename = "fecha_inicio", default)]
    pub start: Option<String>,
    #[serde(rename = "fecha_fin", default)]
    pub end: Option<String>,
    #[serde(rename = "espacio_id", default)]
    pub space_id: Option<Id>,
    #[serde(rename = "cupo_minimo", default)]
    pub min_capacity: u32,
    #[serde(rename = "cupo_maximo", default)]
    pub max_capacity: u32,
    #[serde(rename = "estado", default)]
    pub status: Option<String>,
    #[serde(rename = "titular_id", default)]
    pub titular_id: Option<Id>,
    #[serde(rename = "auxiliar_id", default)]
    pub auxiliar_id: Option<Id>,
}

impl Resource for Course {
    const PATH: &'static str = "cursos";
    type Payload = CourseFields;

    fn id(&self) -> Id {
        self.id
    }

    fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.fields.day,
            self.fields.shift,
            self.fields.period.as_deref().unwrap_or("")
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassType {
    #[serde(rename = "REGULAR")]
    Regular,
    #[serde(rename = "PRIMER_PARCIAL")]
    FirstPartial,
    #[serde(rename = "SEGUNDO_PARCIAL")]
    SecondPartial,
    #[serde(rename = "RECUPERATORIO")]
    MakeUpExam,
    #[serde(rename = "FINAL")]
    Final,
}

impl ClassType {
    /// At most one non-cancelled class of these types may exist per course.
    pub fn is_unique(self) -> bool {
        !matches!(self, ClassType::Regular)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassState {
    #[serde(rename = "PROGRAMADA")]
    Scheduled,
    #[serde(rename = "DICTADA")]
    Given,
    #[serde(rename = "REPROGRAMADA")]
    Rescheduled,
    #[serde(rename = "CANCELADA")]
    Cancelled,
}

impl Default for ClassState {
    fn default() -> Self {
        ClassState::Scheduled
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Class {
    pub id: Id,
    #[serde(flatten)]
    pub fields: ClassFields,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassFields {
    #[serde(rename = "curso_id")]
    pub course_id: Id,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "tipo")]
    pub class_type: ClassType,
    #[serde(rename = "fecha", default)]
    pub date: Option<String>,
    #[serde(rename = "estado", default)]
    pub state: ClassState,
    #[serde(rename = "observaciones", default)]
    pub notes: Option<String>,
}

impl Resource for Class {
    const PATH: &'static str = "clases";
    type Payload = ClassFields;

    fn id(&self) -> Id {
        self.id
    }

    fn search_text(&self) -> String {
        self.fields.title.clone()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Space {
    pub id: Id,
    #[serde(flatten)]
    pub fields: SpaceFields,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpaceFields {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub space_type: String,
    #[serde(rename = "capacidad")]
    pub capacity: u32,
    #[serde(rename = "ubicacion", default)]
    pub location: Option<String>,
    #[serde(rename = "sede_id", default)]
    pub site_id: Option<Id>,
    #[serde(rename = "estado", default)]
    pub status: Status,
}

impl Resource for Space {
    const PATH: &'static str = "espacios";
    type Payload = SpaceFields;

    fn id(&self) -> Id {
        self.id
    }

    fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.fields.name,
            self.fields.location.as_deref().unwrap_or("")
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Site {
    pub id: Id,
    #[serde(flatten)]
    pub fields: SiteFields,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SiteFields {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "ubicacion", default)]
    pub location: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: Status,
}

impl Resource for Site {
    const PATH: &'static str = "sedes";
    type Payload = SiteFields;

    fn id(&self) -> Id {
        self.id
    }

    fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.fields.name,
            self.fields.location.as_deref().unwrap_or("")
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceKind {
    #[serde(rename = "NUMERICO")]
    Numeric,
    #[serde(rename = "TEXTO")]
    Text,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Number(f64),
    Text(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Price {
    pub id: Id,
    #[serde(flatten)]
    pub fields: PriceFields,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceFields {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: PriceKind,
    #[serde(rename = "valor")]
    pub value: PriceValue,
    #[serde(rename = "estado", default)]
    pub status: Status,
}

impl Resource for Price {
    const PATH: &'static str = "precios";
    type Payload = PriceFields;

    fn id(&self) -> Id {
        self.id
    }

    fn search_text(&self) -> String {
        self.fields.name.clone()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentRole {
    Titular,
    Auxiliar,
    #[serde(rename = "ALUMNO")]
    Student,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Id,
    #[serde(rename = "curso_id")]
    pub course_id: Id,
    #[serde(rename = "usuario_id")]
    pub user_id: Id,
    #[serde(rename = "rol")]
    pub role: EnrollmentRole,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalState {
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "APROBADA")]
    Approved,
    #[serde(rename = "RECHAZADA")]
    Rejected,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: Id,
    #[serde(rename = "docente_id")]
    pub teacher_id: Id,
    #[serde(rename = "materia_id")]
    pub subject_id: Id,
    #[serde(rename = "fecha_creacion", default)]
    pub created_at: Option<String>,
    #[serde(rename = "estado")]
    pub state: ProposalState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn action(self) -> &'static str {
        match self {
            Decision::Approve => "aprobar",
            Decision::Reject => "rechazar",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AvailabilityBlock {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(rename = "dia")]
    pub day: String,
    #[serde(rename = "turno")]
    pub shift: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AvailableTeacher {
    #[serde(rename = "docente_id")]
    pub teacher_id: Id,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "bloques", default)]
    pub blocks: Vec<AvailabilityBlock>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(rename = "materia_id", skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<Id>,
    #[serde(rename = "dia", skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(rename = "turno", skip_serializing_if = "Option::is_none")]
    pub shift: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockAssignment {
    #[serde(rename = "docente_id")]
    pub teacher_id: Id,
    #[serde(rename = "curso_id")]
    pub course_id: Id,
    #[serde(rename = "bloque_id")]
    pub block_id: Id,
}
