use serde::Serialize;
use std::future::Future;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::Rejection;

use crate::validation::ValidationError;
use api::ApiError;

pub type Response = WithStatus<Json>;

#[derive(Serialize)]
pub struct FailureResponse {
    status: &'static str,
    code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    login_url: Option<String>,
}

impl FailureResponse {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            status: "error",
            code,
            detail: None,
            field: None,
            login_url: None,
        }
    }

    pub fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn login_required(login_url: String) -> Self {
        Self {
            login_url: Some(login_url),
            ..Self::new(ErrorCode::LoginRequired)
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    LoginRequired,
    MalformedData,
    MethodNotAllowed,
    NotFound,
    InvalidID,
    MissingField,
    InvalidDate,
    EndBeforeStart,
    InvalidCapacity,
    NegativeValue,
    NotANumber,
    InvalidDuration,
    SelfPrerequisite,
    ClassTypeTaken,
    ProposalAlreadyDecided,
    BackendError,
    BackendUnavailable,
    InternalServerError,
}

impl From<&ValidationError> for ErrorCode {
    fn from(err: &ValidationError) -> Self {
        use ValidationError::*;

        match err {
            Required { .. } => ErrorCode::MissingField,
            InvalidDate { .. } => ErrorCode::InvalidDate,
            EndBeforeStart => ErrorCode::EndBeforeStart,
            InvalidCapacity { .. } => ErrorCode::InvalidCapacity,
            NegativeValue { .. } => ErrorCode::NegativeValue,
            NotANumber => ErrorCode::NotANumber,
            InvalidDuration => ErrorCode::InvalidDuration,
            SelfPrerequisite => ErrorCode::SelfPrerequisite,
            DuplicateClassType { .. } => ErrorCode::ClassTypeTaken,
            AlreadyDecided => ErrorCode::ProposalAlreadyDecided,
        }
    }
}

/// Everything a view can fail with, rendered as a [`FailureResponse`].
#[derive(Debug)]
pub enum Failure {
    Api(ApiError),
    Invalid(ValidationError),
    /// The id is not among the records the backend returned.
    NotFound,
}

impl From<ApiError> for Failure {
    fn from(err: ApiError) -> Self {
        Failure::Api(err)
    }
}

impl From<ValidationError> for Failure {
    fn from(err: ValidationError) -> Self {
        Failure::Invalid(err)
    }
}

impl Failure {
    pub fn into_response(self) -> Response {
        let (response, status) = match self {
            Failure::Invalid(err) => (
                FailureResponse {
                    field: err.field(),
                    ..FailureResponse::new(ErrorCode::from(&err)).with_detail(err.to_string())
                },
                StatusCode::BAD_REQUEST,
            ),
            Failure::NotFound => (
                FailureResponse::new(ErrorCode::InvalidID),
                StatusCode::NOT_FOUND,
            ),
            Failure::Api(ApiError::LoginRequired { login_url }) => (
                FailureResponse::login_required(login_url),
                StatusCode::UNAUTHORIZED,
            ),
            Failure::Api(ApiError::Http { status, detail }) => {
                let code = if status == 404 {
                    ErrorCode::NotFound
                } else {
                    ErrorCode::BackendError
                };
                (
                    FailureResponse::new(code).with_detail(detail),
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                )
            }
            Failure::Api(err @ ApiError::Network(_)) => (
                FailureResponse::new(ErrorCode::BackendUnavailable).with_detail(err.to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            Failure::Api(err @ ApiError::Decode(_)) => (
                FailureResponse::new(ErrorCode::BackendError).with_detail(err.to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            Failure::Api(err @ ApiError::Store(_)) => (
                FailureResponse::new(ErrorCode::InternalServerError).with_detail(err.to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        };

        warp::reply::with_status(warp::reply::json(&response), status)
    }
}

/// Awaits a view and replies with its failure instead of rejecting, so no other route is tried.
pub async fn render<F>(view: F) -> Result<Response, Rejection>
where
    F: Future<Output = Result<Response, Failure>>,
{
    Ok(view.await.unwrap_or_else(Failure::into_response))
}

pub fn success<T: Serialize>(body: &T) -> Response {
    warp::reply::with_status(warp::reply::json(body), StatusCode::OK)
}

pub fn created<T: Serialize>(body: &T) -> Response {
    warp::reply::with_status(warp::reply::json(body), StatusCode::CREATED)
}

#[derive(Serialize)]
pub struct SimpleSuccessResponse {
    status: &'static str,
}

impl SimpleSuccessResponse {
    pub fn new() -> Self {
        Self { status: "success" }
    }
}

#[derive(Serialize)]
pub struct ListResponse<'a, T> {
    status: &'static str,
    total: usize,
    items: Vec<&'a T>,
}

impl<'a, T> ListResponse<'a, T> {
    pub fn new((total, items): (usize, Vec<&'a T>)) -> Self {
        Self {
            status: "success",
            total,
            items,
        }
    }
}

#[derive(Serialize)]
pub struct ItemResponse<'a, T> {
    status: &'static str,
    item: &'a T,
}

impl<'a, T> ItemResponse<'a, T> {
    pub fn new(item: &'a T) -> Self {
        Self {
            status: "success",
            item,
        }
    }
}

/// Checks that the page number is valid, and if its not it returns 1
pub fn normalized_page_number(page: Option<i64>) -> usize {
    page.and_then(|v| usize::try_from(v).ok())
        .filter(|v| *v >= 1)
        .unwrap_or(1usize)
}

/// Matches a free-form filter value against a field, ignoring case and accents.
pub fn same_text(filter: Option<&str>, value: &str) -> bool {
    match filter {
        Some(filter) => api::normalize(filter) == api::normalize(value),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_numbers_below_one_are_first_page() {
        assert_eq!(normalized_page_number(None), 1);
        assert_eq!(normalized_page_number(Some(0)), 1);
        assert_eq!(normalized_page_number(Some(-3)), 1);
        assert_eq!(normalized_page_number(Some(4)), 4);
    }
}
