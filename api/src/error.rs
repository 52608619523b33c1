use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("{detail}")]
    Http { status: u16, detail: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),

    /// No usable session: the operator has to go through the login page again.
    #[error("login required")]
    LoginRequired { login_url: String },

    #[error("could not save the session: {0}")]
    Store(#[from] std::io::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Http { status: 404, .. })
    }

    /// Builds an [`ApiError::Http`] from an error body, preferring the backend's `detail` message.
    pub(crate) fn from_body(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            detail: serde_json::Value,
        }

        let detail = match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                detail: serde_json::Value::String(detail),
            }) => detail,
            // Validation errors come back as a list of objects
            Ok(ErrorBody { detail }) => detail.to_string(),
            Err(_) if body.trim().is_empty() => format!("HTTP {}", status),
            Err(_) => body.trim().to_string(),
        };

        ApiError::Http { status, detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_is_used_verbatim() {
        let err = ApiError::from_body(409, r#"{"detail":"El curso ya existe"}"#);
        assert_eq!(err.to_string(), "El curso ya existe");
        assert!(!err.is_not_found());
    }

    #[test]
    fn structured_detail_is_serialized() {
        let err = ApiError::from_body(422, r#"{"detail":[{"loc":["body","nombre"]}]}"#);
        assert_eq!(err.to_string(), r#"[{"loc":["body","nombre"]}]"#);
    }

    #[test]
    fn raw_body_or_status_without_detail() {
        let err = ApiError::from_body(404, "Not Found");
        assert_eq!(err.to_string(), "Not Found");
        assert!(err.is_not_found());

        let err = ApiError::from_body(500, "");
        assert_eq!(err.to_string(), "HTTP 500");
    }
}
