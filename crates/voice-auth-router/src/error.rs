//! Error types for the call router.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Router error types.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    #[error("Identity record not found: {0}")]
    NotFound(String),

    #[error("Record store error: {0}")]
    Store(String),

    #[error("Enrollment provider error: {0}")]
    Provider(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            RouterError::InvalidPhoneNumber(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_PHONE_NUMBER")
            }
            RouterError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            RouterError::Store(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
            RouterError::Provider(_) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for RouterError {
    fn from(e: std::io::Error) -> Self {
        RouterError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for RouterError {
    fn from(e: serde_json::Error) -> Self {
        RouterError::Store(format!("JSON serialization error: {}", e))
    }
}

impl From<voiceit_client::VoiceItError> for RouterError {
    fn from(e: voiceit_client::VoiceItError) -> Self {
        RouterError::Provider(e.to_string())
    }
}

/// Result type alias for router errors.
pub type RouterResult<T> = Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (RouterError::InvalidPhoneNumber("".into()), StatusCode::BAD_REQUEST),
            (RouterError::NotFound("+1".into()), StatusCode::NOT_FOUND),
            (RouterError::Store("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (RouterError::Provider("401".into()), StatusCode::BAD_GATEWAY),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
