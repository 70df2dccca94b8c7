//! VoiceIt client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceItError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Authentication failed")]
    Unauthorized,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Request rejected: {response_code} - {message}")]
    Rejected {
        response_code: String,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
