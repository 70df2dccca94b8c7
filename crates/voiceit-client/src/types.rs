//! VoiceIt API response types.

use serde::Deserialize;

/// Response code VoiceIt returns for a successful call.
pub const SUCCESS_CODE: &str = "SUCC";

/// Body of `POST /users`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub response_code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub time_taken: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl CreateUserResponse {
    /// Whether the provider accepted the request and minted a user id.
    pub fn is_success(&self) -> bool {
        self.response_code == SUCCESS_CODE && !self.user_id.is_empty()
    }
}
