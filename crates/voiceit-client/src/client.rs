//! VoiceIt v2 HTTP client.

use crate::error::VoiceItError;
use crate::types::CreateUserResponse;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default VoiceIt API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.voiceit.io";

/// Characters of a response body included in debug logs.
const BODY_PREVIEW_CHARS: usize = 200;

/// VoiceIt client.
///
/// The key/token pair is held as `SecretString` so it never shows up in
/// `Debug` output or logs.
#[derive(Clone)]
pub struct VoiceItClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    api_token: SecretString,
}

impl VoiceItClient {
    /// Create a new VoiceIt client.
    pub fn new(
        api_key: impl Into<String>,
        api_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, VoiceItError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: SecretString::new(api_key.into()),
            api_token: SecretString::new(api_token.into()),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a new user and return its opaque id.
    #[instrument(skip(self))]
    pub async fn create_user(&self) -> Result<String, VoiceItError> {
        let response = self
            .client
            .post(format!("{}/users", self.base_url))
            .basic_auth(
                self.api_key.expose_secret(),
                Some(self.api_token.expose_secret()),
            )
            .send()
            .await?;

        let body = self.handle_response::<CreateUserResponse>(response).await?;

        if body.is_success() {
            debug!(user_id = %body.user_id, "Created VoiceIt user");
            Ok(body.user_id)
        } else {
            warn!(response_code = %body.response_code, "VoiceIt rejected user creation");
            Err(VoiceItError::Rejected {
                response_code: body.response_code,
                message: body.message,
            })
        }
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, VoiceItError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            debug!("Response body: {}", preview(&body));
            serde_json::from_str(&body).map_err(VoiceItError::from)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    async fn extract_error(&self, response: reqwest::Response) -> VoiceItError {
        let status = response.status();

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("VoiceIt rate limit exceeded");
                VoiceItError::RateLimit
            }
            StatusCode::UNAUTHORIZED => {
                warn!("VoiceIt authentication failed");
                VoiceItError::Unauthorized
            }
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".into());
                VoiceItError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}

/// Leading part of `body`, cut on a character boundary.
pub(crate) fn preview(body: &str) -> &str {
    body.char_indices()
        .nth(BODY_PREVIEW_CHARS)
        .map_or(body, |(i, _)| &body[..i])
}

impl std::fmt::Debug for VoiceItClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceItClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
