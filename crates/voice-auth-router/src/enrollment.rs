//! Biometric enrollment provider seam.

use crate::error::RouterResult;
use async_trait::async_trait;
use voiceit_client::VoiceItClient;

/// Provider that mints opaque subject identifiers for new callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentProvider: Send + Sync {
    /// Create a subject and return its identifier.
    async fn create_subject(&self) -> RouterResult<String>;
}

#[async_trait]
impl EnrollmentProvider for VoiceItClient {
    async fn create_subject(&self) -> RouterResult<String> {
        Ok(self.create_user().await?)
    }
}
