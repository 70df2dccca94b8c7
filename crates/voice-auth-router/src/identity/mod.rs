//! Per-phone-number identity records and the stores that hold them.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::{RouterError, RouterResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Identity record persisted for every phone number that has ever called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    /// Caller phone number, the primary key
    pub phone_number: String,

    /// Mutable authentication state
    pub info: RecordInfo,
}

/// Authentication state of a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInfo {
    /// Subject id minted by the enrollment provider (empty if minting failed)
    pub user_id: String,

    /// Caller is expected to capture enrollment samples
    pub enrolling: bool,

    /// Caller is expected to attempt a verification
    pub verifying: bool,

    /// Number of enrollment samples captured so far
    pub num_enrollments: u32,

    /// Set by the verification workflow after a successful voice match
    pub verified: bool,

    /// RFC3339 time of the last successful verification.
    ///
    /// Kept as the raw stored string: a value that fails to parse is a
    /// legitimate state the router has to classify.
    pub auth_time: String,
}

impl IdentityRecord {
    /// Build the record written on the first call from an unseen number.
    pub fn new_enrollment(
        phone_number: impl Into<String>,
        user_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            phone_number: phone_number.into(),
            info: RecordInfo {
                user_id: user_id.into(),
                enrolling: true,
                verifying: false,
                num_enrollments: 0,
                verified: false,
                auth_time: format_timestamp(now),
            },
        }
    }
}

impl RecordInfo {
    /// Parse `auth_time`, returning `None` when it is not valid RFC3339.
    pub fn auth_time_parsed(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.auth_time)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Partial update of a record's `info` fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub enrolling: Option<bool>,
    pub verifying: Option<bool>,
    pub verified: Option<bool>,
    pub num_enrollments: Option<u32>,
    pub auth_time: Option<String>,
}

impl RecordUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enrolling(mut self, value: bool) -> Self {
        self.enrolling = Some(value);
        self
    }

    pub fn verifying(mut self, value: bool) -> Self {
        self.verifying = Some(value);
        self
    }

    pub fn verified(mut self, value: bool) -> Self {
        self.verified = Some(value);
        self
    }

    pub fn num_enrollments(mut self, value: u32) -> Self {
        self.num_enrollments = Some(value);
        self
    }

    pub fn auth_time(mut self, value: DateTime<Utc>) -> Self {
        self.auth_time = Some(format_timestamp(value));
        self
    }

    /// True if the update names no field.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the named fields to `info`.
    pub fn apply(&self, info: &mut RecordInfo) {
        if let Some(v) = self.enrolling {
            info.enrolling = v;
        }
        if let Some(v) = self.verifying {
            info.verifying = v;
        }
        if let Some(v) = self.verified {
            info.verified = v;
        }
        if let Some(v) = self.num_enrollments {
            info.num_enrollments = v;
        }
        if let Some(v) = &self.auth_time {
            info.auth_time = v.clone();
        }
    }
}

/// Record store keyed by phone number.
///
/// A missing record is a normal outcome of `get`, reported as `Ok(None)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Fetch the record for a phone number.
    async fn get(&self, phone_number: &str) -> RouterResult<Option<IdentityRecord>>;

    /// Write a new record. An existing record with the same key is replaced.
    async fn create(&self, record: IdentityRecord) -> RouterResult<()>;

    /// Apply a partial update to an existing record.
    async fn update(&self, phone_number: &str, update: RecordUpdate) -> RouterResult<()>;

    /// Number of stored records.
    async fn count(&self) -> RouterResult<usize>;
}

/// Format a timestamp the way records store it (RFC3339, second precision).
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Validate a caller phone number used as a record key.
///
/// Surrounding whitespace is trimmed; the number is otherwise kept exactly as
/// the telephony layer supplied it.
pub fn validate_phone_number(number: &str) -> RouterResult<String> {
    let trimmed = number.trim();
    if trimmed.is_empty() {
        return Err(RouterError::InvalidPhoneNumber(
            "Phone number must not be empty".into(),
        ));
    }
    Ok(trimmed.to_string())
}
