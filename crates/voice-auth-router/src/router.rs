//! Call state router.
//!
//! Each inbound call is classified from the caller's identity record into one
//! of five branches. The router leaves the record in the state the next call
//! expects and returns the branch for the contact flow to act on.
//!
//! Classification, first match wins:
//!
//! 1. no record: [`Branch::EnrollFromScratch`], a record is created
//! 2. `verified`: [`Branch::Verified`] inside the freshness window,
//!    [`Branch::FailedVerified`] otherwise
//! 3. fewer than [`ENROLLMENT_THRESHOLD`] enrollments: [`Branch::Enroll`]
//! 4. otherwise: [`Branch::Verify`]
//!
//! Only the lookup is fatal. Failed writes and a failed subject creation are
//! logged and the branch is still returned.

use crate::enrollment::EnrollmentProvider;
use crate::error::RouterResult;
use crate::identity::{validate_phone_number, IdentityRecord, IdentityStore, RecordInfo, RecordUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Enrollment samples required before a caller can verify.
pub const ENROLLMENT_THRESHOLD: u32 = 3;

/// How long a successful verification may be consumed by the next routing call.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(10);

/// Routing decision handed back to the telephony front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    /// First call from this number; enrollment starts from nothing
    EnrollFromScratch,
    /// Enrollment was started earlier but never completed
    Enroll,
    /// Fully enrolled; verify the caller's voice
    Verify,
    /// Verification just succeeded within this call
    Verified,
    /// Verified flag is stale; verify again
    FailedVerified,
}

impl Branch {
    /// Wire label understood by the contact flow.
    pub fn label(&self) -> &'static str {
        match self {
            Branch::EnrollFromScratch => "enrollfromscratch",
            Branch::Enroll => "enroll",
            Branch::Verify => "verify",
            Branch::Verified => "verified",
            Branch::FailedVerified => "failedverified",
        }
    }

    /// Partial update issued against an existing record for this branch.
    ///
    /// `EnrollFromScratch` creates a record instead, so it has none.
    pub fn record_update(&self) -> Option<RecordUpdate> {
        match self {
            Branch::EnrollFromScratch => None,
            Branch::Enroll => Some(RecordUpdate::new().verifying(false).enrolling(true)),
            Branch::Verify => Some(RecordUpdate::new().verifying(true).enrolling(false)),
            Branch::Verified => Some(RecordUpdate::new().verified(false)),
            Branch::FailedVerified => Some(RecordUpdate::new().verified(false).verifying(true)),
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify an existing record.
pub fn classify(info: &RecordInfo, now: DateTime<Utc>) -> Branch {
    if info.verified {
        if is_fresh(info, now) {
            Branch::Verified
        } else {
            Branch::FailedVerified
        }
    } else if info.num_enrollments < ENROLLMENT_THRESHOLD {
        Branch::Enroll
    } else {
        Branch::Verify
    }
}

/// Whether `auth_time` lies strictly less than [`FRESHNESS_WINDOW`] before `now`.
///
/// An unparsable timestamp counts as stale. A timestamp ahead of `now` counts
/// as fresh.
fn is_fresh(info: &RecordInfo, now: DateTime<Utc>) -> bool {
    let Some(auth_time) = info.auth_time_parsed() else {
        warn!(auth_time = %info.auth_time, "Unparsable authTime, treating verification as stale");
        return false;
    };

    match (now - auth_time).to_std() {
        Ok(elapsed) => elapsed < FRESHNESS_WINDOW,
        Err(_) => true,
    }
}

/// Decides the workflow for each inbound call.
#[derive(Clone)]
pub struct CallRouter {
    store: Arc<dyn IdentityStore>,
    provider: Arc<dyn EnrollmentProvider>,
}

impl CallRouter {
    /// Create a router over a record store and an enrollment provider.
    pub fn new(store: Arc<dyn IdentityStore>, provider: Arc<dyn EnrollmentProvider>) -> Self {
        Self { store, provider }
    }

    /// Route a call using the current time.
    pub async fn route(&self, phone_number: &str) -> RouterResult<Branch> {
        self.route_at(phone_number, Utc::now()).await
    }

    /// Route a call as if it arrived at `now`.
    #[instrument(skip(self, now))]
    pub async fn route_at(&self, phone_number: &str, now: DateTime<Utc>) -> RouterResult<Branch> {
        let phone_number = validate_phone_number(phone_number)?;

        let record = self.store.get(&phone_number).await.map_err(|e| {
            error!(phone_number = %phone_number, error = %e, "Identity lookup failed");
            e
        })?;

        let branch = match record {
            None => {
                self.enroll_from_scratch(&phone_number, now).await;
                Branch::EnrollFromScratch
            }
            Some(record) => {
                let branch = classify(&record.info, now);
                if let Some(update) = branch.record_update() {
                    self.apply(&phone_number, branch, update).await;
                }
                branch
            }
        };

        info!(phone_number = %phone_number, branch = %branch, "Call routed");
        Ok(branch)
    }

    async fn enroll_from_scratch(&self, phone_number: &str, now: DateTime<Utc>) {
        let user_id = match self.provider.create_subject().await {
            Ok(id) => id,
            Err(e) => {
                error!(
                    phone_number = %phone_number,
                    error = %e,
                    "Subject creation failed, storing record without a user id"
                );
                String::new()
            }
        };

        let record = IdentityRecord::new_enrollment(phone_number, user_id, now);
        match self.store.create(record).await {
            Ok(()) => info!(phone_number = %phone_number, "Created identity record"),
            Err(e) => error!(phone_number = %phone_number, error = %e, "Failed to create identity record"),
        }
    }

    async fn apply(&self, phone_number: &str, branch: Branch, update: RecordUpdate) {
        if let Err(e) = self.store.update(phone_number, update).await {
            warn!(
                phone_number = %phone_number,
                branch = %branch,
                error = %e,
                "Failed to update identity record, routing anyway"
            );
        }
    }
}
