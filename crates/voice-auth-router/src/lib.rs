//! Voice authentication call router.
//!
//! For every inbound call the router reads the caller's identity record,
//! decides which voice-authentication workflow the call enters, and leaves
//! the record ready for the next call:
//! - `enrollfromscratch` for a number never seen before
//! - `enroll` to resume an incomplete enrollment
//! - `verify` once enrollment is complete
//! - `verified` / `failedverified` after a verification attempt

pub mod api;
pub mod config;
pub mod enrollment;
pub mod error;
pub mod identity;
pub mod router;

pub use config::Config;
pub use enrollment::EnrollmentProvider;
pub use error::{RouterError, RouterResult};
pub use identity::{FileStore, IdentityRecord, IdentityStore, MemoryStore, RecordInfo, RecordUpdate};
pub use router::{Branch, CallRouter, ENROLLMENT_THRESHOLD, FRESHNESS_WINDOW};
