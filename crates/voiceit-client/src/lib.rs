//! VoiceIt v2 client, limited to subject (user) creation.

mod client;
mod error;
mod types;

pub use client::{VoiceItClient, DEFAULT_BASE_URL};
pub use error::VoiceItError;
pub use types::*;
