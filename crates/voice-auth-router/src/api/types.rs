//! API request and response types.

use crate::router::Branch;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Contact flow invocation event.
///
/// Only the caller's endpoint address is used; everything else the contact
/// center sends is accepted and ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactFlowEvent {
    #[serde(default)]
    pub name: Option<String>,
    pub details: ContactFlowDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactFlowDetails {
    pub contact_data: ContactData,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactData {
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub customer_endpoint: Option<Endpoint>,
}

#[derive(Debug, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Type", default)]
    pub endpoint_type: Option<String>,
}

impl ContactFlowEvent {
    /// Caller phone number, if the event carries one.
    pub fn caller_address(&self) -> Option<&str> {
        self.details
            .contact_data
            .customer_endpoint
            .as_ref()
            .map(|e| e.address.as_str())
    }
}

/// Single-key response the contact flow branches on.
#[derive(Debug, Serialize, Deserialize)]
pub struct BranchResponse {
    #[serde(rename = "Branch")]
    pub branch: Branch,
}

/// Request to set the stored enrollment count.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEnrollmentsRequest {
    pub num_enrollments: u32,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub record_count: usize,
}
