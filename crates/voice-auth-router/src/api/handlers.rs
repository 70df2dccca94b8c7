//! HTTP request handlers.

use super::types::{BranchResponse, ContactFlowEvent, HealthResponse, SetEnrollmentsRequest};
use super::AppState;
use crate::error::RouterError;
use crate::identity::{validate_phone_number, IdentityRecord, RecordUpdate};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, RouterError> {
    let record_count = state.store.count().await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        record_count,
    }))
}

/// Route one inbound call.
pub async fn invoke(
    State(state): State<AppState>,
    Json(event): Json<ContactFlowEvent>,
) -> Result<Json<BranchResponse>, RouterError> {
    let Some(address) = event.caller_address() else {
        warn!(contact_id = ?event.details.contact_data.contact_id, "Event has no customer endpoint");
        return Err(RouterError::InvalidPhoneNumber(
            "Event has no customer endpoint address".into(),
        ));
    };

    let branch = state.router.route(address).await?;
    Ok(Json(BranchResponse { branch }))
}

/// Get the identity record for a phone number.
pub async fn get_record(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<IdentityRecord>, RouterError> {
    let number = validate_phone_number(&number)?;
    let record = state.store.get(&number).await?;
    record.map(Json).ok_or(RouterError::NotFound(number))
}

/// Set the stored enrollment count after the telephony side captures a sample.
pub async fn set_enrollments(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(request): Json<SetEnrollmentsRequest>,
) -> Result<Json<IdentityRecord>, RouterError> {
    let number = validate_phone_number(&number)?;
    info!(phone_number = %number, num_enrollments = request.num_enrollments, "Setting enrollment count");

    update_and_fetch(
        &state,
        number,
        RecordUpdate::new().num_enrollments(request.num_enrollments),
    )
    .await
}

/// Record a successful voice verification.
pub async fn mark_authenticated(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<IdentityRecord>, RouterError> {
    let number = validate_phone_number(&number)?;
    info!(phone_number = %number, "Marking caller authenticated");

    update_and_fetch(
        &state,
        number,
        RecordUpdate::new().verified(true).auth_time(Utc::now()),
    )
    .await
}

/// Clear both the enrolling and verifying flags once a capture begins.
pub async fn reset_flags(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<IdentityRecord>, RouterError> {
    let number = validate_phone_number(&number)?;

    update_and_fetch(
        &state,
        number,
        RecordUpdate::new().verifying(false).enrolling(false),
    )
    .await
}

async fn update_and_fetch(
    state: &AppState,
    number: String,
    update: RecordUpdate,
) -> Result<Json<IdentityRecord>, RouterError> {
    state.store.update(&number, update).await?;
    let record = state.store.get(&number).await?;
    record.map(Json).ok_or(RouterError::NotFound(number))
}
