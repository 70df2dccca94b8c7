//! HTTP API for the call router.

mod handlers;
mod types;

pub use handlers::*;
pub use types::*;

use crate::enrollment::EnrollmentProvider;
use crate::identity::IdentityStore;
use crate::router::CallRouter;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Call state router
    pub router: Arc<CallRouter>,
    /// Identity record store (the same one the router uses)
    pub store: Arc<dyn IdentityStore>,
}

impl AppState {
    /// Create new application state. The router is built over `store`.
    pub fn new(store: Arc<dyn IdentityStore>, provider: Arc<dyn EnrollmentProvider>) -> Self {
        Self {
            router: Arc::new(CallRouter::new(store.clone(), provider)),
            store,
        }
    }
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Contact flow invocation
        .route("/v1/invoke", post(handlers::invoke))
        // Record access for the telephony workflow
        .route("/v1/records/:number", get(handlers::get_record))
        .route(
            "/v1/records/:number/enrollments",
            post(handlers::set_enrollments),
        )
        .route(
            "/v1/records/:number/authenticated",
            post(handlers::mark_authenticated),
        )
        .route("/v1/records/:number/reset", post(handlers::reset_flags))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
