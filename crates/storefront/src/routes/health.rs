//! Health check handlers.

use axum::extract::State;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the cart storage slot can be read.
/// Returns 503 Service Unavailable if it cannot.
pub async fn readiness(State(state): State<AppState>) -> Result<&'static str> {
    state
        .cart()
        .check_storage()
        .map(|()| "ok")
        .map_err(|e| AppError::Unavailable(e.to_string()))
}
