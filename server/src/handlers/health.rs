//! Health check endpoint.
//!
//! Used by load balancers and monitoring to verify the service is up and
//! to get a cheap view of the in-memory state sizes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

/// Health response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process is serving.
    pub status: &'static str,
    /// Records in the active set.
    pub inventario: usize,
    /// Waiting customers.
    pub cola: usize,
    /// Ledger entries.
    pub historial: usize,
}

/// GET `/health`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (inventario, cola, historial) = state
        .store
        .state(|s| (s.count(), s.queue.len(), s.ledger.len()))
        .await;

    Json(HealthResponse {
        status: "ok",
        inventario,
        cola,
        historial,
    })
}
