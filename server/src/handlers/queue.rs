//! Customer queue handlers.
//!
//! Attending a customer and selling a phone are deliberately separate
//! operations; the client sequences them. Nothing here reserves stock.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use celustock_core::queue::CustomerQueueEntry;
use celustock_core::{EngineCommand, EngineEvent};

use crate::error::AppError;
use crate::handlers::inventory::unexpected;
use crate::state::AppState;

/// GET `/api/queue` — waiting customers in service order.
pub async fn list(State(state): State<AppState>) -> Json<Vec<CustomerQueueEntry>> {
    let entries = state
        .store
        .state(|s| s.queue.iter().cloned().collect())
        .await;
    Json(entries)
}

/// Request body for joining the queue.
#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    /// Customer name.
    pub nombre: String,
    /// Model of interest (free text).
    pub modelo_interes: String,
}

/// POST `/api/queue`
pub async fn enqueue(
    State(state): State<AppState>,
    Json(body): Json<EnqueueRequest>,
) -> Result<(StatusCode, Json<CustomerQueueEntry>), AppError> {
    let event = state
        .store
        .send(EngineCommand::EnqueueCustomer {
            name: body.nombre,
            interested_model: body.modelo_interes,
        })
        .await?;

    match event {
        EngineEvent::CustomerEnqueued { entry } => Ok((StatusCode::CREATED, Json(entry))),
        other => Err(unexpected(&other)),
    }
}

/// POST `/api/queue/attend` — serves the longest-waiting customer.
pub async fn attend_next(
    State(state): State<AppState>,
) -> Result<Json<CustomerQueueEntry>, AppError> {
    let event = state.store.send(EngineCommand::AttendNext).await?;

    match event {
        EngineEvent::CustomerAttended { customer, .. } => Ok(Json(customer)),
        other => Err(unexpected(&other)),
    }
}
