//! History listing and single-step undo.

use axum::extract::State;
use axum::Json;

use celustock_core::history::HistoryEntry;
use celustock_core::{EngineCommand, EngineEvent, UndoOutcome};

use crate::error::AppError;
use crate::handlers::inventory::unexpected;
use crate::state::AppState;

/// GET `/api/history` — ledger entries, most recent first.
pub async fn list(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    let entries = state
        .store
        .state(|s| s.ledger.iter().cloned().collect())
        .await;
    Json(entries)
}

/// POST `/api/undo` — reverses the ledger head.
///
/// The response says what the reversal did: a restored removal, a reverted
/// sale, or a requeued customer.
pub async fn undo_last(State(state): State<AppState>) -> Result<Json<UndoOutcome>, AppError> {
    let event = state.store.send(EngineCommand::UndoLast).await?;

    match event {
        EngineEvent::UndoApplied { outcome } => Ok(Json(outcome)),
        other => Err(unexpected(&other)),
    }
}
