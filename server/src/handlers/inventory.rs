//! Inventory CRUD and lifecycle handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use celustock_core::{EngineCommand, EngineEvent, Money, PhoneId, PhoneRecord, PhoneUpdate};

use crate::currency::Currency;
use crate::error::AppError;
use crate::state::AppState;

/// Query parameters for `GET /api/inventory`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Inclusive lower price bound, in base currency units.
    pub precio_min: Option<f64>,
    /// Inclusive upper price bound, in base currency units.
    pub precio_max: Option<f64>,
    /// Display currency for the response copy.
    #[serde(default)]
    pub moneda: Currency,
}

fn parse_bound(field: &'static str, value: Option<f64>) -> Result<Option<Money>, AppError> {
    value
        .map(|v| {
            Money::try_from_units(v)
                .map_err(|reason| AppError::bad_request(format!("invalid `{field}`: {reason}")))
        })
        .transpose()
}

/// GET `/api/inventory` — snapshot of the active set, optionally filtered
/// to a price range and rendered in a display currency.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PhoneRecord>>, AppError> {
    let min = parse_bound("precio_min", query.precio_min)?;
    let max = parse_bound("precio_max", query.precio_max)?;

    let records = state.store.state(|s| s.in_price_range(min, max)).await;
    Ok(Json(query.moneda.display_records(records)))
}

/// Request body for creating a phone.
#[derive(Debug, Deserialize)]
pub struct CreatePhoneRequest {
    /// Device name.
    pub modelo: String,
    /// Storage size token.
    pub capacidad: String,
    /// Condition label.
    pub condicion: String,
    /// Price in base currency units.
    pub precio: Money,
}

/// POST `/api/inventory`
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreatePhoneRequest>,
) -> Result<(StatusCode, Json<PhoneRecord>), AppError> {
    let event = state
        .store
        .send(EngineCommand::CreatePhone {
            model: body.modelo,
            capacity: body.capacidad,
            condition: body.condicion,
            price: body.precio,
        })
        .await?;

    match event {
        EngineEvent::PhoneCreated { record } => Ok((StatusCode::CREATED, Json(record))),
        other => Err(unexpected(&other)),
    }
}

/// PUT `/api/inventory/{id}` — partial update; `id` and `estado` are not
/// settable through this operation.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(fields): Json<PhoneUpdate>,
) -> Result<Json<PhoneRecord>, AppError> {
    let event = state
        .store
        .send(EngineCommand::UpdatePhone {
            id: PhoneId::new(id),
            fields,
        })
        .await?;

    match event {
        EngineEvent::PhoneUpdated { record } => Ok(Json(record)),
        other => Err(unexpected(&other)),
    }
}

/// POST `/api/inventory/{id}/sell`
pub async fn sell(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PhoneRecord>, AppError> {
    let event = state
        .store
        .send(EngineCommand::MarkSold {
            id: PhoneId::new(id),
        })
        .await?;

    match event {
        EngineEvent::PhoneSold { record, .. } => Ok(Json(record)),
        other => Err(unexpected(&other)),
    }
}

/// DELETE `/api/inventory/{id}` — returns the removed snapshot.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PhoneRecord>, AppError> {
    let event = state
        .store
        .send(EngineCommand::RemovePhone {
            id: PhoneId::new(id),
        })
        .await?;

    match event {
        EngineEvent::PhoneRemoved { snapshot, .. } => Ok(Json(snapshot)),
        other => Err(unexpected(&other)),
    }
}

pub(crate) fn unexpected(event: &EngineEvent) -> AppError {
    tracing::error!(?event, "engine produced an event the handler cannot render");
    AppError::internal("unexpected engine event")
}
