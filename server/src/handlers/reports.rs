//! Dashboard statistics handler.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use celustock_core::analytics::{dashboard_stats, DashboardStats};

use crate::error::AppError;
use crate::state::AppState;

/// Query parameters for `GET /api/stats`.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    /// Trailing trend window in months; one of 3, 6, or 12.
    pub periodos: Option<u32>,
}

/// GET `/api/stats` — the full dashboard projection, recomputed on demand.
pub async fn stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<DashboardStats>, AppError> {
    let mut config = state.stats.clone();
    if let Some(periods) = query.periodos {
        if !matches!(periods, 3 | 6 | 12) {
            return Err(AppError::bad_request(format!(
                "invalid `periodos`: expected 3, 6 or 12, got {periods}"
            )));
        }
        config.trend_periods = periods;
    }

    let now = state.clock.now();
    let stats = state
        .store
        .state(move |s| dashboard_stats(s, &config, now))
        .await;
    Ok(Json(stats))
}
