//! # CeluStock Server
//!
//! Axum HTTP API over the CeluStock engine, following the
//! "Functional Core, Imperative Shell" split:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← HTTP, JSON, CORS
//! │  - Request parsing                      │  ← Logging, tracing
//! │  - Response serialization               │
//! ├─────────────────────────────────────────┤
//! │         Functional Core                 │
//! │  - Engine reducer (pure validation      │  ← Testable at memory speed
//! │    and state transitions)               │
//! │  - Analytics projections                │
//! │  - Effect descriptions (snapshots)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request flow
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Extract data** from the request (JSON body, path, query)
//! 3. **Build a command** from the extracted data
//! 4. **Dispatch** the command through the [`Store`](celustock_runtime::Store)
//! 5. **Map the event** (or typed rejection) to an HTTP response

pub mod config;
pub mod currency;
pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// Re-export key types for convenience
pub use config::Config;
pub use error::AppError;
pub use state::{AppState, EngineStore};

/// Builds the full API router over the given application state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/inventory",
            get(handlers::inventory::list).post(handlers::inventory::create),
        )
        .route(
            "/api/inventory/:id",
            put(handlers::inventory::update).delete(handlers::inventory::remove),
        )
        .route("/api/inventory/:id/sell", post(handlers::inventory::sell))
        .route("/api/undo", post(handlers::history::undo_last))
        .route("/api/history", get(handlers::history::list))
        .route(
            "/api/queue",
            get(handlers::queue::list).post(handlers::queue::enqueue),
        )
        .route("/api/queue/attend", post(handlers::queue::attend_next))
        .route("/api/stats", get(handlers::reports::stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
