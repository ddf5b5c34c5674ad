//! Application state shared across all HTTP handlers.

use std::sync::Arc;

use celustock_core::analytics::StatsConfig;
use celustock_core::engine::EngineReducer;
use celustock_core::reducer::environment::Clock;
use celustock_runtime::Store;

/// The store type the server runs: the engine reducer under the runtime.
pub type EngineStore = Store<EngineReducer>;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The single engine store instance; created at process start, torn
    /// down at process exit. No hidden statics.
    pub store: Arc<EngineStore>,
    /// Aggregation configuration (segments, top-N, default trend window).
    pub stats: StatsConfig,
    /// Clock for the trend window end; injected for testability.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<EngineStore>, stats: StatsConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            stats,
            clock,
        }
    }
}
