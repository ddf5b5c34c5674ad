//! # CeluStock Core
//!
//! The inventory & sales state engine for a small phone retailer.
//!
//! ## Core concepts
//!
//! - **State**: [`state::EngineState`] — the active phone set, history
//!   ledger, customer queue, and sales history.
//! - **Command**: [`engine::EngineCommand`] — every request to change state.
//! - **Reducer**: [`engine::EngineReducer`] — validates a command fully,
//!   applies it, and returns the [`engine::EngineEvent`] that happened plus
//!   side-effect descriptions.
//! - **Effect**: [`reducer::Effect`] — side effects as values (snapshot
//!   writes), executed by the store runtime.
//! - **Environment**: [`engine::EngineEnvironment`] — injected clock and
//!   snapshot destination.
//!
//! Analytics ([`analytics`]) are pure projections over the state and are
//! recomputed on demand, never cached.

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::SmallVec;

pub mod analytics;
pub mod engine;
pub mod error;
pub mod history;
pub mod queue;
pub mod reducer;
pub mod seed;
pub mod snapshot;
pub mod state;
pub mod types;

pub use engine::{EngineCommand, EngineEnvironment, EngineEvent, EngineReducer, UndoOutcome};
pub use error::EngineError;
pub use state::EngineState;
pub use types::{Money, PhoneId, PhoneRecord, PhoneStatus, PhoneUpdate};
