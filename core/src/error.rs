//! Error taxonomy for the state engine.
//!
//! Every failure identifies the entity that caused it. Commands validate
//! fully before touching state, so a returned error always means nothing
//! was mutated.

use crate::types::PhoneId;

/// Errors produced by engine commands.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Bad input shape or value (empty required field, non-positive price).
    #[error("invalid `{field}`: {reason}")]
    Validation {
        /// Wire name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// An operation referenced an id the active set does not contain.
    #[error("phone {id} not found")]
    NotFound {
        /// The unknown id.
        id: PhoneId,
    },

    /// Illegal lifecycle transition: the record is already sold.
    #[error("phone {id} is already sold")]
    AlreadySold {
        /// The record in the wrong state.
        id: PhoneId,
    },

    /// Undo was requested with an empty history ledger.
    #[error("nothing to undo")]
    EmptyLedger,

    /// Attend-next was requested with an empty customer queue.
    #[error("no customers waiting")]
    EmptyQueue,

    /// The ledger head references a record that no longer exists.
    #[error("cannot revert sale of phone {id}: record no longer exists")]
    InconsistentState {
        /// The id the ledger head points at.
        id: PhoneId,
    },
}

impl EngineError {
    /// Convenience constructor for a blank required field.
    #[must_use]
    pub fn blank_field(field: &'static str) -> Self {
        Self::Validation {
            field,
            reason: "must not be empty".to_string(),
        }
    }

    /// Stable machine-readable code for transport layers.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadySold { .. } => "INVALID_STATE",
            Self::EmptyLedger => "EMPTY_LEDGER",
            Self::EmptyQueue => "EMPTY_QUEUE",
            Self::InconsistentState { .. } => "INCONSISTENT_STATE",
        }
    }
}
