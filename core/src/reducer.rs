//! The reducer abstraction the engine is built on.
//!
//! Business logic lives in pure-ish reducers: `(State, Command, Environment)
//! → Result<(Event, Effects), Error>`. A command either fully applies —
//! mutating state and describing any side effects to run — or fails without
//! touching state. Side effects are descriptions, not executions; the store
//! runtime owns running them.

use smallvec::SmallVec;
use std::future::Future;
use std::pin::Pin;

/// Effects returned by a single `reduce` call.
pub type Effects<C> = SmallVec<[Effect<C>; 4]>;

/// A description of a side effect to be executed by the store runtime.
///
/// Effects are values. Returning one from a reducer does nothing by itself;
/// the runtime spawns them after the state change has been committed.
pub enum Effect<C> {
    /// No-op effect.
    None,

    /// Arbitrary async computation.
    ///
    /// Returns `Option<C>` — when `Some`, the command is fed back into the
    /// reducer as a follow-up.
    Future(Pin<Box<dyn Future<Output = Option<C>> + Send>>),
}

// Manual Debug implementation since Future doesn't implement Debug
impl<C> std::fmt::Debug for Effect<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "Effect::None"),
            Self::Future(_) => write!(f, "Effect::Future(<future>)"),
        }
    }
}

impl<C> Effect<C> {
    /// Wraps an async computation as an effect.
    pub fn future<F>(fut: F) -> Self
    where
        F: Future<Output = Option<C>> + Send + 'static,
    {
        Self::Future(Box::pin(fut))
    }
}

/// The Reducer trait — core abstraction for business logic.
///
/// A reducer validates a command against the current state, applies it, and
/// returns the event that happened together with effect descriptions. On
/// error, state is left exactly as it was.
pub trait Reducer {
    /// The state type this reducer operates on.
    type State;

    /// Requests to change state.
    type Command;

    /// Facts describing an applied change, carrying the affected data.
    type Event;

    /// Typed rejection of a command.
    type Error;

    /// Injected dependencies.
    type Environment;

    /// Processes one command.
    ///
    /// # Errors
    ///
    /// Returns the reducer's error type when the command is rejected;
    /// rejection never leaves a partial mutation behind.
    fn reduce(
        &self,
        state: &mut Self::State,
        command: Self::Command,
        env: &Self::Environment,
    ) -> Result<(Self::Event, Effects<Self::Command>), Self::Error>;
}

/// Environment traits — dependencies injected into reducers.
pub mod environment {
    use chrono::{DateTime, Utc};

    use crate::snapshot::SnapshotError;
    use crate::types::PhoneRecord;

    /// Clock trait — abstracts time operations for testability.
    pub trait Clock: Send + Sync {
        /// Get the current time.
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Destination for inventory snapshots, written after every
    /// phone-mutating event.
    pub trait SnapshotStore: Send + Sync {
        /// Persists the full active set.
        ///
        /// # Errors
        ///
        /// Returns a [`SnapshotError`] when the snapshot cannot be written.
        fn save(&self, records: &[PhoneRecord]) -> Result<(), SnapshotError>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_debug_does_not_require_future_debug() {
        let none: Effect<u32> = Effect::None;
        assert_eq!(format!("{none:?}"), "Effect::None");

        let fut: Effect<u32> = Effect::future(async { None });
        assert_eq!(format!("{fut:?}"), "Effect::Future(<future>)");
    }
}
