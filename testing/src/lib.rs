//! # CeluStock Testing
//!
//! Testing utilities for the CeluStock engine:
//! - Mock implementations of environment traits (`FixedClock`,
//!   `MemorySnapshots`)
//! - The [`ReducerTest`] Given-When-Then builder
//! - Assertion helpers for effects

use chrono::{DateTime, Utc};
use celustock_core::reducer::environment::{Clock, SnapshotStore};

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, SnapshotStore, Utc};
    use celustock_core::snapshot::SnapshotError;
    use celustock_core::types::PhoneRecord;
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests.
    ///
    /// Always returns the same time, making tests reproducible.
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time.
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC).
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// In-memory snapshot store that records every save.
    #[derive(Debug, Default)]
    pub struct MemorySnapshots {
        saves: Mutex<Vec<Vec<PhoneRecord>>>,
    }

    impl MemorySnapshots {
        /// Creates an empty store.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// How many times `save` was called.
        #[must_use]
        pub fn save_count(&self) -> usize {
            self.lock().len()
        }

        /// The records from the most recent save, if any.
        #[must_use]
        pub fn last_save(&self) -> Option<Vec<PhoneRecord>> {
            self.lock().last().cloned()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<PhoneRecord>>> {
            match self.saves.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            }
        }
    }

    impl SnapshotStore for MemorySnapshots {
        fn save(&self, records: &[PhoneRecord]) -> Result<(), SnapshotError> {
            self.lock().push(records.to_vec());
            Ok(())
        }
    }
}


// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, MemorySnapshots};
pub use reducer_test::{assertions, ReducerTest};
