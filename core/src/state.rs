//! Aggregate state of the store engine.
//!
//! One `EngineState` owns the active phone set, the history ledger, the
//! customer queue, and the derived sales history. All of it lives in memory
//! and is mutated only by the engine reducer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::history::Ledger;
use crate::queue::CustomerQueue;
use crate::types::{Money, PhoneId, PhoneRecord};

/// A completed sale, kept independently of the live record.
///
/// Sales survive later removal of the record they came from; only undoing
/// the sale itself takes one back out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Which record was sold.
    pub phone_id: PhoneId,
    /// Model at the time of sale.
    #[serde(rename = "modelo")]
    pub model: String,
    /// Sale price.
    #[serde(rename = "precio")]
    pub price: Money,
    /// When the sale happened.
    #[serde(rename = "fecha")]
    pub sold_at: DateTime<Utc>,
}

/// The complete in-memory state of the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EngineState {
    /// Active phone records, keyed by id. Iteration order is id order.
    pub phones: BTreeMap<PhoneId, PhoneRecord>,
    /// Next id to hand out. Monotonic; never reset by removals.
    pub next_phone_id: u64,
    /// Reverse-chronological action log.
    pub ledger: Ledger,
    /// Waiting customers.
    pub queue: CustomerQueue,
    /// Every sale ever made, oldest first.
    pub sales: Vec<SaleRecord>,
}

impl EngineState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phones: BTreeMap::new(),
            next_phone_id: 1,
            ledger: Ledger::new(),
            queue: CustomerQueue::new(),
            sales: Vec::new(),
        }
    }

    /// Creates a state pre-populated with records, e.g. from a snapshot
    /// file. Id assignment resumes above the highest id seen.
    #[must_use]
    pub fn with_records(records: Vec<PhoneRecord>) -> Self {
        let mut state = Self::new();
        for record in records {
            state.next_phone_id = state.next_phone_id.max(record.id.value() + 1);
            state.phones.insert(record.id, record);
        }
        state
    }

    /// Number of records in the active set.
    #[must_use]
    pub fn count(&self) -> usize {
        self.phones.len()
    }

    /// Number of active records still available for sale.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.phones.values().filter(|p| p.is_available()).count()
    }

    /// Returns a record by id.
    #[must_use]
    pub fn get(&self, id: PhoneId) -> Option<&PhoneRecord> {
        self.phones.get(&id)
    }

    /// Checks whether a record exists in the active set.
    #[must_use]
    pub fn exists(&self, id: PhoneId) -> bool {
        self.phones.contains_key(&id)
    }

    /// Snapshot of the active set, ordered by id.
    #[must_use]
    pub fn to_records(&self) -> Vec<PhoneRecord> {
        self.phones.values().cloned().collect()
    }

    /// Active records with a price inside `[min, max]`, ordered by id.
    ///
    /// Either bound may be omitted to leave that side open.
    #[must_use]
    pub fn in_price_range(&self, min: Option<Money>, max: Option<Money>) -> Vec<PhoneRecord> {
        self.phones
            .values()
            .filter(|p| min.is_none_or(|m| p.price >= m))
            .filter(|p| max.is_none_or(|m| p.price <= m))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PhoneStatus;

    fn record(id: u64, price: u64) -> PhoneRecord {
        PhoneRecord {
            id: PhoneId::new(id),
            model: "iPhone 12".to_string(),
            capacity: "128GB".to_string(),
            condition: "Nuevo".to_string(),
            price: Money::from_units(price),
            status: PhoneStatus::Available,
        }
    }

    #[test]
    fn with_records_resumes_id_assignment() {
        let state = EngineState::with_records(vec![record(3, 9000), record(7, 12000)]);
        assert_eq!(state.count(), 2);
        assert_eq!(state.next_phone_id, 8);
    }

    #[test]
    fn available_count_excludes_sold() {
        let mut state = EngineState::with_records(vec![record(1, 9000), record(2, 9500)]);
        if let Some(p) = state.phones.get_mut(&PhoneId::new(1)) {
            p.status = PhoneStatus::Sold;
        }
        assert_eq!(state.count(), 2);
        assert_eq!(state.available_count(), 1);
    }

    #[test]
    fn price_range_is_inclusive_on_both_ends() {
        let state = EngineState::with_records(vec![
            record(1, 7000),
            record(2, 9000),
            record(3, 16000),
        ]);

        let hits = state.in_price_range(
            Some(Money::from_units(7000)),
            Some(Money::from_units(9000)),
        );
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, PhoneId::new(1));

        let open_ended = state.in_price_range(Some(Money::from_units(9000)), None);
        assert_eq!(open_ended.len(), 2);
    }
}
