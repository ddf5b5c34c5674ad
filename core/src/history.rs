//! The history ledger: a reverse-chronological log of destructive actions.
//!
//! Entries are prepended, so the head is always the most recent action and
//! the only one eligible for undo. The ledger grows without bound; nothing
//! is ever evicted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::queue::CustomerQueueEntry;
use crate::types::{PhoneId, PhoneRecord};

/// What a ledger entry records, with exactly the data its reversal needs.
///
/// Only removals carry a full snapshot; a sold entry references the record
/// by id because the record itself stays in the active set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "accion")]
pub enum LedgerAction {
    /// A record transitioned Available → Sold.
    #[serde(rename = "Vendido")]
    Sold {
        /// The record that was sold.
        #[serde(rename = "celular")]
        phone_id: PhoneId,
    },
    /// A record was ejected from the active set.
    #[serde(rename = "Eliminado")]
    Removed {
        /// Full copy of the record as it was at removal time.
        #[serde(rename = "respaldo")]
        snapshot: PhoneRecord,
    },
    /// The longest-waiting customer was attended.
    #[serde(rename = "Atendido")]
    Attended {
        /// The customer taken off the queue.
        #[serde(rename = "cliente")]
        customer: CustomerQueueEntry,
    },
}

impl LedgerAction {
    /// Wire name of the action kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Sold { .. } => "Vendido",
            Self::Removed { .. } => "Eliminado",
            Self::Attended { .. } => "Atendido",
        }
    }
}

/// One reversible action in the ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Ledger sequence number, unique and increasing.
    pub id: u64,
    /// Human-readable label of the affected item.
    #[serde(rename = "descripcion")]
    pub subject: String,
    /// The recorded action and its reversal payload.
    #[serde(flatten)]
    pub action: LedgerAction,
    /// When the action happened.
    #[serde(rename = "fecha")]
    pub occurred_at: DateTime<Utc>,
}

/// Append-only action log ordered most-recent-first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ledger {
    entries: VecDeque<HistoryEntry>,
    next_id: u64,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            next_id: 1,
        }
    }

    /// Prepends a new entry and returns a reference to it.
    pub fn record(
        &mut self,
        subject: String,
        action: LedgerAction,
        occurred_at: DateTime<Utc>,
    ) -> &HistoryEntry {
        let entry = HistoryEntry {
            id: self.next_id,
            subject,
            action,
            occurred_at,
        };
        self.next_id += 1;
        self.entries.push_front(entry);
        // push_front guarantees the front exists
        &self.entries[0]
    }

    /// The most recent entry, if any. Only this entry can be undone.
    #[must_use]
    pub fn head(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Removes and returns the head entry.
    pub fn pop_head(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_front()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether the ledger has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries most-recent-first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}
