//! FIFO queue of prospective buyers.
//!
//! The queue is independent of inventory: a customer may be interested in a
//! model with zero stock, and attending a customer does not look up or lock
//! any phone record.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One waiting customer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerQueueEntry {
    /// Queue sequence number, unique per queue.
    pub id: u64,
    /// Customer name.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Free-text model the customer is interested in. Advisory only, no
    /// foreign-key relationship to the inventory.
    #[serde(rename = "modelo_interes")]
    pub interested_model: String,
}

/// First-in-first-out admission queue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomerQueue {
    entries: VecDeque<CustomerQueueEntry>,
    next_id: u64,
}

impl CustomerQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            next_id: 1,
        }
    }

    /// Id the next enqueued customer will receive.
    #[must_use]
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Appends a customer to the tail and returns the new entry.
    pub fn enqueue(&mut self, name: String, interested_model: String) -> &CustomerQueueEntry {
        let entry = CustomerQueueEntry {
            id: self.next_id,
            name,
            interested_model,
        };
        self.next_id += 1;
        self.entries.push_back(entry);
        // push_back guarantees the back exists
        &self.entries[self.entries.len() - 1]
    }

    /// Removes and returns the head: the longest-waiting customer.
    pub fn attend_next(&mut self) -> Option<CustomerQueueEntry> {
        self.entries.pop_front()
    }

    /// Puts a previously attended customer back at the head of the queue.
    pub fn requeue_front(&mut self, entry: CustomerQueueEntry) {
        self.entries.push_front(entry);
    }

    /// The next customer to be attended, if any.
    #[must_use]
    pub fn peek_next(&self) -> Option<&CustomerQueueEntry> {
        self.entries.front()
    }

    /// Number of waiting customers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether anyone is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates customers in service order (head first).
    pub fn iter(&self) -> impl Iterator<Item = &CustomerQueueEntry> {
        self.entries.iter()
    }
}
