//! The store engine reducer: phone lifecycle, undo, and the customer queue.
//!
//! Commands validate fully against current state before anything is
//! mutated, then apply as an event describing exactly what happened. The
//! event carries the affected record or queue entry so transport layers can
//! render it without re-reading state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::EngineError;
use crate::history::LedgerAction;
use crate::queue::CustomerQueueEntry;
use crate::reducer::environment::{Clock, SnapshotStore};
use crate::reducer::{Effect, Effects, Reducer};
use crate::state::{EngineState, SaleRecord};
use crate::types::{Money, PhoneId, PhoneRecord, PhoneStatus, PhoneUpdate};

/// Requests to change store state.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCommand {
    /// Add a new phone to the inventory.
    CreatePhone {
        /// Device name.
        model: String,
        /// Storage size token.
        capacity: String,
        /// Condition label.
        condition: String,
        /// Price; must be positive.
        price: Money,
    },

    /// Edit an existing phone. Identity and status are untouchable.
    UpdatePhone {
        /// Record to edit.
        id: PhoneId,
        /// Fields to change.
        fields: PhoneUpdate,
    },

    /// Transition a record Available → Sold.
    MarkSold {
        /// Record to sell.
        id: PhoneId,
    },

    /// Eject a record from the active set, whatever its status.
    RemovePhone {
        /// Record to remove.
        id: PhoneId,
    },

    /// Reverse the most recent ledger entry.
    UndoLast,

    /// Append a customer to the waiting queue.
    EnqueueCustomer {
        /// Customer name.
        name: String,
        /// Model the customer is interested in (advisory free text).
        interested_model: String,
    },

    /// Serve the longest-waiting customer.
    AttendNext,
}

/// What reversing the ledger head actually did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo", content = "resultado")]
pub enum UndoOutcome {
    /// A removed record was re-inserted, original id and status intact.
    #[serde(rename = "restaurado")]
    PhoneRestored(PhoneRecord),
    /// A sale was reverted; the record is Available again.
    #[serde(rename = "venta_revertida")]
    SaleReverted(PhoneRecord),
    /// An attended customer went back to the head of the queue.
    #[serde(rename = "cliente_reencolado")]
    CustomerRequeued(CustomerQueueEntry),
}

/// Facts about applied state changes.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// A phone joined the inventory.
    PhoneCreated {
        /// The new record.
        record: PhoneRecord,
    },
    /// A phone's editable fields changed.
    PhoneUpdated {
        /// The record after the edit.
        record: PhoneRecord,
    },
    /// A phone was sold.
    PhoneSold {
        /// The record, now `Sold`.
        record: PhoneRecord,
        /// Sale timestamp.
        occurred_at: DateTime<Utc>,
    },
    /// A phone left the active set.
    PhoneRemoved {
        /// The record as it was at removal time.
        snapshot: PhoneRecord,
        /// Removal timestamp.
        occurred_at: DateTime<Utc>,
    },
    /// The ledger head was reversed.
    UndoApplied {
        /// What the reversal did.
        outcome: UndoOutcome,
    },
    /// A customer joined the queue.
    CustomerEnqueued {
        /// The queued entry.
        entry: CustomerQueueEntry,
    },
    /// The longest-waiting customer was served.
    CustomerAttended {
        /// The customer taken off the queue.
        customer: CustomerQueueEntry,
        /// Service timestamp.
        occurred_at: DateTime<Utc>,
    },
}

impl EngineEvent {
    /// Whether this event changed the active phone set (and therefore
    /// warrants a snapshot write).
    #[must_use]
    pub const fn touches_inventory(&self) -> bool {
        match self {
            Self::PhoneCreated { .. }
            | Self::PhoneUpdated { .. }
            | Self::PhoneSold { .. }
            | Self::PhoneRemoved { .. } => true,
            Self::UndoApplied { outcome } => !matches!(outcome, UndoOutcome::CustomerRequeued(_)),
            Self::CustomerEnqueued { .. } | Self::CustomerAttended { .. } => false,
        }
    }
}

/// Environment dependencies for the engine reducer.
#[derive(Clone)]
pub struct EngineEnvironment {
    /// Clock for timestamps on sales and ledger entries.
    pub clock: Arc<dyn Clock>,
    /// Destination for inventory snapshots.
    pub snapshots: Arc<dyn SnapshotStore>,
}

impl EngineEnvironment {
    /// Creates a new `EngineEnvironment`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, snapshots: Arc<dyn SnapshotStore>) -> Self {
        Self { clock, snapshots }
    }
}

/// Reducer for the store engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineReducer;

impl EngineReducer {
    /// Creates a new `EngineReducer`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate_text(field: &'static str, value: &str) -> Result<(), EngineError> {
        if value.trim().is_empty() {
            return Err(EngineError::blank_field(field));
        }
        Ok(())
    }

    fn validate_price(price: Money) -> Result<(), EngineError> {
        if price.is_zero() {
            return Err(EngineError::Validation {
                field: "precio",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Validates a `CreatePhone` command.
    fn validate_create(
        model: &str,
        capacity: &str,
        condition: &str,
        price: Money,
    ) -> Result<(), EngineError> {
        Self::validate_text("modelo", model)?;
        Self::validate_text("capacidad", capacity)?;
        Self::validate_text("condicion", condition)?;
        Self::validate_price(price)
    }

    /// Validates an `UpdatePhone` command against the same field rules.
    fn validate_update(fields: &PhoneUpdate) -> Result<(), EngineError> {
        if let Some(model) = &fields.model {
            Self::validate_text("modelo", model)?;
        }
        if let Some(capacity) = &fields.capacity {
            Self::validate_text("capacidad", capacity)?;
        }
        if let Some(condition) = &fields.condition {
            Self::validate_text("condicion", condition)?;
        }
        if let Some(price) = fields.price {
            Self::validate_price(price)?;
        }
        Ok(())
    }

    /// Decides what reversing the current ledger head would do, without
    /// mutating anything.
    fn plan_undo(state: &EngineState) -> Result<UndoOutcome, EngineError> {
        let head = state.ledger.head().ok_or(EngineError::EmptyLedger)?;
        match &head.action {
            LedgerAction::Removed { snapshot } => Ok(UndoOutcome::PhoneRestored(snapshot.clone())),
            LedgerAction::Sold { phone_id } => {
                let record = state
                    .get(*phone_id)
                    .ok_or(EngineError::InconsistentState { id: *phone_id })?;
                let mut reverted = record.clone();
                reverted.status = PhoneStatus::Available;
                Ok(UndoOutcome::SaleReverted(reverted))
            }
            LedgerAction::Attended { customer } => {
                Ok(UndoOutcome::CustomerRequeued(customer.clone()))
            }
        }
    }

    /// Applies an event to state.
    fn apply_event(state: &mut EngineState, event: &EngineEvent) {
        match event {
            EngineEvent::PhoneCreated { record } => {
                state.next_phone_id = record.id.value() + 1;
                state.phones.insert(record.id, record.clone());
            }
            EngineEvent::PhoneUpdated { record } => {
                state.phones.insert(record.id, record.clone());
            }
            EngineEvent::PhoneSold {
                record,
                occurred_at,
            } => {
                state.phones.insert(record.id, record.clone());
                state.sales.push(SaleRecord {
                    phone_id: record.id,
                    model: record.model.clone(),
                    price: record.price,
                    sold_at: *occurred_at,
                });
                state.ledger.record(
                    record.label(),
                    LedgerAction::Sold {
                        phone_id: record.id,
                    },
                    *occurred_at,
                );
            }
            EngineEvent::PhoneRemoved {
                snapshot,
                occurred_at,
            } => {
                state.phones.remove(&snapshot.id);
                state.ledger.record(
                    snapshot.label(),
                    LedgerAction::Removed {
                        snapshot: snapshot.clone(),
                    },
                    *occurred_at,
                );
            }
            EngineEvent::UndoApplied { outcome } => {
                state.ledger.pop_head();
                match outcome {
                    UndoOutcome::PhoneRestored(record) => {
                        state.phones.insert(record.id, record.clone());
                    }
                    UndoOutcome::SaleReverted(record) => {
                        state.phones.insert(record.id, record.clone());
                        if let Some(pos) =
                            state.sales.iter().rposition(|s| s.phone_id == record.id)
                        {
                            state.sales.remove(pos);
                        }
                    }
                    UndoOutcome::CustomerRequeued(entry) => {
                        state.queue.requeue_front(entry.clone());
                    }
                }
            }
            EngineEvent::CustomerEnqueued { entry } => {
                state
                    .queue
                    .enqueue(entry.name.clone(), entry.interested_model.clone());
            }
            EngineEvent::CustomerAttended {
                customer,
                occurred_at,
            } => {
                state.queue.attend_next();
                state.ledger.record(
                    customer.interested_model.clone(),
                    LedgerAction::Attended {
                        customer: customer.clone(),
                    },
                    *occurred_at,
                );
            }
        }
    }

    /// Snapshot effect emitted after every inventory-changing event.
    fn snapshot_effect(state: &EngineState, env: &EngineEnvironment) -> Effect<EngineCommand> {
        let records = state.to_records();
        let snapshots = Arc::clone(&env.snapshots);
        Effect::future(async move {
            if let Err(err) = snapshots.save(&records) {
                tracing::warn!(error = %err, "failed to persist inventory snapshot");
            }
            None
        })
    }
}

impl Reducer for EngineReducer {
    type State = EngineState;
    type Command = EngineCommand;
    type Event = EngineEvent;
    type Error = EngineError;
    type Environment = EngineEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        command: Self::Command,
        env: &Self::Environment,
    ) -> Result<(Self::Event, Effects<Self::Command>), Self::Error> {
        let event = match command {
            EngineCommand::CreatePhone {
                model,
                capacity,
                condition,
                price,
            } => {
                Self::validate_create(&model, &capacity, &condition, price)?;
                let record = PhoneRecord {
                    id: PhoneId::new(state.next_phone_id),
                    model,
                    capacity,
                    condition,
                    price,
                    status: PhoneStatus::Available,
                };
                EngineEvent::PhoneCreated { record }
            }

            EngineCommand::UpdatePhone { id, fields } => {
                let record = state.get(id).ok_or(EngineError::NotFound { id })?;
                Self::validate_update(&fields)?;
                let mut updated = record.clone();
                if let Some(model) = fields.model {
                    updated.model = model;
                }
                if let Some(capacity) = fields.capacity {
                    updated.capacity = capacity;
                }
                if let Some(condition) = fields.condition {
                    updated.condition = condition;
                }
                if let Some(price) = fields.price {
                    updated.price = price;
                }
                EngineEvent::PhoneUpdated { record: updated }
            }

            EngineCommand::MarkSold { id } => {
                let record = state.get(id).ok_or(EngineError::NotFound { id })?;
                if !record.is_available() {
                    return Err(EngineError::AlreadySold { id });
                }
                let mut sold = record.clone();
                sold.status = PhoneStatus::Sold;
                EngineEvent::PhoneSold {
                    record: sold,
                    occurred_at: env.clock.now(),
                }
            }

            EngineCommand::RemovePhone { id } => {
                let snapshot = state.get(id).ok_or(EngineError::NotFound { id })?.clone();
                EngineEvent::PhoneRemoved {
                    snapshot,
                    occurred_at: env.clock.now(),
                }
            }

            EngineCommand::UndoLast => {
                let outcome = Self::plan_undo(state)?;
                EngineEvent::UndoApplied { outcome }
            }

            EngineCommand::EnqueueCustomer {
                name,
                interested_model,
            } => {
                Self::validate_text("nombre", &name)?;
                Self::validate_text("modelo_interes", &interested_model)?;
                let entry = CustomerQueueEntry {
                    id: state.queue.next_id(),
                    name,
                    interested_model,
                };
                EngineEvent::CustomerEnqueued { entry }
            }

            EngineCommand::AttendNext => {
                let customer = state
                    .queue
                    .peek_next()
                    .ok_or(EngineError::EmptyQueue)?
                    .clone();
                EngineEvent::CustomerAttended {
                    customer,
                    occurred_at: env.clock.now(),
                }
            }
        };

        Self::apply_event(state, &event);

        let mut effects = Effects::new();
        if event.touches_inventory() {
            effects.push(Self::snapshot_effect(state, env));
        }
        Ok((event, effects))
    }
}
