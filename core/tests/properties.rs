//! Property tests for the engine invariants: id monotonicity, aggregation
//! arithmetic, and the remove → undo round trip, under arbitrary command
//! sequences.

use std::sync::Arc;

use proptest::prelude::*;

use celustock_core::analytics::{dashboard_stats, StatsConfig};
use celustock_core::engine::{EngineCommand, EngineEnvironment, EngineEvent, EngineReducer};
use celustock_core::reducer::Reducer;
use celustock_core::{EngineState, Money, PhoneId, PhoneUpdate, Utc};
use celustock_testing::{test_clock, MemorySnapshots};

fn env() -> EngineEnvironment {
    EngineEnvironment::new(Arc::new(test_clock()), Arc::new(MemorySnapshots::new()))
}

fn arb_model() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("iPhone 13".to_string()),
        Just("iPhone 14".to_string()),
        Just("iPhone 15".to_string()),
        Just("iPhone 15 Pro".to_string()),
    ]
}

fn arb_command() -> impl Strategy<Value = EngineCommand> {
    prop_oneof![
        (arb_model(), 1_u64..40_000).prop_map(|(model, price)| EngineCommand::CreatePhone {
            model,
            capacity: "128GB".to_string(),
            condition: "Nuevo".to_string(),
            price: Money::from_units(price),
        }),
        (1_u64..12, proptest::option::of(1_u64..40_000)).prop_map(|(id, price)| {
            EngineCommand::UpdatePhone {
                id: PhoneId::new(id),
                fields: PhoneUpdate {
                    price: price.map(Money::from_units),
                    ..PhoneUpdate::default()
                },
            }
        }),
        (1_u64..12).prop_map(|id| EngineCommand::MarkSold { id: PhoneId::new(id) }),
        (1_u64..12).prop_map(|id| EngineCommand::RemovePhone { id: PhoneId::new(id) }),
        Just(EngineCommand::UndoLast),
        arb_model().prop_map(|model| EngineCommand::EnqueueCustomer {
            name: "Cliente".to_string(),
            interested_model: model,
        }),
        Just(EngineCommand::AttendNext),
    ]
}

/// Applies a command sequence, ignoring rejections, and returns the ids of
/// every record created along the way.
fn apply_all(state: &mut EngineState, commands: Vec<EngineCommand>) -> Vec<u64> {
    let reducer = EngineReducer::new();
    let env = env();
    let mut created = Vec::new();
    for command in commands {
        if let Ok((EngineEvent::PhoneCreated { record }, _)) =
            reducer.reduce(state, command, &env)
        {
            created.push(record.id.value());
        }
    }
    created
}

proptest! {
    #[test]
    fn created_ids_are_strictly_increasing(commands in proptest::collection::vec(arb_command(), 0..60)) {
        let mut state = EngineState::new();
        let created = apply_all(&mut state, commands);

        for pair in created.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn aggregation_arithmetic_holds_for_any_state(commands in proptest::collection::vec(arb_command(), 0..60)) {
        let mut state = EngineState::new();
        apply_all(&mut state, commands);

        let stats = dashboard_stats(&state, &StatsConfig::default(), Utc::now());
        let inv = &stats.inventory;

        let expected_value: Money = state.phones.values().map(|p| p.price).sum();
        prop_assert_eq!(inv.value, expected_value);
        prop_assert_eq!(inv.total, state.count() as u64);
        prop_assert!(inv.available <= inv.total);

        if inv.total == 0 {
            prop_assert_eq!(inv.average_price, 0.0);
        } else {
            let expected = inv.value.units() / inv.total as f64;
            prop_assert!((inv.average_price - expected).abs() < 1e-9);
        }

        prop_assert_eq!(inv.by_condition.values().sum::<u64>(), inv.total);
        prop_assert_eq!(inv.by_capacity.values().sum::<u64>(), inv.total);
        prop_assert_eq!(inv.segments.iter().map(|s| s.count).sum::<u64>(), inv.total);

        let sales = &stats.sales;
        let expected_revenue: Money = state.sales.iter().map(|s| s.price).sum();
        prop_assert_eq!(sales.revenue, expected_revenue);
        prop_assert_eq!(sales.total, state.sales.len() as u64);
        prop_assert!(sales.average_ticket.is_finite());
    }

    #[test]
    fn remove_then_undo_restores_the_exact_record(commands in proptest::collection::vec(arb_command(), 0..40)) {
        let mut state = EngineState::new();
        apply_all(&mut state, commands);

        let Some(id) = state.phones.keys().next().copied() else {
            return Ok(());
        };
        let before = state.phones[&id].clone();

        let reducer = EngineReducer::new();
        let env = env();
        reducer
            .reduce(&mut state, EngineCommand::RemovePhone { id }, &env)
            .map_err(|e| TestCaseError::fail(format!("remove rejected: {e}")))?;
        prop_assert!(!state.exists(id));

        reducer
            .reduce(&mut state, EngineCommand::UndoLast, &env)
            .map_err(|e| TestCaseError::fail(format!("undo rejected: {e}")))?;

        prop_assert_eq!(state.get(id), Some(&before));
    }
}
