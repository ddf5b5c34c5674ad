//! Seed-data generator for first boots without a snapshot file.
//!
//! Produces a plausible inventory from a fixed model/base-price table with
//! capacity surcharges and a discount for Seminuevo units.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::{Money, PhoneId, PhoneRecord, PhoneStatus};

/// Model catalog with base prices in whole currency units.
const MODELS: [(&str, u64); 21] = [
    ("iPhone 11", 7000),
    ("iPhone 11 Pro", 8500),
    ("iPhone 11 Pro Max", 9500),
    ("iPhone 12", 9000),
    ("iPhone 12 Pro", 11000),
    ("iPhone 12 Pro Max", 12000),
    ("iPhone 13", 11000),
    ("iPhone 13 Pro", 14000),
    ("iPhone 13 Pro Max", 16000),
    ("iPhone 14", 13000),
    ("iPhone 14 Pro", 17000),
    ("iPhone 14 Pro Max", 19000),
    ("iPhone 15", 16000),
    ("iPhone 15 Pro", 21000),
    ("iPhone 15 Pro Max", 24000),
    ("iPhone 16", 19000),
    ("iPhone 16 Pro", 25000),
    ("iPhone 16 Pro Max", 28000),
    ("iPhone 17", 22000),
    ("iPhone 17 Pro", 29000),
    ("iPhone 17 Pro Max", 32000),
];

const CAPACITIES: [&str; 5] = ["64GB", "128GB", "256GB", "512GB", "1TB"];
const CONDITIONS: [&str; 2] = ["Nuevo", "Seminuevo"];

/// Generates `count` available records with ids `1..=count`.
#[must_use]
pub fn generate<R: Rng>(count: usize, rng: &mut R) -> Vec<PhoneRecord> {
    (1..=count as u64)
        .map(|id| {
            let (model, base) = MODELS[rng.gen_range(0..MODELS.len())];
            let capacity = CAPACITIES
                .choose(rng)
                .copied()
                .unwrap_or("128GB");
            let condition = CONDITIONS.choose(rng).copied().unwrap_or("Nuevo");

            let mut cents = base * 100;
            if model.contains("Pro") {
                cents += 2000 * 100;
            }
            cents += match capacity {
                "256GB" => 1500 * 100,
                "512GB" => 3000 * 100,
                "1TB" => 5000 * 100,
                _ => 0,
            };
            if condition == "Seminuevo" {
                cents = cents * 3 / 4;
            }

            PhoneRecord {
                id: PhoneId::new(id),
                model: model.to_string(),
                capacity: capacity.to_string(),
                condition: condition.to_string(),
                price: Money::from_cents(cents),
                status: PhoneStatus::Available,
            }
        })
        .collect()
}
