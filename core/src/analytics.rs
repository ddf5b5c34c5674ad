//! Pure dashboard analytics over the engine state.
//!
//! Everything here is a projection: recomputed on demand from the active
//! set and the sales history, never cached, never mutated. Empty inputs
//! yield zero-valued statistics; no computation can fail or produce
//! NaN/infinite values.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::EngineState;
use crate::types::Money;

/// Spanish month abbreviations used for trend labels.
const MONTH_LABELS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// Tuning knobs for the aggregation. Callers configure once at startup.
#[derive(Clone, Debug)]
pub struct StatsConfig {
    /// Ascending price boundaries; each consecutive pair forms a
    /// `[from, to)` segment and the last boundary opens an unbounded one.
    pub segment_boundaries: Vec<Money>,
    /// How many top models / top sellers to report.
    pub top_n: usize,
    /// Default trailing window (in months) for the trend series.
    pub trend_periods: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            segment_boundaries: vec![
                Money::from_units(10_000),
                Money::from_units(15_000),
                Money::from_units(20_000),
                Money::from_units(25_000),
            ],
            top_n: 5,
            trend_periods: 6,
        }
    }
}

/// One price histogram bucket. `to` is absent for the last, unbounded one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceSegment {
    /// Display label, e.g. `"10000-15000"` or `"25000+"`.
    pub label: String,
    /// Inclusive lower bound.
    pub from: Money,
    /// Exclusive upper bound, if bounded.
    pub to: Option<Money>,
    /// Active records falling in this bucket.
    #[serde(rename = "cantidad")]
    pub count: u64,
}

/// A model ranked by stocked units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopModel {
    /// Model name.
    pub model: String,
    /// Active records of this model.
    #[serde(rename = "cantidad")]
    pub count: u64,
}

/// A model ranked by sales revenue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopSeller {
    /// Model name.
    pub model: String,
    /// Units sold.
    #[serde(rename = "cantidad")]
    pub count: u64,
    /// Revenue from those sales.
    #[serde(rename = "ingresos")]
    pub revenue: Money,
}

/// One month of the sales trend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Spanish month abbreviation, e.g. `"Jun"`.
    #[serde(rename = "mes")]
    pub label: String,
    /// Sales closed in this month.
    #[serde(rename = "ventas")]
    pub sales: u64,
    /// Revenue from those sales.
    #[serde(rename = "ingresos")]
    pub revenue: Money,
}

/// Inventory side of the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryStats {
    /// Records in the active set.
    pub total: u64,
    /// Records still available for sale.
    pub available: u64,
    /// Sum of prices over the active set.
    pub value: Money,
    /// `value / total`, or 0 when empty.
    pub average_price: f64,
    /// Highest active price, or 0 when empty.
    pub max_price: Money,
    /// Lowest active price, or 0 when empty.
    pub min_price: Money,
    /// Count per distinct condition label.
    pub by_condition: BTreeMap<String, u64>,
    /// Count per distinct capacity token.
    pub by_capacity: BTreeMap<String, u64>,
    /// Price histogram; zero-count buckets omitted.
    pub segments: Vec<PriceSegment>,
    /// Most stocked models.
    pub top_models: Vec<TopModel>,
}

/// Sales side of the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesStats {
    /// Sales ever made (later removals do not reduce this).
    pub total: u64,
    /// Sum of sale prices.
    pub revenue: Money,
    /// `revenue / total`, or 0 when empty.
    pub average_ticket: f64,
    /// Best-selling models by revenue.
    pub top_models: Vec<TopSeller>,
}

/// The full dashboard projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Inventory figures.
    #[serde(rename = "inventario")]
    pub inventory: InventoryStats,
    /// Sales figures.
    #[serde(rename = "ventas")]
    pub sales: SalesStats,
    /// Monthly trend over the configured trailing window.
    #[serde(rename = "tendencia")]
    pub trend: Vec<TrendPoint>,
}

/// Computes the full dashboard in one pass.
#[must_use]
pub fn dashboard_stats(
    state: &EngineState,
    config: &StatsConfig,
    now: DateTime<Utc>,
) -> DashboardStats {
    DashboardStats {
        inventory: inventory_stats(state, config),
        sales: sales_stats(state, config.top_n),
        trend: sales_trend(state, now, config.trend_periods),
    }
}

/// Inventory totals, distributions, segments, and top stocked models.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Counts are far below 2^52
pub fn inventory_stats(state: &EngineState, config: &StatsConfig) -> InventoryStats {
    let total = state.count() as u64;
    let available = state.available_count() as u64;
    let value: Money = state.phones.values().map(|p| p.price).sum();
    let average_price = if total == 0 {
        0.0
    } else {
        value.units() / total as f64
    };
    let max_price = state
        .phones
        .values()
        .map(|p| p.price)
        .max()
        .unwrap_or_default();
    let min_price = state
        .phones
        .values()
        .map(|p| p.price)
        .min()
        .unwrap_or_default();

    let mut by_condition: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_capacity: BTreeMap<String, u64> = BTreeMap::new();
    for record in state.phones.values() {
        *by_condition.entry(record.condition.clone()).or_default() += 1;
        *by_capacity.entry(record.capacity.clone()).or_default() += 1;
    }

    InventoryStats {
        total,
        available,
        value,
        average_price,
        max_price,
        min_price,
        by_condition,
        by_capacity,
        segments: price_segments(state, &config.segment_boundaries),
        top_models: top_models(state, config.top_n),
    }
}

/// Histograms active records into `[from, to)` price buckets.
///
/// Buckets with no records are omitted from the result.
#[must_use]
pub fn price_segments(state: &EngineState, boundaries: &[Money]) -> Vec<PriceSegment> {
    // bucket i covers [boundary[i-1], boundary[i]); the final bucket is
    // unbounded above the last boundary
    let mut counts = vec![0_u64; boundaries.len() + 1];
    for record in state.phones.values() {
        let idx = boundaries.partition_point(|b| record.price >= *b);
        counts[idx] += 1;
    }

    counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(idx, count)| {
            let from = if idx == 0 {
                Money::default()
            } else {
                boundaries[idx - 1]
            };
            let to = boundaries.get(idx).copied();
            let label = match to {
                Some(to) => format!("{}-{}", from.cents() / 100, to.cents() / 100),
                None => format!("{}+", from.cents() / 100),
            };
            PriceSegment {
                label,
                from,
                to,
                count: *count,
            }
        })
        .collect()
}

/// Active records grouped by model, ranked by count descending; ties break
/// on the model name.
#[must_use]
pub fn top_models(state: &EngineState, top_n: usize) -> Vec<TopModel> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in state.phones.values() {
        *counts.entry(record.model.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<TopModel> = counts
        .into_iter()
        .map(|(model, count)| TopModel {
            model: model.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.model.cmp(&b.model)));
    ranked.truncate(top_n);
    ranked
}

/// Sales totals and the best sellers by revenue (ties: count, then name).
#[must_use]
#[allow(clippy::cast_precision_loss)] // Counts are far below 2^52
pub fn sales_stats(state: &EngineState, top_n: usize) -> SalesStats {
    let total = state.sales.len() as u64;
    let revenue: Money = state.sales.iter().map(|s| s.price).sum();
    let average_ticket = if total == 0 {
        0.0
    } else {
        revenue.units() / total as f64
    };

    let mut grouped: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for sale in &state.sales {
        let slot = grouped.entry(sale.model.as_str()).or_default();
        slot.0 += 1;
        slot.1 += sale.price.cents();
    }

    let mut top: Vec<TopSeller> = grouped
        .into_iter()
        .map(|(model, (count, cents))| TopSeller {
            model: model.to_string(),
            count,
            revenue: Money::from_cents(cents),
        })
        .collect();
    top.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.model.cmp(&b.model))
    });
    top.truncate(top_n);

    SalesStats {
        total,
        revenue,
        average_ticket,
        top_models: top,
    }
}

/// Monthly sales figures for the trailing `periods` months ending at `now`.
///
/// Goal comparison and percentage rendering belong to the display layer;
/// this reports actuals only.
#[must_use]
pub fn sales_trend(state: &EngineState, now: DateTime<Utc>, periods: u32) -> Vec<TrendPoint> {
    let now_ordinal = month_ordinal(now);

    (0..i64::from(periods))
        .rev()
        .map(|offset| {
            let target = now_ordinal - offset;
            let mut sales = 0_u64;
            let mut cents = 0_u64;
            for sale in &state.sales {
                if month_ordinal(sale.sold_at) == target {
                    sales += 1;
                    cents += sale.price.cents();
                }
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            // rem_euclid(12) is always in 0..12
            let label = MONTH_LABELS[target.rem_euclid(12) as usize].to_string();
            TrendPoint {
                label,
                sales,
                revenue: Money::from_cents(cents),
            }
        })
        .collect()
}

/// Months since year zero; adjacent months differ by exactly one.
fn month_ordinal(at: DateTime<Utc>) -> i64 {
    i64::from(at.year()) * 12 + i64::from(at.month0())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SaleRecord;
    use crate::types::{PhoneId, PhoneRecord, PhoneStatus};
    use chrono::TimeZone;

    fn record(id: u64, model: &str, capacity: &str, condition: &str, price: u64) -> PhoneRecord {
        PhoneRecord {
            id: PhoneId::new(id),
            model: model.to_string(),
            capacity: capacity.to_string(),
            condition: condition.to_string(),
            price: Money::from_units(price),
            status: PhoneStatus::Available,
        }
    }

    fn sale(id: u64, model: &str, price: u64, year: i32, month: u32) -> SaleRecord {
        SaleRecord {
            phone_id: PhoneId::new(id),
            model: model.to_string(),
            price: Money::from_units(price),
            sold_at: Utc.with_ymd_and_hms(year, month, 15, 12, 0, 0).unwrap(),
        }
    }

    fn stocked_state() -> EngineState {
        EngineState::with_records(vec![
            record(1, "iPhone 15", "128GB", "Nuevo", 16000),
            record(2, "iPhone 15", "256GB", "Nuevo", 17500),
            record(3, "iPhone 13", "64GB", "Seminuevo", 8200),
            record(4, "iPhone 14 Pro", "256GB", "Nuevo", 18500),
        ])
    }

    #[test]
    fn empty_state_yields_zeros_not_nan() {
        let stats = dashboard_stats(&EngineState::new(), &StatsConfig::default(), Utc::now());

        assert_eq!(stats.inventory.total, 0);
        assert_eq!(stats.inventory.value, Money::default());
        assert_eq!(stats.inventory.average_price, 0.0);
        assert_eq!(stats.inventory.max_price, Money::default());
        assert!(stats.inventory.segments.is_empty());
        assert_eq!(stats.sales.total, 0);
        assert_eq!(stats.sales.average_ticket, 0.0);
        assert!(stats.sales.average_ticket.is_finite());
    }

    #[test]
    fn inventory_totals_and_averages() {
        let mut state = stocked_state();
        if let Some(p) = state.phones.get_mut(&PhoneId::new(3)) {
            p.status = PhoneStatus::Sold;
        }

        let stats = inventory_stats(&state, &StatsConfig::default());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.available, 3);
        assert_eq!(stats.value, Money::from_units(60200));
        assert!((stats.average_price - 15050.0).abs() < f64::EPSILON);
        assert_eq!(stats.max_price, Money::from_units(18500));
        assert_eq!(stats.min_price, Money::from_units(8200));
    }

    #[test]
    fn distribution_counts_sum_to_total() {
        let state = stocked_state();
        let stats = inventory_stats(&state, &StatsConfig::default());

        assert_eq!(stats.by_condition.values().sum::<u64>(), stats.total);
        assert_eq!(stats.by_capacity.values().sum::<u64>(), stats.total);
        assert_eq!(stats.by_condition["Nuevo"], 3);
        assert_eq!(stats.by_condition["Seminuevo"], 1);
        assert_eq!(stats.by_capacity["256GB"], 2);
    }

    #[test]
    fn segments_are_half_open_and_omit_empty_buckets() {
        let state = EngineState::with_records(vec![
            record(1, "a", "64GB", "Nuevo", 9_999),
            record(2, "b", "64GB", "Nuevo", 10_000), // lands in the next bucket
            record(3, "c", "64GB", "Nuevo", 26_000),
        ]);

        let segments = price_segments(&state, &StatsConfig::default().segment_boundaries);
        assert_eq!(segments.len(), 3);

        assert_eq!(segments[0].label, "0-10000");
        assert_eq!(segments[0].count, 1);
        assert_eq!(segments[1].label, "10000-15000");
        assert_eq!(segments[1].count, 1);
        assert_eq!(segments[2].label, "25000+");
        assert_eq!(segments[2].to, None);
        assert_eq!(segments[2].count, 1);

        let counted: u64 = segments.iter().map(|s| s.count).sum();
        assert_eq!(counted, 3);
    }

    #[test]
    fn top_models_rank_by_count_with_name_tiebreak() {
        let state = EngineState::with_records(vec![
            record(1, "iPhone 15", "128GB", "Nuevo", 16000),
            record(2, "iPhone 15", "256GB", "Nuevo", 17500),
            record(3, "iPhone 13", "64GB", "Nuevo", 11000),
            record(4, "iPhone 14", "64GB", "Nuevo", 13000),
        ]);

        let top = top_models(&state, 3);
        assert_eq!(top[0].model, "iPhone 15");
        assert_eq!(top[0].count, 2);
        // tie between iPhone 13 and iPhone 14 breaks alphabetically
        assert_eq!(top[1].model, "iPhone 13");
        assert_eq!(top[2].model, "iPhone 14");
    }

    #[test]
    fn top_sellers_rank_by_revenue_then_count_then_name() {
        let mut state = EngineState::new();
        state.sales = vec![
            sale(1, "iPhone 15", 16000, 2025, 6),
            sale(2, "iPhone 15", 16000, 2025, 6),
            sale(3, "iPhone 14 Pro", 17000, 2025, 6),
            sale(4, "iPhone 13", 32000, 2025, 7),
            sale(5, "iPhone 12", 1000, 2025, 7),
        ];

        let stats = sales_stats(&state, 3);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.revenue, Money::from_units(82000));
        assert!((stats.average_ticket - 16400.0).abs() < f64::EPSILON);

        // iPhone 13 and iPhone 15 tie on revenue; iPhone 15 sold more units
        assert_eq!(stats.top_models[0].model, "iPhone 15");
        assert_eq!(stats.top_models[0].count, 2);
        assert_eq!(stats.top_models[1].model, "iPhone 13");
        assert_eq!(stats.top_models[2].model, "iPhone 14 Pro");
    }

    #[test]
    fn trend_buckets_by_month_over_trailing_window() {
        let mut state = EngineState::new();
        state.sales = vec![
            sale(1, "iPhone 15", 16000, 2025, 11),
            sale(2, "iPhone 15", 16000, 2025, 11),
            sale(3, "iPhone 14", 13000, 2025, 9),
            sale(4, "iPhone 13", 11000, 2025, 5), // outside a 6-month window
        ];
        let now = Utc.with_ymd_and_hms(2025, 11, 30, 10, 0, 0).unwrap();

        let trend = sales_trend(&state, now, 6);
        assert_eq!(trend.len(), 6);
        assert_eq!(trend[0].label, "Jun");
        assert_eq!(trend[0].sales, 0);
        assert_eq!(trend[3].label, "Sep");
        assert_eq!(trend[3].sales, 1);
        assert_eq!(trend[5].label, "Nov");
        assert_eq!(trend[5].sales, 2);
        assert_eq!(trend[5].revenue, Money::from_units(32000));
    }

    #[test]
    fn trend_window_crosses_year_boundaries() {
        let mut state = EngineState::new();
        state.sales = vec![sale(1, "iPhone 15", 16000, 2024, 12)];
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();

        let trend = sales_trend(&state, now, 3);
        assert_eq!(trend[0].label, "Dic");
        assert_eq!(trend[0].sales, 1);
        assert_eq!(trend[2].label, "Feb");
    }
}
