//! Display-time currency conversion.
//!
//! Stored amounts are always in the base currency (MXN). Conversion happens
//! on a response copy right before serialization and is never written back.

use celustock_core::{Money, PhoneRecord};
use serde::Deserialize;

/// Fixed display rate: 1 MXN ≈ 0.05 USD.
pub const MXN_TO_USD: f64 = 0.05;

/// Currencies the API can render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum Currency {
    /// Base currency; amounts pass through untouched.
    #[default]
    #[serde(rename = "MXN")]
    Mxn,
    /// Converted at [`MXN_TO_USD`] for display.
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    /// Converts a stored amount into this display currency.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )] // Rate is positive; prices are far below 2^52 cents
    pub fn display(self, amount: Money) -> Money {
        match self {
            Self::Mxn => amount,
            Self::Usd => Money::from_cents((amount.cents() as f64 * MXN_TO_USD).round() as u64),
        }
    }

    /// Rewrites the prices of a response copy into this display currency.
    #[must_use]
    pub fn display_records(self, mut records: Vec<PhoneRecord>) -> Vec<PhoneRecord> {
        if self == Self::Mxn {
            return records;
        }
        for record in &mut records {
            record.price = self.display(record.price);
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celustock_core::{PhoneId, PhoneStatus};

    #[test]
    fn mxn_passes_through() {
        let amount = Money::from_units(20000);
        assert_eq!(Currency::Mxn.display(amount), amount);
    }

    #[test]
    fn usd_applies_the_fixed_rate() {
        assert_eq!(
            Currency::Usd.display(Money::from_units(20000)),
            Money::from_units(1000)
        );
    }

    #[test]
    fn record_conversion_touches_only_the_copy() {
        let records = vec![PhoneRecord {
            id: PhoneId::new(1),
            model: "iPhone 15".to_string(),
            capacity: "128GB".to_string(),
            condition: "Nuevo".to_string(),
            price: Money::from_units(16000),
            status: PhoneStatus::Available,
        }];

        let displayed = Currency::Usd.display_records(records.clone());
        assert_eq!(displayed[0].price, Money::from_units(800));
        assert_eq!(records[0].price, Money::from_units(16000));
    }
}
