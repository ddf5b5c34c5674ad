//! Domain types for the phone inventory.
//!
//! Records carry the Spanish wire vocabulary of the store's API
//! (`modelo`, `capacidad`, `condicion`, `precio`, `estado`) via serde
//! renames while keeping English names in code.

use serde::{Deserialize, Serialize};

/// Unique identifier for a phone record.
///
/// Identifiers are assigned by the engine, strictly increasing, and never
/// reused, even after a record is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneId(u64);

impl PhoneId {
    /// Creates a `PhoneId` from a raw integer.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PhoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Money amount in cents of the base currency (avoids floating point issues).
///
/// Amounts are serialized on the wire as a decimal number of whole units,
/// matching the store's API (`precio: 20000.0`). Currency conversion is a
/// display-time transform and never touches stored amounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    /// Creates a new `Money` amount from cents.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` amount from whole currency units.
    #[must_use]
    pub const fn from_units(units: u64) -> Self {
        Self(units * 100)
    }

    /// Returns the amount in cents.
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Returns the amount as a decimal number of whole units.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Prices are far below 2^52 cents
    pub fn units(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Checks if this amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parses a decimal amount of whole units, rejecting negative and
    /// non-finite values.
    ///
    /// # Errors
    ///
    /// Returns a description of the offending value when it cannot
    /// represent a price.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Guarded above
    pub fn try_from_units(value: f64) -> Result<Self, String> {
        if !value.is_finite() {
            return Err(format!("amount must be a finite number, got {value}"));
        }
        if value < 0.0 {
            return Err(format!("amount cannot be negative, got {value}"));
        }
        Ok(Self((value * 100.0).round() as u64))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|m| m.0).sum())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.units())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::try_from_units(value).map_err(serde::de::Error::custom)
    }
}

/// Lifecycle status of a phone record.
///
/// Removal is not a status: removed records leave the active set entirely
/// and survive only as snapshots inside the history ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhoneStatus {
    /// In stock and sellable.
    #[default]
    #[serde(rename = "Disponible")]
    Available,
    /// Sold; still queryable but no longer sellable.
    #[serde(rename = "Vendido")]
    Sold,
}

impl PhoneStatus {
    /// Returns the wire name of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Disponible",
            Self::Sold => "Vendido",
        }
    }
}

impl std::fmt::Display for PhoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PhoneStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Disponible" => Ok(Self::Available),
            "Vendido" => Ok(Self::Sold),
            other => Err(format!("unknown status `{other}`")),
        }
    }
}

/// One inventory unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhoneRecord {
    /// Unique, never-reused identifier.
    pub id: PhoneId,
    /// Device name, e.g. "iPhone 15 Pro".
    #[serde(rename = "modelo")]
    pub model: String,
    /// Storage size token, e.g. "128GB".
    #[serde(rename = "capacidad")]
    pub capacity: String,
    /// Condition label, e.g. "Nuevo" or "Seminuevo". Open string set.
    #[serde(rename = "condicion")]
    pub condition: String,
    /// Price in the base currency. Always positive.
    #[serde(rename = "precio")]
    pub price: Money,
    /// Current lifecycle status.
    #[serde(rename = "estado")]
    pub status: PhoneStatus,
}

impl PhoneRecord {
    /// Checks whether this record is still sellable.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self.status, PhoneStatus::Available)
    }

    /// Human-readable label used in history entries ("model capacity").
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.model, self.capacity)
    }
}

/// Partial field set for updating a phone record.
///
/// `id` and `estado` are deliberately absent: identity is immutable and
/// status only changes through the sell/remove/undo transitions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneUpdate {
    /// New device name, if changing.
    #[serde(rename = "modelo", default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// New storage size, if changing.
    #[serde(rename = "capacidad", default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
    /// New condition label, if changing.
    #[serde(rename = "condicion", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// New price, if changing.
    #[serde(rename = "precio", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_display() {
        assert_eq!(Money::from_cents(100).to_string(), "$1.00");
        assert_eq!(Money::from_cents(1050).to_string(), "$10.50");
        assert_eq!(Money::from_units(20000).to_string(), "$20000.00");
    }

    #[test]
    fn money_wire_format_is_decimal_units() {
        let json = serde_json::to_string(&Money::from_units(20000)).unwrap();
        assert_eq!(json, "20000.0");

        let parsed: Money = serde_json::from_str("199.99").unwrap();
        assert_eq!(parsed, Money::from_cents(19999));
    }

    #[test]
    fn money_rejects_negative_amounts() {
        assert!(serde_json::from_str::<Money>("-1.0").is_err());
        assert!(Money::try_from_units(f64::NAN).is_err());
        assert!(Money::try_from_units(f64::INFINITY).is_err());
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&PhoneStatus::Available).unwrap(),
            "\"Disponible\""
        );
        assert_eq!(
            serde_json::to_string(&PhoneStatus::Sold).unwrap(),
            "\"Vendido\""
        );
        assert_eq!("Vendido".parse::<PhoneStatus>(), Ok(PhoneStatus::Sold));
        assert!("Reservado".parse::<PhoneStatus>().is_err());
    }

    #[test]
    fn record_uses_spanish_field_names() {
        let record = PhoneRecord {
            id: PhoneId::new(1),
            model: "iPhone 15".to_string(),
            capacity: "128GB".to_string(),
            condition: "Nuevo".to_string(),
            price: Money::from_units(20000),
            status: PhoneStatus::Available,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["modelo"], "iPhone 15");
        assert_eq!(json["capacidad"], "128GB");
        assert_eq!(json["condicion"], "Nuevo");
        assert_eq!(json["precio"], 20000.0);
        assert_eq!(json["estado"], "Disponible");
    }

    #[test]
    fn record_label() {
        let record = PhoneRecord {
            id: PhoneId::new(7),
            model: "iPhone 14 Pro".to_string(),
            capacity: "256GB".to_string(),
            condition: "Seminuevo".to_string(),
            price: Money::from_units(15000),
            status: PhoneStatus::Available,
        };
        assert_eq!(record.label(), "iPhone 14 Pro 256GB");
    }
}
