//! # Unit Conversion Policy
//!
//! Stock is counted in two units: `quả` (a single item) and `khay`
//! (a pack of [`ITEMS_PER_PACK`] items). Stock ceilings are always expressed
//! in items; quantities on a line are expressed in the line's unit.
//!
//! ## Conversion Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     1 khay = 30 quả                                     │
//! │                                                                         │
//! │  quả ──► khay   quantity = ceil(quantity / 30)                          │
//! │  khay ──► quả   quantity = quantity × 30                                │
//! │                                                                         │
//! │  Pack ceiling   floor(remain_quantity / 30)                             │
//! │  Item ceiling   remain_quantity                                         │
//! │                                                                         │
//! │  10 quả ──► 1 khay ──► 30 quả   (lossy round trip, `ceil` on the way)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same rules drive single-line switches, bulk switches and the
//! editor in every mode, so the conversion cannot drift between screens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Number of items in one pack (khay).
pub const ITEMS_PER_PACK: i64 = 30;

/// Stock-counting unit of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Unit {
    /// A single item.
    #[default]
    #[serde(rename = "quả")]
    Qua,
    /// A pack of 30 items.
    #[serde(rename = "khay")]
    Khay,
}

impl Unit {
    /// How many items one unit of `self` holds.
    #[inline]
    pub const fn factor(self) -> i64 {
        match self {
            Unit::Qua => 1,
            Unit::Khay => ITEMS_PER_PACK,
        }
    }

    /// Item-equivalent of `quantity` expressed in this unit.
    #[inline]
    pub const fn to_items(self, quantity: i64) -> i64 {
        quantity.saturating_mul(self.factor())
    }

    /// Largest quantity in this unit that fits in `remain_items`.
    #[inline]
    pub const fn ceiling(self, remain_items: i64) -> i64 {
        if remain_items <= 0 {
            return 0;
        }
        remain_items / self.factor()
    }

    /// Converts `quantity` from `self` into `target`.
    ///
    /// quả→khay rounds up, khay→quả multiplies. Same unit is identity.
    pub fn convert(self, quantity: i64, target: Unit) -> i64 {
        match (self, target) {
            (Unit::Qua, Unit::Khay) => quantity
                .saturating_add(ITEMS_PER_PACK - 1)
                .div_euclid(ITEMS_PER_PACK),
            (Unit::Khay, Unit::Qua) => quantity.saturating_mul(ITEMS_PER_PACK),
            _ => quantity,
        }
    }

    /// Label used on the wire and in messages.
    pub const fn label(self) -> &'static str {
        match self {
            Unit::Qua => "quả",
            Unit::Khay => "khay",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quả" | "qua" => Ok(Unit::Qua),
            "khay" => Ok(Unit::Khay),
            other => Err(ValidationError::NotAllowed {
                field: "unit".to_string(),
                value: other.to_string(),
                allowed: vec!["quả".to_string(), "khay".to_string()],
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_equivalents() {
        assert_eq!(Unit::Qua.to_items(7), 7);
        assert_eq!(Unit::Khay.to_items(2), 60);
    }

    #[test]
    fn test_ceilings() {
        assert_eq!(Unit::Qua.ceiling(50), 50);
        assert_eq!(Unit::Khay.ceiling(50), 1);
        assert_eq!(Unit::Khay.ceiling(29), 0);
        assert_eq!(Unit::Khay.ceiling(-3), 0);
    }

    #[test]
    fn test_conversion_rounds_up_to_packs() {
        assert_eq!(Unit::Qua.convert(1, Unit::Khay), 1);
        assert_eq!(Unit::Qua.convert(30, Unit::Khay), 1);
        assert_eq!(Unit::Qua.convert(31, Unit::Khay), 2);
        assert_eq!(Unit::Khay.convert(2, Unit::Qua), 60);
        assert_eq!(Unit::Khay.convert(2, Unit::Khay), 2);
    }

    #[test]
    fn test_conversion_of_huge_quantities_does_not_wrap() {
        assert_eq!(Unit::Qua.convert(i64::MAX, Unit::Khay), i64::MAX / ITEMS_PER_PACK);
        assert_eq!(Unit::Khay.convert(i64::MAX, Unit::Qua), i64::MAX);
    }

    /// quả→khay→quả is lossy because of the `ceil`; documented, not a bug.
    #[test]
    fn test_round_trip_is_lossy_within_one_pack() {
        for original in 1..=90 {
            let packs = Unit::Qua.convert(original, Unit::Khay);
            let back = Unit::Khay.convert(packs, Unit::Qua);
            assert!(back >= original);
            assert!(back - original < ITEMS_PER_PACK);
        }
    }

    #[test]
    fn test_serde_labels() {
        assert_eq!(serde_json::to_string(&Unit::Qua).unwrap(), "\"quả\"");
        assert_eq!(serde_json::to_string(&Unit::Khay).unwrap(), "\"khay\"");
        let parsed: Unit = serde_json::from_str("\"khay\"").unwrap();
        assert_eq!(parsed, Unit::Khay);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Quả".parse::<Unit>().unwrap(), Unit::Qua);
        assert_eq!("qua".parse::<Unit>().unwrap(), Unit::Qua);
        assert_eq!(" khay ".parse::<Unit>().unwrap(), Unit::Khay);
        assert!("hộp".parse::<Unit>().is_err());
    }
}
