//! # Domain Types
//!
//! Core domain types used throughout Queuebill.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    BillMode     │   │      Bill       │   │   BillRecord    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  DineIn         │   │  mode           │   │  id (store)     │       │
//! │  │  Takeaway       │   │  number (valid) │   │  mode, number   │       │
//! │  └─────────────────┘   └─────────────────┘   │  issued_at      │       │
//! │                                              └─────────────────┘       │
//! │                                                                         │
//! │  Bill is what the operator asks for; BillRecord is what the store      │
//! │  gave back after the write (id + server timestamp).                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::validation::{validate_bill_number, ValidationResult};

// =============================================================================
// Bill Mode
// =============================================================================

/// Service mode of a bill.
///
/// Stored under the document key `type` as `"DINE_IN"` / `"TAKEAWAY"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillMode {
    /// Eat at the restaurant, numbered by table (1-10).
    DineIn,
    /// Take home, numbered by the daily queue (1-100, wrapping).
    Takeaway,
}

impl BillMode {
    /// Wire name used in store documents.
    pub const fn as_str(&self) -> &'static str {
        match self {
            BillMode::DineIn => "DINE_IN",
            BillMode::Takeaway => "TAKEAWAY",
        }
    }

    /// Whether bills of this mode consume a queue number.
    #[inline]
    pub const fn uses_queue(&self) -> bool {
        matches!(self, BillMode::Takeaway)
    }
}

impl Default for BillMode {
    fn default() -> Self {
        BillMode::DineIn
    }
}

impl std::fmt::Display for BillMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BillMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "dine_in" | "dinein" | "table" => Ok(BillMode::DineIn),
            "takeaway" | "take_away" | "queue" => Ok(BillMode::Takeaway),
            _ => Err(CoreError::UnknownMode(s.to_string())),
        }
    }
}

// =============================================================================
// Bill
// =============================================================================

/// A bill the operator is about to issue: a mode plus a number that is
/// guaranteed to be inside that mode's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Bill {
    mode: BillMode,
    number: u32,
}

impl Bill {
    /// Creates a bill, rejecting numbers outside the mode's range.
    pub fn new(mode: BillMode, number: u32) -> ValidationResult<Self> {
        validate_bill_number(mode, number)?;
        Ok(Bill { mode, number })
    }

    /// A dine-in bill for `table`.
    pub fn dine_in(table: u32) -> ValidationResult<Self> {
        Bill::new(BillMode::DineIn, table)
    }

    /// A takeaway bill for queue number `queue`.
    pub fn takeaway(queue: u32) -> ValidationResult<Self> {
        Bill::new(BillMode::Takeaway, queue)
    }

    #[inline]
    pub fn mode(&self) -> BillMode {
        self.mode
    }

    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }
}

// =============================================================================
// Bill Record
// =============================================================================

/// An issued bill as recorded by the store. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillRecord {
    /// Opaque identifier assigned by the store.
    pub id: String,

    /// Service mode.
    pub mode: BillMode,

    /// Table number (dine-in) or queue number (takeaway).
    pub number: u32,

    /// Server-assigned write time.
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
}

impl BillRecord {
    /// The (mode, number) pair of this record.
    pub fn bill(&self) -> ValidationResult<Bill> {
        Bill::new(self.mode, self.number)
    }

    #[inline]
    pub fn is_takeaway(&self) -> bool {
        self.mode == BillMode::Takeaway
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_wire_names() {
        assert_eq!(
            serde_json::to_string(&BillMode::DineIn).unwrap(),
            "\"DINE_IN\""
        );
        assert_eq!(
            serde_json::from_str::<BillMode>("\"TAKEAWAY\"").unwrap(),
            BillMode::Takeaway
        );
        assert_eq!(BillMode::Takeaway.to_string(), "TAKEAWAY");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("dine-in".parse::<BillMode>().unwrap(), BillMode::DineIn);
        assert_eq!("DINE_IN".parse::<BillMode>().unwrap(), BillMode::DineIn);
        assert_eq!("Takeaway".parse::<BillMode>().unwrap(), BillMode::Takeaway);
        assert!("delivery".parse::<BillMode>().is_err());
    }

    #[test]
    fn test_mode_default() {
        assert_eq!(BillMode::default(), BillMode::DineIn);
        assert!(!BillMode::DineIn.uses_queue());
        assert!(BillMode::Takeaway.uses_queue());
    }

    #[test]
    fn test_bill_range_checked() {
        assert!(Bill::dine_in(1).is_ok());
        assert!(Bill::dine_in(10).is_ok());
        assert!(Bill::dine_in(11).is_err());
        assert!(Bill::takeaway(100).is_ok());
        assert!(Bill::takeaway(0).is_err());
        assert!(Bill::takeaway(101).is_err());
    }
}
