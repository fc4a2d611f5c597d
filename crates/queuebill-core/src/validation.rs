//! # Validation Module
//!
//! Range checks for bill numbers and operator settings.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Counter session                                              │
//! │  └── select_table() rejects anything outside 1-10                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: BillLogger::append()                                         │
//! │  └── THIS MODULE: number must sit in its mode's range                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Document parsing on read                                     │
//! │  └── Out-of-range documents are dropped, never trusted                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::BillMode;
use crate::{QUEUE_MAX, TABLE_COUNT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a dine-in table number (1..=TABLE_COUNT).
///
/// ## Example
/// ```rust
/// use queuebill_core::validation::validate_table_number;
///
/// assert!(validate_table_number(7).is_ok());
/// assert!(validate_table_number(0).is_err());
/// assert!(validate_table_number(11).is_err());
/// ```
pub fn validate_table_number(table: u32) -> ValidationResult<()> {
    check_range("table", table, 1, TABLE_COUNT)
}

/// Validates a takeaway queue number (1..=QUEUE_MAX).
pub fn validate_queue_number(queue: u32) -> ValidationResult<()> {
    check_range("queue", queue, 1, QUEUE_MAX)
}

/// Validates `number` against the range of `mode`.
pub fn validate_bill_number(mode: BillMode, number: u32) -> ValidationResult<()> {
    match mode {
        BillMode::DineIn => validate_table_number(number),
        BillMode::Takeaway => validate_queue_number(number),
    }
}

/// Validates a count setting (lookback, history size) is at least one.
pub fn validate_count(field: &str, count: u32) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn check_range(field: &str, value: u32, min: u32, max: u32) -> ValidationResult<()> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: i64::from(min),
            max: i64::from(max),
            value: i64::from(value),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
