//! # Error Types
//!
//! Domain-specific error types for queuebill-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  queuebill-core errors (this file)                                     │
//! │  ├── CoreError        - Domain errors (bad documents, bad options)     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  queuebill-db errors (separate crate)                                  │
//! │  ├── DbError          - SQLite operation failures                      │
//! │  └── StoreError       - Write (loud) / Query (quiet) store failures    │
//! │                                                                         │
//! │  counter app errors                                                    │
//! │  └── CounterError     - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → StoreError::Rejected → CounterError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A store document could not be turned into a [`crate::BillRecord`].
    ///
    /// ## When This Occurs
    /// - A required key (`type`, `number`, `timestamp`) is missing
    /// - A key holds the wrong JSON type
    /// - The server timestamp has not been filled in yet
    #[error("Document {id} is malformed: {reason}")]
    MalformedDocument { id: String, reason: String },

    /// Unknown service mode string.
    #[error("Unknown bill mode: '{0}'")]
    UnknownMode(String),

    /// Unknown time zone setting.
    #[error("Unknown time zone: '{0}' (expected \"local\", \"utc\" or an offset like \"+07:00\")")]
    UnknownZone(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a MalformedDocument error.
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::MalformedDocument {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used before a bill is written and again when documents are read back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        value: i64,
    },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
