//! # Counter Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ConfigError ──────┐                                                    │
//! │  DbError ──────────┤  startup: fatal, the process exits with a message  │
//! │                    ▼                                                    │
//! │              CounterError                                               │
//! │                    ▲                                                    │
//! │  StoreError ───────┤  print: failed print, nothing recorded             │
//! │  Busy ─────────────┤  print: refused, no side effects                   │
//! │  ValidationError ──┘  table picker: out of range                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use queuebill_core::{CoreError, ValidationError};
use queuebill_db::{DbError, StoreError};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors surfaced to the operator.
#[derive(Debug, Error)]
pub enum CounterError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The bill store could not be opened.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// The bill was not recorded.
    #[error("Print failed: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid selection: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// A print is already in flight.
    #[error("A print is already in progress")]
    Busy,

    /// Writing the print page or reading operator input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CounterError {
    /// True when no bill was recorded because the store refused it.
    pub fn is_store_write(&self) -> bool {
        matches!(self, CounterError::Store(e) if e.is_write_error())
    }
}

/// Result type for counter operations.
pub type CounterResult<T> = Result<T, CounterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(CounterError::Busy.to_string(), "A print is already in progress");
        let err: CounterError = ConfigError::Invalid("history.count must be positive".into()).into();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: history.count must be positive"
        );
    }

    #[test]
    fn test_store_write_classification() {
        let err: CounterError = StoreError::Write(DbError::PoolExhausted).into();
        assert!(err.is_store_write());
        assert_eq!(err.to_string(), "Print failed: Store write failed: Connection pool exhausted");
        assert!(!CounterError::Busy.is_store_write());
    }
}
