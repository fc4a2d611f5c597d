//! # Store Error Types
//!
//! Two layers: [`DbError`] says what went wrong in SQLite, [`StoreError`]
//! says which side of the bill store it happened on.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError::Write   ── loud: print refused, queue not advanced        │
//! │  StoreError::Query   ── quiet: queue → 1, history → empty, warn log    │
//! │  StoreError::Rejected ─ bill number outside its mode's range           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use queuebill_core::ValidationError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Two documents with the same id (uuid collision or replayed write)
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A document body could not be encoded or decoded.
    #[error("Invalid document body: {0}")]
    InvalidDocument(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::QueryFailed
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::QueryFailed("no row returned".to_string()),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: <table>.<column>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") || msg.contains("malformed JSON") {
                    DbError::InvalidDocument(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::InvalidDocument(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Store Errors
// =============================================================================

/// Bill store failures, split by direction.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The write did not happen: store unreachable or write refused.
    #[error("Store write failed: {0}")]
    Write(#[source] DbError),

    /// A read did not happen.
    #[error("Store query failed: {0}")]
    Query(#[source] DbError),

    /// The bill was refused before reaching the store.
    #[error("Bill rejected: {0}")]
    Rejected(#[from] ValidationError),
}

impl StoreError {
    /// True for every failure that means "no bill was recorded".
    pub fn is_write_error(&self) -> bool {
        matches!(self, StoreError::Write(_) | StoreError::Rejected(_))
    }
}

/// Result type for bill store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_counts_as_write_error() {
        let err: StoreError = ValidationError::OutOfRange {
            field: "table".to_string(),
            min: 1,
            max: 10,
            value: 11,
        }
        .into();
        assert!(err.is_write_error());
        assert!(StoreError::Write(DbError::PoolExhausted).is_write_error());
        assert!(!StoreError::Query(DbError::PoolExhausted).is_write_error());
    }

    #[test]
    fn test_messages() {
        let err = StoreError::Query(DbError::ConnectionFailed("offline".to_string()));
        assert_eq!(err.to_string(), "Store query failed: Connection failed: offline");
        assert_eq!(
            DbError::from(sqlx::Error::RowNotFound).to_string(),
            "Query failed: no row returned"
        );
        assert_eq!(
            DbError::from(sqlx::Error::PoolClosed).to_string(),
            "Connection failed: Pool is closed"
        );
    }

    #[test]
    fn test_json_error_is_invalid_document() {
        let err: DbError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, DbError::InvalidDocument(_)));
    }
}
