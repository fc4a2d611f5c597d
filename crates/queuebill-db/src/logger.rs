//! # Bill Logger
//!
//! Append-only log of issued bills on top of a [`BillStore`].
//!
//! ## Failure Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  append(mode, number)                                                   │
//! │     validate ──► store.write ──► parse back ──► BillRecord              │
//! │        │              │                                                 │
//! │        ▼              ▼                                                 │
//! │   Rejected        Write          LOUD: caller must not print/advance   │
//! │                                                                         │
//! │  recent(count)                                                          │
//! │     store.query_recent ──► parse each ──► newest first                  │
//! │              │                  │                                       │
//! │              ▼                  ▼                                       │
//! │         [] + warn        drop doc + warn   QUIET: never propagated     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use queuebill_core::document::BILLS_COLLECTION;
use queuebill_core::{parse_bill, Bill, BillMode, BillRecord, DocumentDraft, RecentQuery};
use tracing::{debug, error, info, warn};

use crate::error::{DbError, StoreError, StoreResult};
use crate::store::BillStore;

/// Records issued bills and reads them back.
#[derive(Clone)]
pub struct BillLogger {
    store: Arc<dyn BillStore>,
}

impl BillLogger {
    /// Creates a logger that owns `store`.
    pub fn new(store: impl BillStore + 'static) -> Self {
        BillLogger {
            store: Arc::new(store),
        }
    }

    /// Creates a logger over a store shared with other components.
    pub fn shared(store: Arc<dyn BillStore>) -> Self {
        BillLogger { store }
    }

    /// Writes a new bill and returns it as stored.
    ///
    /// ## Errors
    /// - [`StoreError::Rejected`] - `number` is outside the mode's range
    /// - [`StoreError::Write`] - the store is unreachable or refused the write
    ///
    /// On error nothing was recorded.
    pub async fn append(&self, mode: BillMode, number: u32) -> StoreResult<BillRecord> {
        let bill = Bill::new(mode, number).map_err(|e| {
            warn!(mode = %mode, number, error = %e, "Bill rejected before write");
            StoreError::from(e)
        })?;

        let doc = self
            .store
            .write(BILLS_COLLECTION, DocumentDraft::for_bill(&bill))
            .await
            .map_err(|e| {
                error!(mode = %mode, number, error = %e, "Failed to record bill");
                e
            })?;

        let record = parse_bill(&doc).map_err(|e| {
            error!(id = %doc.id, error = %e, "Store returned an unreadable bill");
            StoreError::Write(DbError::InvalidDocument(e.to_string()))
        })?;

        info!(id = %record.id, mode = %record.mode, number = record.number, "Bill recorded");
        Ok(record)
    }

    /// Up to `count` most recent bills, newest first. Empty on failure.
    pub async fn recent(&self, count: u32) -> Vec<BillRecord> {
        match self.try_recent(count).await {
            Ok(records) => records,
            Err(e) => {
                warn!(count, error = %e, "Bill history unavailable");
                Vec::new()
            }
        }
    }

    /// Same as [`recent`](Self::recent) but reports query failures.
    ///
    /// Documents that do not parse as bills are skipped either way.
    pub async fn try_recent(&self, count: u32) -> StoreResult<Vec<BillRecord>> {
        let docs = self.store.query_recent(&RecentQuery::bills(count)).await?;
        let fetched = docs.len();

        let records: Vec<BillRecord> = docs
            .iter()
            .filter_map(|doc| match parse_bill(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(id = %doc.id, error = %e, "Skipping malformed bill document");
                    None
                }
            })
            .collect();

        debug!(fetched, parsed = records.len(), "Loaded recent bills");
        Ok(records)
    }
}

impl std::fmt::Debug for BillLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillLogger").finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::store::MemoryStore;
    use queuebill_core::RawDocument;
    use serde_json::json;

    #[tokio::test]
    async fn test_append_then_recent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let logger = BillLogger::new(db.bills());

        let record = logger.append(BillMode::DineIn, 7).await.unwrap();
        assert_eq!(record.mode, BillMode::DineIn);
        assert_eq!(record.number, 7);

        let recent = logger.recent(1).await;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].number, 7);
        assert_eq!(recent[0].mode, BillMode::DineIn);
        assert_eq!(recent[0], record);
    }

    #[tokio::test]
    async fn test_out_of_range_is_rejected_without_write() {
        let store = Arc::new(MemoryStore::new());
        let logger = BillLogger::shared(store.clone());

        let err = logger.append(BillMode::DineIn, 11).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
        let err = logger.append(BillMode::Takeaway, 0).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
        assert!(store.is_empty(BILLS_COLLECTION));
    }

    #[tokio::test]
    async fn test_write_failure_is_loud() {
        let store = Arc::new(MemoryStore::new());
        store.fail_writes(true);
        let logger = BillLogger::shared(store.clone());

        let err = logger.append(BillMode::Takeaway, 12).await.unwrap_err();
        assert!(err.is_write_error());
        assert!(store.is_empty(BILLS_COLLECTION));
    }

    #[tokio::test]
    async fn test_query_failure_is_quiet() {
        let store = Arc::new(MemoryStore::new());
        let logger = BillLogger::shared(store.clone());
        logger.append(BillMode::DineIn, 1).await.unwrap();

        store.fail_queries(true);
        assert!(logger.recent(8).await.is_empty());
        assert!(logger.try_recent(8).await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_documents_are_skipped() {
        let store = Arc::new(MemoryStore::new());
        let logger = BillLogger::shared(store.clone());
        logger.append(BillMode::DineIn, 4).await.unwrap();

        let junk = json!({"type": "DELIVERY", "number": 3, "timestamp": "2999-01-01T00:00:00.000Z"});
        if let serde_json::Value::Object(fields) = junk {
            store.insert_raw(BILLS_COLLECTION, RawDocument::new("junk", fields));
        }

        let recent = logger.recent(8).await;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].number, 4);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let logger = BillLogger::new(db.bills());
        logger.append(BillMode::Takeaway, 1).await.unwrap();
        logger.append(BillMode::DineIn, 3).await.unwrap();
        logger.append(BillMode::Takeaway, 2).await.unwrap();

        let recent = logger.recent(8).await;
        let seen: Vec<(BillMode, u32)> = recent.iter().map(|r| (r.mode, r.number)).collect();
        assert_eq!(
            seen,
            vec![
                (BillMode::Takeaway, 2),
                (BillMode::DineIn, 3),
                (BillMode::Takeaway, 1)
            ]
        );
    }
}
