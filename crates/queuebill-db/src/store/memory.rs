//! Process-local [`BillStore`] for tests and dry runs.
//!
//! The store has its own clock, separate from whatever clock the caller
//! uses, so tests can put the "server" on a different day than the counter.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use queuebill_core::document::{instant_of, SortDirection};
use queuebill_core::{Clock, DocumentDraft, RawDocument, RecentQuery, SystemClock};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::BillStore;
use crate::error::{DbError, StoreError, StoreResult};

/// In-memory document store with failure switches.
pub struct MemoryStore {
    clock: Arc<dyn Clock>,
    collections: RwLock<HashMap<String, Vec<RawDocument>>>,
    fail_writes: AtomicBool,
    fail_queries: AtomicBool,
}

impl MemoryStore {
    /// Empty store stamping documents with the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Empty store stamping documents with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        MemoryStore {
            clock,
            collections: RwLock::new(HashMap::new()),
            fail_writes: AtomicBool::new(false),
            fail_queries: AtomicBool::new(false),
        }
    }

    /// Makes every following write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every following query fail (or succeed again).
    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Inserts a document as-is, bypassing server fields. For seeding
    /// malformed or back-dated data.
    pub fn insert_raw(&self, collection: &str, doc: RawDocument) {
        if let Ok(mut collections) = self.collections.write() {
            collections.entry(collection.to_string()).or_default().push(doc);
        }
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|c| c.get(collection).map(Vec::len).unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("fail_writes", &self.fail_writes)
            .field("fail_queries", &self.fail_queries)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BillStore for MemoryStore {
    async fn write(&self, collection: &str, draft: DocumentDraft) -> StoreResult<RawDocument> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write(DbError::ConnectionFailed(
                "memory store is refusing writes".to_string(),
            )));
        }

        let doc = draft.materialize(Uuid::new_v4().to_string(), self.clock.now());
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Write(DbError::Internal("lock poisoned".to_string())))?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());

        debug!(id = %doc.id, collection = %collection, "Document written");
        Ok(doc)
    }

    async fn query_recent(&self, query: &RecentQuery) -> StoreResult<Vec<RawDocument>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Query(DbError::ConnectionFailed(
                "memory store is refusing queries".to_string(),
            )));
        }

        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::Query(DbError::Internal("lock poisoned".to_string())))?;
        let Some(docs) = collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        // Insertion order breaks ties, newest insert counting as newest.
        let mut ordered: Vec<(usize, &RawDocument)> = docs.iter().enumerate().collect();
        ordered.sort_by(|(ia, a), (ib, b)| {
            let key_a = sort_key(a.get(&query.order_by));
            let key_b = sort_key(b.get(&query.order_by));
            key_a.cmp(&key_b).then(ia.cmp(ib))
        });
        if query.direction == SortDirection::Descending {
            ordered.reverse();
        }

        Ok(ordered
            .into_iter()
            .take(query.limit as usize)
            .map(|(_, doc)| doc.clone())
            .collect())
    }
}

/// Epoch microseconds of a timestamp value. Anything else sorts oldest.
fn sort_key(value: Option<&Value>) -> Option<i64> {
    value.and_then(instant_of).map(|t| t.timestamp_micros())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use queuebill_core::document::BILLS_COLLECTION;
    use queuebill_core::{parse_bill, Bill, FixedClock};
    use serde_json::json;

    #[tokio::test]
    async fn test_store_clock_stamps_documents() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 19, 4, 0, 0).unwrap()));
        let store = MemoryStore::with_clock(clock.clone());

        let doc = store
            .write(BILLS_COLLECTION, DocumentDraft::for_bill(&Bill::takeaway(3).unwrap()))
            .await
            .unwrap();
        let record = parse_bill(&doc).unwrap();
        assert_eq!(record.issued_at, clock.now());
        assert_eq!(store.len(BILLS_COLLECTION), 1);
    }

    #[tokio::test]
    async fn test_newest_first_with_ties() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 19, 4, 0, 0).unwrap()));
        let store = MemoryStore::with_clock(clock.clone());

        for n in [1, 2, 3] {
            store
                .write(BILLS_COLLECTION, DocumentDraft::for_bill(&Bill::dine_in(n).unwrap()))
                .await
                .unwrap();
        }
        clock.advance(chrono::Duration::minutes(1));
        store
            .write(BILLS_COLLECTION, DocumentDraft::for_bill(&Bill::dine_in(9).unwrap()))
            .await
            .unwrap();

        let docs = store.query_recent(&RecentQuery::bills(3)).await.unwrap();
        let numbers: Vec<u32> = docs.iter().map(|d| parse_bill(d).unwrap().number).collect();
        assert_eq!(numbers, vec![9, 3, 2]);
    }

    #[tokio::test]
    async fn test_orders_by_instant_across_timestamp_forms() {
        let store = MemoryStore::new();
        let yesterday = Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap().timestamp();
        let four_utc = Utc.with_ymd_and_hms(2026, 10, 19, 4, 0, 0).unwrap().timestamp();
        let stamps = [
            (40, json!({ "seconds": yesterday, "nanoseconds": 0 })),
            (41, json!("2026-10-19T09:00:00+07:00")),
            (42, json!("2026-10-19T03:00:00.000Z")),
            (43, json!({ "seconds": four_utc })),
            (44, json!(null)),
        ];
        for (number, stamp) in stamps {
            let doc = DocumentDraft::new()
                .set("type", "TAKEAWAY")
                .set("number", number)
                .set("timestamp", stamp)
                .materialize(format!("doc-{}", number), Utc::now());
            store.insert_raw(BILLS_COLLECTION, doc);
        }

        let numbers = |docs: Vec<RawDocument>| -> Vec<u64> {
            docs.iter().map(|d| d.get("number").and_then(Value::as_u64).unwrap()).collect()
        };
        let newest = store.query_recent(&RecentQuery::bills(10)).await.unwrap();
        assert_eq!(numbers(newest), vec![43, 42, 41, 40, 44]);

        let oldest = RecentQuery {
            direction: SortDirection::Ascending,
            ..RecentQuery::bills(2)
        };
        assert_eq!(numbers(store.query_recent(&oldest).await.unwrap()), vec![44, 40]);
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let store = MemoryStore::new();

        store.fail_writes(true);
        let err = store
            .write(BILLS_COLLECTION, DocumentDraft::for_bill(&Bill::dine_in(1).unwrap()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Write(_)));
        assert!(store.is_empty(BILLS_COLLECTION));

        store.fail_queries(true);
        let err = store.query_recent(&RecentQuery::bills(5)).await.unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));

        store.fail_writes(false);
        store.fail_queries(false);
        assert!(store.query_recent(&RecentQuery::bills(5)).await.unwrap().is_empty());
    }
}
