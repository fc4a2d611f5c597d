//! # Bill Store
//!
//! The document store that holds issued bills.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         BillStore                                       │
//! │                                                                         │
//! │  write(collection, draft)                                               │
//! │     ├── assigns an opaque id                                            │
//! │     ├── fills draft.server_timestamp_key() with the STORE's clock       │
//! │     └── returns the document exactly as stored                          │
//! │                                                                         │
//! │  query_recent(RecentQuery { collection, order_by, direction, limit })   │
//! │     └── raw documents, no parsing; the caller decides what is a bill    │
//! │                                                                         │
//! │  Implementations:                                                       │
//! │     SqliteBillStore  ── database file, shared by counters on a machine │
//! │     MemoryStore      ── process-local, failure switches for tests      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No update or delete: once written a document is immutable.

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use queuebill_core::{DocumentDraft, RawDocument, RecentQuery};

use crate::error::StoreResult;

pub use memory::MemoryStore;
pub use sqlite::SqliteBillStore;

/// Schemaless document store keyed by opaque ids.
#[async_trait]
pub trait BillStore: Send + Sync {
    /// Writes a new document and returns it with its id and server fields.
    ///
    /// Fails with [`StoreError::Write`](crate::StoreError::Write).
    async fn write(&self, collection: &str, draft: DocumentDraft) -> StoreResult<RawDocument>;

    /// Reads the newest documents of a collection.
    ///
    /// Fails with [`StoreError::Query`](crate::StoreError::Query).
    async fn query_recent(&self, query: &RecentQuery) -> StoreResult<Vec<RawDocument>>;
}

#[async_trait]
impl<S: BillStore + ?Sized> BillStore for Arc<S> {
    async fn write(&self, collection: &str, draft: DocumentDraft) -> StoreResult<RawDocument> {
        (**self).write(collection, draft).await
    }

    async fn query_recent(&self, query: &RecentQuery) -> StoreResult<Vec<RawDocument>> {
        (**self).query_recent(query).await
    }
}
