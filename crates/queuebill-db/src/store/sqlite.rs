//! # SQLite Bill Store
//!
//! Documents live in one `documents` table as JSON text. The server
//! timestamp is written by SQLite itself inside the INSERT, so every counter
//! sharing the database file is ordered by the same clock.
//!
//! ## Write
//! ```text
//! INSERT INTO documents (id, collection, body)
//! VALUES (?id, ?collection,
//!         json_set(?body, '$."timestamp"', strftime('%Y-%m-%dT%H:%M:%fZ', 'now')))
//! RETURNING body
//! ```
//!
//! ## Query Order
//! Timestamps are compared as epoch seconds: RFC 3339 text (any offset) goes
//! through `julianday()`, `{seconds, nanoseconds}` objects are summed. Rows
//! with no readable timestamp get NULL and sort as the oldest.

use async_trait::async_trait;
use queuebill_core::document::SortDirection;
use queuebill_core::{DocumentDraft, RawDocument, RecentQuery};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use super::BillStore;
use crate::error::{DbError, StoreError, StoreResult};

const INSERT_STAMPED: &str = r#"
    INSERT INTO documents (id, collection, body)
    VALUES (?1, ?2, json_set(?3, ?4, strftime('%Y-%m-%dT%H:%M:%fZ', 'now')))
    RETURNING body
"#;

const INSERT_PLAIN: &str = r#"
    INSERT INTO documents (id, collection, body)
    VALUES (?1, ?2, json(?3))
    RETURNING body
"#;

const SELECT_NEWEST: &str = r#"
    SELECT id, body
    FROM documents
    WHERE collection = ?1
    ORDER BY CASE json_type(body, ?2)
        WHEN 'text' THEN (julianday(json_extract(body, ?2)) - 2440587.5) * 86400.0
        WHEN 'object' THEN json_extract(body, ?2 || '."seconds"')
            + COALESCE(json_extract(body, ?2 || '."nanoseconds"'), 0) / 1e9
    END DESC, rowid DESC
    LIMIT ?3
"#;

const SELECT_OLDEST: &str = r#"
    SELECT id, body
    FROM documents
    WHERE collection = ?1
    ORDER BY CASE json_type(body, ?2)
        WHEN 'text' THEN (julianday(json_extract(body, ?2)) - 2440587.5) * 86400.0
        WHEN 'object' THEN json_extract(body, ?2 || '."seconds"')
            + COALESCE(json_extract(body, ?2 || '."nanoseconds"'), 0) / 1e9
    END ASC, rowid ASC
    LIMIT ?3
"#;

/// [`BillStore`] backed by the SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteBillStore {
    pool: SqlitePool,
}

impl SqliteBillStore {
    /// Creates a new SqliteBillStore.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteBillStore { pool }
    }
}

#[async_trait]
impl BillStore for SqliteBillStore {
    async fn write(&self, collection: &str, draft: DocumentDraft) -> StoreResult<RawDocument> {
        let id = Uuid::new_v4().to_string();
        let body = serde_json::to_string(draft.fields()).map_err(|e| StoreError::Write(e.into()))?;

        let stored: String = match draft.server_timestamp_key() {
            Some(key) => {
                let path = json_path(key).map_err(StoreError::Write)?;
                sqlx::query_scalar::<_, String>(INSERT_STAMPED)
                    .bind(&id)
                    .bind(collection)
                    .bind(&body)
                    .bind(path)
                    .fetch_one(&self.pool)
                    .await
            }
            None => {
                sqlx::query_scalar::<_, String>(INSERT_PLAIN)
                    .bind(&id)
                    .bind(collection)
                    .bind(&body)
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .map_err(|e| StoreError::Write(e.into()))?;

        let fields: Map<String, Value> =
            serde_json::from_str(&stored).map_err(|e| StoreError::Write(e.into()))?;

        debug!(id = %id, collection = %collection, "Document written");
        Ok(RawDocument::new(id, fields))
    }

    async fn query_recent(&self, query: &RecentQuery) -> StoreResult<Vec<RawDocument>> {
        let path = json_path(&query.order_by).map_err(StoreError::Query)?;
        let sql = match query.direction {
            SortDirection::Descending => SELECT_NEWEST,
            SortDirection::Ascending => SELECT_OLDEST,
        };

        let rows: Vec<(String, String)> = sqlx::query_as(sql)
            .bind(&query.collection)
            .bind(path)
            .bind(i64::from(query.limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.into()))?;

        let docs = rows
            .into_iter()
            .filter_map(|(id, body)| match serde_json::from_str::<Map<String, Value>>(&body) {
                Ok(fields) => Some(RawDocument::new(id, fields)),
                Err(e) => {
                    warn!(id = %id, error = %e, "Skipping document with non-object body");
                    None
                }
            })
            .collect();

        Ok(docs)
    }
}

/// `$."key"` for a top-level key. Only plain identifiers are accepted.
fn json_path(key: &str) -> Result<String, DbError> {
    let plain = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        Ok(format!("$.\"{}\"", key))
    } else {
        Err(DbError::InvalidDocument(format!("unsupported field name '{}'", key)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
