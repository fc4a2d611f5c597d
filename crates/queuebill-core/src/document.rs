//! # Store Documents
//!
//! The bill store is schemaless: it holds JSON objects keyed by an opaque
//! id. This module is the boundary between those untyped documents and the
//! typed [`BillRecord`].
//!
//! ## Document Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  collection "bills"                                                     │
//! │                                                                         │
//! │  id: "5f0c…"                                                            │
//! │  {                                                                      │
//! │    "type":      "TAKEAWAY",              ← BillMode wire name           │
//! │    "number":    23,                      ← table or queue number        │
//! │    "timestamp": "2026-10-19T05:12:09.120Z"  ← filled in by the store    │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writers send a [`DocumentDraft`] that names the key the store must fill
//! with its own clock. Readers get [`RawDocument`]s back and run them through
//! [`parse_bill`]; anything that does not parse is not a bill.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::types::{Bill, BillMode, BillRecord};
use crate::validation::validate_bill_number;

/// Collection holding issued bills.
pub const BILLS_COLLECTION: &str = "bills";

/// Key holding the [`BillMode`] wire name.
pub const KEY_TYPE: &str = "type";

/// Key holding the table/queue number.
pub const KEY_NUMBER: &str = "number";

/// Key the store fills with its write time.
pub const KEY_TIMESTAMP: &str = "timestamp";

// =============================================================================
// Raw Document
// =============================================================================

/// A document as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Store-assigned id.
    pub id: String,

    /// Untyped body.
    pub fields: Map<String, Value>,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        RawDocument {
            id: id.into(),
            fields,
        }
    }

    /// Returns a field by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

// =============================================================================
// Document Draft
// =============================================================================

/// A document about to be written.
///
/// ## Example
/// ```rust
/// use queuebill_core::document::DocumentDraft;
///
/// let draft = DocumentDraft::new()
///     .set("type", "DINE_IN")
///     .set("number", 7)
///     .server_timestamp("timestamp");
///
/// assert_eq!(draft.server_timestamp_key(), Some("timestamp"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentDraft {
    fields: Map<String, Value>,
    server_timestamp: Option<String>,
}

impl DocumentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// The draft for an issued bill.
    pub fn for_bill(bill: &Bill) -> Self {
        DocumentDraft::new()
            .set(KEY_TYPE, bill.mode().as_str())
            .set(KEY_NUMBER, bill.number())
            .server_timestamp(KEY_TIMESTAMP)
    }

    /// Sets a plain field.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Asks the store to write its own clock into `key`.
    pub fn server_timestamp(mut self, key: impl Into<String>) -> Self {
        self.server_timestamp = Some(key.into());
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn server_timestamp_key(&self) -> Option<&str> {
        self.server_timestamp.as_deref()
    }

    /// Fills in the server timestamp and assigns `id`, as a store does.
    pub fn materialize(self, id: impl Into<String>, written_at: DateTime<Utc>) -> RawDocument {
        let mut fields = self.fields;
        if let Some(key) = self.server_timestamp {
            fields.insert(key, Value::String(format_timestamp(&written_at)));
        }
        RawDocument::new(id, fields)
    }
}

// =============================================================================
// Recent Query
// =============================================================================

/// Sort direction for [`RecentQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// "The newest `limit` documents of `collection` by `order_by`."
///
/// `order_by` names a timestamp field. Documents are ordered by the instant
/// it holds (see [`instant_of`]), whatever form it was written in; values
/// that are not timestamps sort as the oldest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentQuery {
    pub collection: String,
    pub order_by: String,
    pub direction: SortDirection,
    pub limit: u32,
}

impl RecentQuery {
    /// Newest-first bills, ordered by server timestamp.
    pub fn bills(limit: u32) -> Self {
        RecentQuery {
            collection: BILLS_COLLECTION.to_string(),
            order_by: KEY_TIMESTAMP.to_string(),
            direction: SortDirection::Descending,
            limit,
        }
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Timestamp wire format: RFC 3339, UTC, millisecond precision.
pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Converts a store document into a [`BillRecord`].
///
/// ## Rules
/// - `type` must be a known [`BillMode`] wire name
/// - `number` must be a whole number inside the mode's range
/// - `timestamp` must be present: an RFC 3339 string, or an object with
///   `seconds` (and optional `nanoseconds`)
pub fn parse_bill(doc: &RawDocument) -> CoreResult<BillRecord> {
    let mode = match doc.get(KEY_TYPE) {
        Some(Value::String(s)) => serde_json::from_value::<BillMode>(Value::String(s.clone()))
            .map_err(|_| CoreError::malformed(&doc.id, format!("unknown type '{}'", s)))?,
        Some(_) => return Err(CoreError::malformed(&doc.id, "type is not a string")),
        None => return Err(CoreError::malformed(&doc.id, "missing type")),
    };

    let number = doc
        .get(KEY_NUMBER)
        .and_then(whole_number)
        .ok_or_else(|| CoreError::malformed(&doc.id, "missing or non-integer number"))?;
    let number = u32::try_from(number)
        .map_err(|_| CoreError::malformed(&doc.id, format!("number {} out of range", number)))?;
    validate_bill_number(mode, number)?;

    let issued_at = doc
        .get(KEY_TIMESTAMP)
        .ok_or_else(|| CoreError::malformed(&doc.id, "missing timestamp"))
        .and_then(|value| parse_timestamp(&doc.id, value))?;

    Ok(BillRecord {
        id: doc.id.clone(),
        mode,
        number,
        issued_at,
    })
}

impl TryFrom<&RawDocument> for BillRecord {
    type Error = CoreError;

    fn try_from(doc: &RawDocument) -> Result<Self, Self::Error> {
        parse_bill(doc)
    }
}

fn whole_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as u64)
        }),
        _ => None,
    }
}

/// The instant a timestamp field holds: an RFC 3339 string (any offset) or
/// an object with `seconds` and optional `nanoseconds`.
///
/// ## Example
/// ```rust
/// use queuebill_core::document::instant_of;
/// use serde_json::json;
///
/// let bangkok = instant_of(&json!("2026-10-19T09:00:00+07:00")).unwrap();
/// let utc = instant_of(&json!("2026-10-19T02:00:00.000Z")).unwrap();
/// assert_eq!(bangkok, utc);
/// assert_eq!(instant_of(&json!({ "seconds": utc.timestamp() })), Some(utc));
/// assert!(instant_of(&json!("yesterday")).is_none());
/// ```
pub fn instant_of(value: &Value) -> Option<DateTime<Utc>> {
    parse_timestamp("", value).ok()
}

fn parse_timestamp(id: &str, value: &Value) -> CoreResult<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| CoreError::malformed(id, format!("bad timestamp '{}': {}", s, e))),
        Value::Object(obj) => {
            let seconds = obj
                .get("seconds")
                .and_then(Value::as_i64)
                .ok_or_else(|| CoreError::malformed(id, "timestamp object without seconds"))?;
            let nanos = obj
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, nanos)
                .single()
                .ok_or_else(|| CoreError::malformed(id, "timestamp out of range"))
        }
        Value::Null => Err(CoreError::malformed(id, "timestamp not yet assigned")),
        _ => Err(CoreError::malformed(id, "timestamp has unsupported type")),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
