//! Document model for index records
//!
//! A [`Document`] is an immutable snapshot of an index record as retrieved:
//! an identifier plus a flat mapping of field name to JSON value. The core
//! never applies partial updates to a document.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

/// Field holding the posting status ("Active" keeps the document in sitemaps)
pub const STATUS_FIELD: &str = "status";

/// Field holding the last update timestamp
pub const UPDATED_DATE_FIELD: &str = "updatedDate";

/// Field holding the original posting timestamp
pub const POSTING_DATE_FIELD: &str = "postingDate";

/// An index document: identifier plus source fields
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Unique identifier within an index
    pub id: String,

    /// Source fields as returned by the index
    pub fields: Map<String, Value>,
}

/// An ordered page of documents produced by a scan, consumed exactly once
pub type Batch = Vec<Document>;

impl Document {
    /// Create a new document
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Create a document with no source fields (id-only scans)
    pub fn id_only(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Get a field value by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a field as a string slice
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Whether this document counts as active for sitemap purposes.
    ///
    /// The `status` field is compared case-insensitively against `"Active"`;
    /// a missing status defaults to active.
    pub fn is_active(&self) -> bool {
        match self.field_str(STATUS_FIELD) {
            Some(status) => status.eq_ignore_ascii_case("active"),
            None => true,
        }
    }

    /// Resolve the last-modified timestamp for sitemap entries.
    ///
    /// Prefers `updatedDate`, then `postingDate`, then the supplied fallback
    /// (normally the render time). Timestamps may arrive as RFC 3339 strings
    /// or epoch milliseconds.
    pub fn last_modified(&self, fallback: DateTime<Utc>) -> DateTime<Utc> {
        self.field(UPDATED_DATE_FIELD)
            .and_then(parse_timestamp)
            .or_else(|| self.field(POSTING_DATE_FIELD).and_then(parse_timestamp))
            .unwrap_or(fallback)
    }
}

/// Parse a timestamp value from an index field.
///
/// Accepts RFC 3339 strings and integer epoch milliseconds (both appear in
/// the backing indices).
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc))
            .or_else(|| {
                s.parse::<i64>()
                    .ok()
                    .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            }),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}
