//! Wire types for the search backend
//!
//! Request/response shapes for the OpenSearch-compatible HTTP API, plus the
//! write-operation types submitted through the bulk endpoint.

use crate::domain::{Batch, Document};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// A single write operation against an index
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert or overwrite a document by id
    Upsert { id: String, document: Value },

    /// Remove a document by id; removing an absent id is not an error
    Delete { id: String },
}

impl WriteOp {
    /// The document id this operation targets
    pub fn id(&self) -> &str {
        match self {
            WriteOp::Upsert { id, .. } => id,
            WriteOp::Delete { id } => id,
        }
    }

    /// Append this operation to an NDJSON bulk request body
    pub fn write_ndjson(&self, body: &mut String) {
        match self {
            WriteOp::Upsert { id, document } => {
                body.push_str(&json!({ "update": { "_id": id } }).to_string());
                body.push('\n');
                body.push_str(&json!({ "doc": document, "doc_as_upsert": true }).to_string());
                body.push('\n');
            }
            WriteOp::Delete { id } => {
                body.push_str(&json!({ "delete": { "_id": id } }).to_string());
                body.push('\n');
            }
        }
    }
}

/// Per-operation outcome of a bulk submission
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOutcome {
    /// The operation was applied
    Success { id: String },

    /// The operation failed; `reason` is the backend's explanation or the
    /// retry-exhaustion message
    Failure { id: String, reason: String },
}

impl BulkOutcome {
    /// The document id this outcome refers to
    pub fn id(&self) -> &str {
        match self {
            BulkOutcome::Success { id } => id,
            BulkOutcome::Failure { id, .. } => id,
        }
    }

    /// Whether the operation was applied
    pub fn is_success(&self) -> bool {
        matches!(self, BulkOutcome::Success { .. })
    }
}

/// Filter predicate for an index scan
#[derive(Debug, Clone, PartialEq)]
pub enum ScanFilter {
    /// Every document in the index
    MatchAll,

    /// Documents whose numeric timestamp field is at or before the cutoff
    OlderThan { field: String, cutoff_millis: i64 },
}

/// Query description for an index scan: filter plus source-field projection
#[derive(Debug, Clone, PartialEq)]
pub struct ScanQuery {
    /// Filter predicate
    pub filter: ScanFilter,

    /// Source fields to fetch; empty means the full source
    pub source_fields: Vec<String>,
}

impl ScanQuery {
    /// Match-all scan projecting the fields sitemap rendering needs
    pub fn sitemap_export() -> Self {
        Self {
            filter: ScanFilter::MatchAll,
            source_fields: vec![
                "id".to_string(),
                "postingDate".to_string(),
                "updatedDate".to_string(),
                "status".to_string(),
            ],
        }
    }

    /// Id-only scan of documents older than the cutoff
    pub fn expired(field: impl Into<String>, cutoff_millis: i64) -> Self {
        Self {
            filter: ScanFilter::OlderThan {
                field: field.into(),
                cutoff_millis,
            },
            source_fields: vec!["id".to_string()],
        }
    }

    /// Build the JSON request body for a search with this query
    pub fn to_body(&self, size: usize, from: Option<usize>) -> Value {
        let query = match &self.filter {
            ScanFilter::MatchAll => json!({ "match_all": {} }),
            ScanFilter::OlderThan {
                field,
                cutoff_millis,
            } => json!({
                "bool": {
                    "filter": { "range": { field: { "lte": cutoff_millis } } }
                }
            }),
        };

        let mut body = json!({ "query": query, "size": size });
        if !self.source_fields.is_empty() {
            body["_source"] = json!(self.source_fields);
        }
        if let Some(from) = from {
            body["from"] = json!(from);
        }
        body
    }
}

/// One page returned by a scan call
#[derive(Debug, Clone)]
pub struct ScanPage {
    /// Cursor token for the next call, if the backend returned one
    pub cursor: Option<String>,

    /// Documents in this page; empty means end of scan
    pub batch: Batch,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(rename = "_scroll_id")]
    pub scroll_id: Option<String>,
    pub hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: serde_json::Map<String, Value>,
}

impl Hit {
    pub(crate) fn into_document(self) -> Document {
        Document::new(self.id, self.source)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkResponse {
    #[allow(dead_code)]
    #[serde(default)]
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<BulkResponseItem>,
}

/// Each bulk item is keyed by its action name ("update", "delete", "index")
#[derive(Debug, Deserialize)]
pub(crate) struct BulkResponseItem(pub HashMap<String, BulkItemDetail>);

impl BulkResponseItem {
    pub(crate) fn detail(&self) -> Option<&BulkItemDetail> {
        self.0.values().next()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkItemDetail {
    #[serde(rename = "_id")]
    pub id: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub error: Option<BulkItemError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkItemError {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl BulkItemError {
    pub(crate) fn describe(&self) -> String {
        match &self.reason {
            Some(reason) => format!("{}: {}", self.kind, reason),
            None => self.kind.clone(),
        }
    }
}
