use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::storage::RecordKind;

/// Upper bound appended to a key prefix for `_all_docs` range queries.
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Envelope wrapping an entity with CouchDB's `_id`/`_rev` bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchDocument<T> {
    #[serde(rename = "_id")]
    pub doc_id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

/// Minimal projection used to look up the current revision of a document.
#[derive(Debug, Deserialize)]
pub struct RevisionOnly {
    #[serde(rename = "_rev")]
    pub rev: String,
}

/// Key prefix grouping all documents of one kind, e.g. `round::`.
pub fn kind_prefix(kind: RecordKind) -> String {
    format!("{}::", kind.label())
}

pub fn doc_id(kind: RecordKind, id: &str) -> String {
    format!("{}{}", kind_prefix(kind), id)
}
