//! Index envelopes wrapping transformer output with source metadata

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use super::document::{CombinedIndexDocument, IdentityRecord};

/// Source and processing metadata attached to every indexed document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meta {
    /// Object id (hash of source id and original object id)
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub source_id: String,
    pub collection: String,
    pub rights: String,
    pub original_object_id: Option<String>,
    pub original_object_urls: IndexMap<String, String>,
    pub processing_started: DateTime<Utc>,
    pub processing_finished: Option<DateTime<Utc>>,
}

/// Combined index document as written to the shared index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedIndexDoc {
    #[serde(flatten)]
    pub document: CombinedIndexDocument,
    pub hidden: bool,
    pub meta: Meta,
}

/// Source-specific index document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexDoc {
    #[serde(flatten)]
    pub data: Map<String, Value>,
    pub meta: Meta,
}

/// Everything produced for one harvested record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformedItem {
    pub object_id: Option<String>,
    pub identity: IdentityRecord,
    pub combined_index_doc: CombinedIndexDoc,
    pub index_doc: IndexDoc,
}
