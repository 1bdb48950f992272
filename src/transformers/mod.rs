//! Source-specific item transformers
//!
//! Every harvested feed gets one stateless [`ItemTransformer`]; the pipeline
//! selects it by name and treats all of them uniformly.

pub mod kb_watermarks;

use serde_json::{Map, Value};

use crate::{
    error::{AppError, AppResult},
    models::{CombinedIndexDocument, IdentityRecord},
    xml::RawRecord,
};

pub use kb_watermarks::KbWatermarksTransformer;

/// Capabilities every source transformer provides
///
/// Implementations hold no per-record state, so one instance may be shared
/// by any number of workers.
#[cfg_attr(test, mockall::automock)]
pub trait ItemTransformer: Send + Sync {
    /// Identity/routing subset of the record
    fn identity_record(&self, record: &RawRecord) -> IdentityRecord;

    /// The indexable document
    fn combined_index_document(&self, record: &RawRecord) -> CombinedIndexDocument;

    /// Extra source-specific routing metadata, empty when there is none
    fn routing_metadata(&self, _record: &RawRecord) -> Map<String, Value> {
        Map::new()
    }
}

/// Resolve a configured transformer name
pub fn by_name(name: &str) -> AppResult<Box<dyn ItemTransformer>> {
    match name {
        KbWatermarksTransformer::NAME => Ok(Box::new(KbWatermarksTransformer::new())),
        other => Err(AppError::UnknownTransformer(other.to_string())),
    }
}
