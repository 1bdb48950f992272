//! Per-source transformation service
//!
//! Runs a source's transformer over raw records and wraps the output in
//! index envelopes carrying the source metadata.

use std::sync::Arc;

use chrono::Utc;
use sha1::{Digest, Sha1};

use crate::{
    config::SourceConfig,
    error::AppResult,
    models::{CombinedIndexDoc, IndexDoc, Meta, TransformedItem},
    transformers::{self, ItemTransformer},
    xml::RawRecord,
};

#[derive(Clone)]
pub struct TransformService {
    source: SourceConfig,
    transformer: Arc<dyn ItemTransformer>,
}

impl TransformService {
    pub fn new(source: SourceConfig, transformer: Arc<dyn ItemTransformer>) -> Self {
        Self { source, transformer }
    }

    /// Build the service for the transformer named in the source configuration
    pub fn from_config(source: SourceConfig) -> AppResult<Self> {
        let transformer = transformers::by_name(&source.transformer)?;
        Ok(Self::new(source, Arc::from(transformer)))
    }

    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    /// Transform one record. Never fails; missing data degrades the output.
    pub fn transform(&self, record: &RawRecord) -> TransformedItem {
        let processing_started = Utc::now();

        let identity = self.transformer.identity_record(record);
        let document = self.transformer.combined_index_document(record);
        let routing = self.transformer.routing_metadata(record);

        let object_id = identity
            .id
            .as_deref()
            .map(|id| object_id(&self.source.id, id));

        tracing::debug!(
            source = %self.source.id,
            original_object_id = ?identity.id,
            object_id = ?object_id,
            "Transformed record"
        );

        let meta = Meta {
            id: object_id.clone(),
            source_id: self.source.id.clone(),
            collection: identity.collection.clone(),
            rights: identity.rights.clone(),
            original_object_id: identity.id.clone(),
            original_object_urls: identity.urls.clone(),
            processing_started,
            processing_finished: Some(Utc::now()),
        };

        TransformedItem {
            object_id,
            combined_index_doc: CombinedIndexDoc {
                document,
                hidden: self.source.hidden,
                meta: meta.clone(),
            },
            index_doc: IndexDoc { data: routing, meta },
            identity,
        }
    }

    /// Parse a harvested document and transform every record in it
    pub fn transform_xml(&self, xml: &str) -> AppResult<Vec<TransformedItem>> {
        let document = RawRecord::parse(xml)?;
        let records = document.records();
        tracing::debug!("Transforming {} record(s)", records.len());

        Ok(records.iter().map(|record| self.transform(record)).collect())
    }
}

/// Stable object id: hex SHA-1 of the source id followed by the original id
pub fn object_id(source_id: &str, original_object_id: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(source_id.as_bytes());
    hasher.update(original_object_id.as_bytes());
    hex::encode(hasher.finalize())
}
