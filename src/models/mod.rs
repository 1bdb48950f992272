//! Data models for transformer output

pub mod document;
pub mod envelope;

// Re-export commonly used types
pub use document::{CombinedIndexDocument, DateGranularity, IdentityRecord, MediaReference};
pub use envelope::{CombinedIndexDoc, IndexDoc, Meta, TransformedItem};
