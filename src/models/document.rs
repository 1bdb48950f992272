//! Transformer output documents.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Precision of a derived date, consumed by the index for date-range handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
#[repr(u8)]
pub enum DateGranularity {
    /// No usable date
    #[default]
    Unknown = 0,
    /// Parsed down to the day
    Day = 8,
}

impl From<u8> for DateGranularity {
    fn from(v: u8) -> Self {
        match v {
            8 => DateGranularity::Day,
            _ => DateGranularity::Unknown,
        }
    }
}

impl From<DateGranularity> for u8 {
    fn from(g: DateGranularity) -> Self {
        g as u8
    }
}

/// Minimal identity/routing record used by the pipeline for dedup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Original object identifier within the source feed
    pub id: Option<String>,
    /// Format name (`xml`, `html`) → URL; empty when `id` is absent
    pub urls: IndexMap<String, String>,
    pub collection: String,
    pub rights: String,
}

/// A media file referenced by a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    pub original_url: String,
    pub content_type: String,
}

/// The document handed to the search index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedIndexDocument {
    pub title: Option<String>,
    pub description: String,
    pub date: Option<NaiveDateTime>,
    pub date_granularity: DateGranularity,
    /// Omitted entirely when the source has no creator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    pub media_urls: Vec<MediaReference>,
    pub all_text: String,
}
