//! Koninklijke Bibliotheek watermarks feed
//!
//! Records are OAI-PMH `GetRecord` bodies in the `dcx` metadata format:
//! Dublin Core elements plus a `dcx:thumbnail` extension. Dates use the
//! informal form `"1875, 03 Jan"`.

use chrono::{Month, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::ItemTransformer;
use crate::{
    models::{CombinedIndexDocument, DateGranularity, IdentityRecord, MediaReference},
    xml::{Namespaces, RawRecord},
};

/// Prefixes usable in this feed's queries
pub const NAMESPACES: Namespaces = Namespaces::new(&[
    ("oai", "http://www.openarchives.org/OAI/2.0/"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("oai_dc", "http://www.openarchives.org/OAI/2.0/oai_dc/"),
    ("dcx", "http://krait.kb.nl/coop/tel/handbook/telterms.html"),
    ("xml", "http://www.w3.org/XML/1998/namespace"),
]);

pub const COLLECTION: &str = "Koninklijke Bibliotheek - Watermarks";
pub const RIGHTS: &str = "http://creativecommons.org/publicdomain/zero/1.0/deed.nl";

/// The feed only serves JPEG thumbnails
pub const MEDIA_CONTENT_TYPE: &str = "image/jpeg";

/// `"<4-digit year>, <day> <month abbreviation>"`, e.g. `"1875, 03 Jan"`
static INFORMAL_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4}),\s+([0-9]{1,2})\s+([A-Za-z]{3})$").expect("valid date pattern")
});

// ---------------------------------------------------------------------------
// Field extractors
// ---------------------------------------------------------------------------

fn text(record: &RawRecord, expression: &str) -> Option<String> {
    NAMESPACES.query_text(record, expression)
}

/// Original object identifier (`oai:header/oai:identifier`)
pub fn original_object_id(record: &RawRecord) -> Option<String> {
    text(record, ".//oai:header/oai:identifier")
}

pub fn title(record: &RawRecord) -> Option<String> {
    text(record, ".//dc:title")
}

pub fn description(record: &RawRecord) -> Option<String> {
    text(record, ".//dc:description")
}

/// Raw, unparsed `dc:date`
pub fn date(record: &RawRecord) -> Option<String> {
    text(record, ".//dc:date")
}

/// The creator as a single author string (never split)
pub fn creator(record: &RawRecord) -> Option<String> {
    text(record, ".//dc:creator")
}

pub fn subjects(record: &RawRecord) -> Vec<String> {
    NAMESPACES
        .query_nodes(record, ".//dc:subject")
        .into_iter()
        .filter_map(|node| node.text.as_deref())
        .filter(|subject| !subject.is_empty())
        .map(String::from)
        .collect()
}

pub fn source(record: &RawRecord) -> Option<String> {
    text(record, ".//dc:source")
}

pub fn identifier(record: &RawRecord) -> Option<String> {
    text(record, ".//dc:identifier")
}

pub fn dc_type(record: &RawRecord) -> Option<String> {
    text(record, ".//dc:type")
}

/// One media reference per `dc:identifier` or `dcx:thumbnail` node
pub fn media(record: &RawRecord) -> Vec<MediaReference> {
    NAMESPACES
        .query_nodes(record, ".//dc:identifier | .//dcx:thumbnail")
        .into_iter()
        .map(|node| MediaReference {
            original_url: node.text.clone().unwrap_or_default(),
            content_type: MEDIA_CONTENT_TYPE.to_string(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Metadata and viewer URLs for an identifier
pub fn original_object_urls(id: &str) -> IndexMap<String, String> {
    let view_id = id.rsplit(':').next().unwrap_or(id);

    let mut urls = IndexMap::new();
    urls.insert(
        "xml".to_string(),
        format!(
            "http://services.kb.nl/mdo/oai?verb=GetRecord&identifier={}&metadataPrefix=dcx",
            id
        ),
    );
    urls.insert(
        "html".to_string(),
        format!("http://watermark.kb.nl/search/view/id/{}", view_id),
    );
    urls
}

/// Parse an informal `"<year>, <day> <month>"` date at midnight
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let captures = INFORMAL_DATE.captures(raw.trim())?;

    let year: i32 = captures[1].parse().ok()?;
    let day: u32 = captures[2].parse().ok()?;
    let month: Month = captures[3].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month.number_from_month(), day)?.and_hms_opt(0, 0, 0)
}

/// Search blob: title, creator, subjects, description, source, identifier, type
pub fn all_text(record: &RawRecord) -> String {
    let mut items = vec![title(record), creator(record)];
    items.extend(subjects(record).into_iter().map(Some));
    items.extend([
        description(record),
        source(record),
        identifier(record),
        dc_type(record),
    ]);

    items.into_iter().flatten().collect::<Vec<_>>().join(" ")
}

fn dated(record: &RawRecord) -> (Option<NaiveDateTime>, DateGranularity) {
    let Some(raw) = date(record) else {
        return (None, DateGranularity::Unknown);
    };

    match parse_date(&raw) {
        Some(parsed) => (Some(parsed), DateGranularity::Day),
        None => {
            tracing::warn!("Unparseable dc:date '{}', indexing without date", raw);
            (None, DateGranularity::Unknown)
        }
    }
}

/// Transformer for the KB watermarks OAI-PMH feed
#[derive(Debug, Clone, Copy, Default)]
pub struct KbWatermarksTransformer;

impl KbWatermarksTransformer {
    /// Configuration name of this transformer
    pub const NAME: &'static str = "kb_watermarks";

    pub fn new() -> Self {
        Self
    }
}

impl ItemTransformer for KbWatermarksTransformer {
    fn identity_record(&self, record: &RawRecord) -> IdentityRecord {
        let id = original_object_id(record);

        let urls = match id.as_deref() {
            Some(id) => original_object_urls(id),
            None => {
                tracing::warn!("Record has no oai:identifier, skipping URL derivation");
                IndexMap::new()
            }
        };

        IdentityRecord {
            id,
            urls,
            collection: COLLECTION.to_string(),
            rights: RIGHTS.to_string(),
        }
    }

    fn combined_index_document(&self, record: &RawRecord) -> CombinedIndexDocument {
        let (date, date_granularity) = dated(record);

        CombinedIndexDocument {
            title: title(record),
            description: description(record).unwrap_or_default(),
            date,
            date_granularity,
            authors: creator(record).map(|author| vec![author]),
            media_urls: media(record),
            all_text: all_text(record),
        }
    }
}
