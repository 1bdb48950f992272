//! End-to-end transformation of harvested records

use std::thread;

use chrono::NaiveDate;
use serde_json::{json, Value};

use ocd_items::{
    config::SourceConfig,
    models::DateGranularity,
    transformers::{self, KbWatermarksTransformer},
    ItemTransformer, RawRecord, TransformService,
};

const WATERMARK: &str = include_str!("../fixtures/watermark_record.xml");
const DEGRADED: &str = include_str!("../fixtures/degraded_record.xml");
const LIST_RECORDS: &str = include_str!("../fixtures/list_records.xml");

fn service() -> TransformService {
    TransformService::from_config(SourceConfig::default()).expect("kb_watermarks transformer")
}

fn parse(xml: &str) -> RawRecord {
    RawRecord::parse(xml).expect("fixture parses")
}

#[test]
fn test_identity_record() {
    let identity = KbWatermarksTransformer.identity_record(&parse(WATERMARK));

    assert_eq!(identity.id.as_deref(), Some("WM:kb.nl:WM:2014"));
    assert_eq!(
        identity.urls["xml"],
        "http://services.kb.nl/mdo/oai?verb=GetRecord&identifier=WM:kb.nl:WM:2014&metadataPrefix=dcx"
    );
    assert_eq!(identity.urls["html"], "http://watermark.kb.nl/search/view/id/2014");
    assert_eq!(identity.collection, "Koninklijke Bibliotheek - Watermarks");
    assert_eq!(
        identity.rights,
        "http://creativecommons.org/publicdomain/zero/1.0/deed.nl"
    );
}

#[test]
fn test_combined_index_document() {
    let doc = KbWatermarksTransformer.combined_index_document(&parse(WATERMARK));

    assert_eq!(doc.title.as_deref(), Some("Wapen van Amsterdam"));
    assert_eq!(doc.description, "Wapenschild met drie Andreaskruisen, gekroond.");
    assert_eq!(doc.date_granularity, DateGranularity::Day);
    assert_eq!(doc.date.map(|d| d.date()), NaiveDate::from_ymd_opt(1875, 1, 3));
    assert_eq!(doc.authors, Some(vec!["Onbekend".to_string()]));

    let urls: Vec<&str> = doc.media_urls.iter().map(|m| m.original_url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "http://watermark.kb.nl/images/WM2014.jpg",
            "http://watermark.kb.nl/thumbnails/WM2014.jpg",
        ]
    );
    assert!(doc.media_urls.iter().all(|m| m.content_type == "image/jpeg"));

    assert_eq!(
        doc.all_text,
        "Wapen van Amsterdam Onbekend Wapens Amsterdam \
         Wapenschild met drie Andreaskruisen, gekroond. \
         Koninklijke Bibliotheek, Den Haag \
         http://watermark.kb.nl/images/WM2014.jpg Watermerk"
    );
}

#[test]
fn test_combined_index_document_json_shape() {
    let doc = KbWatermarksTransformer.combined_index_document(&parse(WATERMARK));
    let value = serde_json::to_value(&doc).unwrap();

    assert_eq!(value["date"], json!("1875-01-03T00:00:00"));
    assert_eq!(value["date_granularity"], json!(8));
    assert_eq!(value["authors"], json!(["Onbekend"]));
    assert_eq!(
        value["media_urls"][1],
        json!({
            "original_url": "http://watermark.kb.nl/thumbnails/WM2014.jpg",
            "content_type": "image/jpeg"
        })
    );
}

#[test]
fn test_degraded_record() {
    let record = parse(DEGRADED);
    let transformer = KbWatermarksTransformer;

    let identity = transformer.identity_record(&record);
    assert_eq!(identity.id, None);
    assert!(identity.urls.is_empty());

    let value = serde_json::to_value(transformer.combined_index_document(&record)).unwrap();
    assert_eq!(value["title"], json!("Posthoorn"));
    assert_eq!(value["description"], json!(""));
    assert_eq!(value["date"], Value::Null);
    assert_eq!(value["date_granularity"], json!(0));
    assert!(value.get("authors").is_none());
    assert_eq!(value["media_urls"], json!([]));
    assert_eq!(value["all_text"], json!("Posthoorn"));

    let identity = serde_json::to_value(&identity).unwrap();
    assert_eq!(identity["id"], Value::Null);
    assert_eq!(identity["urls"], json!({}));
}

#[test]
fn test_degraded_record_envelope() {
    let items = service().transform_xml(DEGRADED).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].object_id, None);
    assert_eq!(items[0].combined_index_doc.meta.original_object_id, None);
}

#[test]
fn test_transform_get_record_response() {
    let items = service().transform_xml(WATERMARK).unwrap();
    assert_eq!(items.len(), 1);

    let item = &items[0];
    assert_eq!(item.identity.id.as_deref(), Some("WM:kb.nl:WM:2014"));
    assert_eq!(item.object_id.as_ref().map(String::len), Some(40));

    let combined = serde_json::to_value(&item.combined_index_doc).unwrap();
    assert_eq!(combined["title"], json!("Wapen van Amsterdam"));
    assert_eq!(combined["hidden"], json!(false));
    assert_eq!(combined["meta"]["source_id"], json!("kb_watermarks"));
    assert_eq!(
        combined["meta"]["original_object_urls"]["html"],
        json!("http://watermark.kb.nl/search/view/id/2014")
    );

    let index = serde_json::to_value(&item.index_doc).unwrap();
    assert_eq!(index.as_object().map(|o| o.len()), Some(1));
    assert!(index.get("meta").is_some());
}

#[test]
fn test_transform_list_records_response() {
    let items = service().transform_xml(LIST_RECORDS).unwrap();
    assert_eq!(items.len(), 2);

    assert_eq!(items[0].identity.id.as_deref(), Some("WM:kb.nl:WM:1001"));
    assert_eq!(
        items[0].combined_index_doc.document.date.map(|d| d.date()),
        NaiveDate::from_ymd_opt(1701, 3, 12)
    );
    assert!(items[0].combined_index_doc.document.media_urls.is_empty());

    assert_eq!(items[1].identity.urls["html"], "http://watermark.kb.nl/search/view/id/1002");
    assert_eq!(items[1].combined_index_doc.document.media_urls.len(), 1);
    assert_eq!(
        items[1].combined_index_doc.document.date_granularity,
        DateGranularity::Unknown
    );

    assert_ne!(items[0].object_id, items[1].object_id);
}

#[test]
fn test_transform_rejects_unparseable_xml() {
    assert!(service().transform_xml("<record><header></record>").is_err());
}

#[test]
fn test_transform_is_deterministic() {
    let record = parse(WATERMARK);
    let transformer = transformers::by_name("kb_watermarks").unwrap();

    assert_eq!(
        transformer.combined_index_document(&record),
        transformer.combined_index_document(&record)
    );
    assert_eq!(transformer.identity_record(&record), transformer.identity_record(&record));
}

#[test]
fn test_concurrent_transformation() {
    let service = service();
    let record = parse(WATERMARK);
    let expected = service.transform(&record);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| service.transform(&record)))
            .collect();

        for handle in handles {
            let item = handle.join().unwrap();
            assert_eq!(item.identity, expected.identity);
            assert_eq!(item.object_id, expected.object_id);
            assert_eq!(item.combined_index_doc.document, expected.combined_index_doc.document);
        }
    });
}
