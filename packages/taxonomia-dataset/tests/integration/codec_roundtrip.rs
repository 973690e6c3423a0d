//! Hazo codec: decode, encode and decode again

#[path = "../common/mod.rs"]
mod common;

use common::{flora_dataset, FLORA_DOCUMENT};
use pretty_assertions::assert_eq;
use std::io::Cursor;
use taxonomia_dataset::codec::{self, EncodedDataset};
use taxonomia_dataset::diagnostics::find_duplicate_ids;
use taxonomia_dataset::domain::{BookReference, ExtraValue, Tree};

#[test]
fn test_fixture_decodes_both_trees() {
    let dataset = flora_dataset();

    assert_eq!(dataset.id, "flora");
    assert_eq!(dataset.characters_root.children, vec!["c1", "c2", "c4"]);
    assert_eq!(dataset.character("c2").unwrap().hierarchy.children, vec!["c3"]);
    assert_eq!(dataset.taxa_root.children, vec!["t1", "t4"]);
    assert_eq!(dataset.taxon("t1").unwrap().hierarchy.children, vec!["t2", "t3"]);
    assert_eq!(dataset.get_in(Tree::Characters, &[1, 0]).id, "c3");
    assert_eq!(dataset.owner_of("s5").unwrap().hierarchy.id, "c3");
}

#[test]
fn test_fixture_taxon_details() {
    let dataset = flora_dataset();
    let rose = dataset.taxon("t2").unwrap();

    assert_eq!(rose.author, "L.");
    assert_eq!(rose.states, vec!["s1", "s3", "s5"]);
    assert_eq!(rose.hierarchy.name.text("NV"), "dog rose");
    assert_eq!(
        rose.references,
        vec![BookReference {
            book_id: "b1".to_string(),
            page: 118,
            fasc: "2".to_string(),
            detail: "plate 4".to_string(),
        }]
    );
    assert_eq!(rose.extra.get("altitude"), Some(&ExtraValue::Number(1200.0)));
    assert_eq!(rose.extra.get("native"), Some(&ExtraValue::Boolean(true)));
    assert_eq!(
        rose.extra.get("website"),
        Some(&ExtraValue::Text("http://roses.example".to_string()))
    );
}

#[test]
fn test_encode_then_decode_preserves_dataset() {
    let dataset = flora_dataset();

    let encoded = codec::encode_dataset(&dataset);
    let decoded = codec::decode_document(&encoded);

    assert_eq!(decoded, dataset);
}

#[test]
fn test_write_then_read_preserves_dataset() {
    let dataset = flora_dataset();

    let mut buffer = Vec::new();
    codec::write_hazo(&mut buffer, &dataset).unwrap();
    let reread = codec::read_hazo(Cursor::new(buffer)).unwrap();

    assert_eq!(reread, dataset);
}

#[test]
fn test_pretty_output_is_stable() {
    let dataset = flora_dataset();

    let mut first = Vec::new();
    codec::write_hazo_pretty(&mut first, &dataset).unwrap();
    let reread = codec::read_hazo(Cursor::new(first.clone())).unwrap();
    let mut second = Vec::new();
    codec::write_hazo_pretty(&mut second, &reread).unwrap();

    assert_eq!(String::from_utf8(first).unwrap(), String::from_utf8(second).unwrap());
}

#[test]
fn test_encoded_document_lists_parents_and_descriptions() {
    let encoded = codec::encode_dataset(&flora_dataset());

    let ids: Vec<&str> = encoded.characters.iter().map(|c| c.item.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3", "c4"]);
    assert_eq!(encoded.characters[2].item.parent_id, "c2");
    assert_eq!(encoded.characters[0].item.parent_id, "");

    let rose = encoded.taxons.iter().find(|t| t.item.id == "t2").unwrap();
    let descriptors: Vec<&str> = rose.descriptions.iter().map(|d| d.descriptor_id.as_str()).collect();
    assert_eq!(descriptors, vec!["c1", "c2", "c3"]);
    assert_eq!(rose.website, "http://roses.example");
    assert!(!rose.extra.contains_key("website"));
}

#[test]
fn test_fixture_has_no_duplicate_ids() {
    let document: EncodedDataset = serde_json::from_str(FLORA_DOCUMENT).unwrap();
    assert!(find_duplicate_ids(&document).is_empty());
}

#[test]
fn test_duplicate_ids_across_lists_are_reported() {
    let document: EncodedDataset = serde_json::from_str(
        r#"{ "taxons": [ { "id": "x1" } ], "states": [ { "id": "s1" }, { "id": "x1" } ] }"#,
    )
    .unwrap();

    let duplicates = find_duplicate_ids(&document);
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].to_string(), "'x1' used 2 times: taxon[0] state[1]");
}

#[test]
fn test_malformed_document_is_a_decode_error() {
    let err = codec::read_hazo(Cursor::new(b"{ \"taxons\": [".to_vec())).unwrap_err();
    assert_eq!(err.kind, taxonomia_dataset::ErrorKind::Decode);
}
