//! Identification queries against a loaded store

#[path = "../common/mod.rs"]
mod common;

use common::flora_dataset;
use pretty_assertions::assert_eq;
use taxonomia_dataset::{CharacterSummary, DatasetStore, SqliteDatasetStore};

async fn flora_store() -> SqliteDatasetStore {
    let store = SqliteDatasetStore::in_memory().unwrap();
    store.load_dataset(&flora_dataset()).await.unwrap();
    store
}

fn ids(characters: &[CharacterSummary]) -> Vec<&str> {
    characters.iter().map(|c| c.id.as_str()).collect()
}

fn state_ids(character: &CharacterSummary) -> Vec<&str> {
    character.states.iter().map(|s| s.id.as_str()).collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_top_level_characters_in_document_order() {
    let store = flora_store().await;

    let characters = store.top_level_characters(&[]).await.unwrap();

    assert_eq!(ids(&characters), vec!["c1", "c2", "c4"]);
    assert_eq!(state_ids(&characters[0]), vec!["s1", "s2"]);
    assert_eq!(state_ids(&characters[1]), vec!["s3", "s4"]);
    // No states, still listed
    assert!(characters[2].states.is_empty());
}

#[tokio::test]
async fn test_top_level_characters_skip_excluded() {
    let store = flora_store().await;

    let characters = store.top_level_characters(&strings(&["c2", "c9"])).await.unwrap();

    assert_eq!(ids(&characters), vec!["c1", "c4"]);
}

#[tokio::test]
async fn test_character_and_state_details() {
    let store = flora_store().await;

    let characters = store.top_level_characters(&[]).await.unwrap();
    let leaf = &characters[0];
    assert_eq!(leaf.name.scientific, "Leaf shape");
    assert_eq!(leaf.name.text("CN"), "叶形");
    assert_eq!(leaf.pictures.len(), 1);
    assert_eq!(leaf.pictures[0].source, "http://pics.example/leaf.jpg");

    let ovate = &leaf.states[0];
    assert_eq!(ovate.name.text("EN"), "egg-shaped");
    assert_eq!(ovate.name.text("FR"), "ovate");
    let sources: Vec<&str> = ovate.pictures.iter().map(|p| p.source.as_str()).collect();
    assert_eq!(
        sources,
        vec!["http://pics.example/ovate.jpg", "http://pics.example/ovate-2.jpg"]
    );
    assert_eq!(ovate.pictures[0].legend, "ovate leaf");

    let yellow = &characters[1].states[1];
    assert_eq!(yellow.color, "#ffff00");
    assert_eq!(yellow.name.text("CN"), "黄色");
}

#[tokio::test]
async fn test_child_characters() {
    let store = flora_store().await;

    let children = store.child_characters("c2", &[]).await.unwrap();
    assert_eq!(ids(&children), vec!["c3"]);
    assert_eq!(state_ids(&children[0]), vec!["s5", "s6"]);

    assert!(store.child_characters("c1", &[]).await.unwrap().is_empty());
    assert!(store.child_characters("c2", &strings(&["c3"])).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_characters_by_selection_restricts_states() {
    let store = flora_store().await;

    let characters = store
        .characters_by_selection(&strings(&["c4", "c2", "c1"]), &strings(&["s1", "s4"]))
        .await
        .unwrap();

    assert_eq!(ids(&characters), vec!["c1", "c2", "c4"]);
    assert_eq!(state_ids(&characters[0]), vec!["s1"]);
    assert_eq!(state_ids(&characters[1]), vec!["s4"]);
    assert!(characters[2].states.is_empty());
}

#[tokio::test]
async fn test_characters_by_selection_keeps_characters_without_matches() {
    let store = flora_store().await;

    let characters = store
        .characters_by_selection(&strings(&["c3"]), &strings(&["s1"]))
        .await
        .unwrap();

    assert_eq!(ids(&characters), vec!["c3"]);
    assert!(characters[0].states.is_empty());
    assert!(store
        .characters_by_selection(&[], &strings(&["s1"]))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_identify_requires_every_state() {
    let store = flora_store().await;

    let taxa = store.identify_taxa(&strings(&["s1", "s3"])).await.unwrap();
    let found: Vec<&str> = taxa.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(found, vec!["t2", "t3"]);
    assert_eq!(taxa[0].name, "Rosa canina");
    assert_eq!(taxa[0].author, "L.");

    let taxa = store.identify_taxa(&strings(&["s1", "s3", "s5"])).await.unwrap();
    assert_eq!(taxa.len(), 1);
    assert_eq!(taxa[0].id, "t2");

    // Conflicting selection
    assert!(store.identify_taxa(&strings(&["s2", "s3"])).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_identify_counts_repeated_states_once() {
    let store = flora_store().await;

    let taxa = store.identify_taxa(&strings(&["s2", "s2", "s4"])).await.unwrap();

    assert_eq!(taxa.len(), 1);
    assert_eq!(taxa[0].id, "t4");
}

#[tokio::test]
async fn test_identify_with_no_states_matches_nothing() {
    let store = flora_store().await;

    assert!(store.identify_taxa(&[]).await.unwrap().is_empty());
    assert!(store.identify_taxa(&strings(&["s404"])).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_character_tree_nests_children() {
    let store = flora_store().await;

    let tree = store.character_tree().await.unwrap();

    assert_eq!(ids(&tree), vec!["c1", "c2", "c4"]);
    assert_eq!(ids(&tree[1].children), vec!["c3"]);
    assert_eq!(state_ids(&tree[1].children[0]), vec!["s5", "s6"]);
    assert!(tree[0].children.is_empty());
}

#[tokio::test]
async fn test_empty_store_answers_empty() {
    let store = SqliteDatasetStore::in_memory().unwrap();

    assert!(store.top_level_characters(&[]).await.unwrap().is_empty());
    assert!(store.character_tree().await.unwrap().is_empty());
    assert!(store.picture_sources().await.unwrap().is_empty());
}
