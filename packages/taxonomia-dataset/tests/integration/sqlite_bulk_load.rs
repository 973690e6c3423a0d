//! Bulk load into an on-disk SQLite store

#[path = "../common/mod.rs"]
mod common;

use common::flora_dataset;
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use std::path::Path;
use taxonomia_dataset::codec;
use taxonomia_dataset::domain::{CharacterInit, Dataset, TaxonInit};
use taxonomia_dataset::{DatasetStore, ErrorKind, LoadReport, SqliteDatasetStore};
use tempfile::TempDir;

fn count(path: &Path, sql: &str) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

fn ancestors(path: &Path, id: &str) -> Vec<(String, i64)> {
    let conn = Connection::open(path).unwrap();
    let mut stmt = conn
        .prepare("SELECT ancestor, length FROM Hierarchies WHERE descendant = ?1 ORDER BY length")
        .unwrap();
    stmt.query_map([id], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<rusqlite::Result<Vec<_>>>()
        .unwrap()
}

fn seq_of(path: &Path, id: &str) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row("SELECT seq FROM Items WHERE id = ?1", [id], |row| row.get(0))
        .unwrap()
}

#[tokio::test]
async fn test_load_reports_rows_per_tree() {
    taxonomia_dataset::logging::init_test_logging();
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("flora.sq3");

    let store = SqliteDatasetStore::new(&db).unwrap();
    let report = store.load_dataset(&flora_dataset()).await.unwrap();

    assert_eq!(
        report,
        LoadReport {
            characters: 4,
            states: 6,
            taxa: 4,
            synthesized: 0,
        }
    );
    // c0 c1..c4 s1..s6 t0 t1..t4
    assert_eq!(count(&db, "SELECT COUNT(*) FROM Items"), 16);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM States WHERE character = 'c3'"), 2);
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM CharacterRequiredStates WHERE character = 'c3' AND state = 's3'"),
        1
    );
    assert_eq!(count(&db, "SELECT COUNT(*) FROM TaxonStates WHERE taxon = 't2'"), 3);
}

#[tokio::test]
async fn test_closure_rows_cover_every_ancestor() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("flora.sq3");
    let store = SqliteDatasetStore::new(&db).unwrap();
    store.load_dataset(&flora_dataset()).await.unwrap();

    assert_eq!(
        ancestors(&db, "c3"),
        vec![("c3".to_string(), 0), ("c2".to_string(), 1), ("c0".to_string(), 2)]
    );
    assert_eq!(
        ancestors(&db, "t2"),
        vec![("t2".to_string(), 0), ("t1".to_string(), 1), ("t0".to_string(), 2)]
    );
    assert_eq!(ancestors(&db, "c0"), vec![("c0".to_string(), 0)]);
    // States are not tree nodes
    assert!(ancestors(&db, "s1").is_empty());

    // characters 1 + 2 + 2 + 3 + 2, taxa 1 + 2 + 3 + 3 + 2
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_closure_rows, 21);
}

#[tokio::test]
async fn test_sequence_follows_pre_order() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("flora.sq3");
    let store = SqliteDatasetStore::new(&db).unwrap();
    store.load_dataset(&flora_dataset()).await.unwrap();

    let order = ["c0", "c1", "s1", "s2", "c2", "s3", "s4", "c3", "s5", "s6", "c4"];
    let seqs: Vec<i64> = order.iter().map(|id| seq_of(&db, id)).collect();
    assert!(seqs.windows(2).all(|w| w[0] < w[1]), "{:?}", seqs);

    assert!(seq_of(&db, "t1") < seq_of(&db, "t2"));
    assert!(seq_of(&db, "t3") < seq_of(&db, "t4"));
}

#[tokio::test]
async fn test_dangling_child_is_synthesized() {
    let mut dataset = Dataset::new("dangling");
    dataset.create_character(
        &[],
        CharacterInit {
            id: Some("c1".to_string()),
            ..Default::default()
        },
    );
    dataset
        .characters
        .get_mut("c1")
        .unwrap()
        .hierarchy
        .children
        .push("ghost".to_string());

    let dir = TempDir::new().unwrap();
    let db = dir.path().join("dangling.sq3");
    let store = SqliteDatasetStore::new(&db).unwrap();
    let report = store.load_dataset(&dataset).await.unwrap();

    assert_eq!(report.synthesized, 1);
    assert_eq!(report.characters, 2);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM Characters WHERE item = 'ghost'"), 1);
    assert_eq!(
        ancestors(&db, "ghost"),
        vec![("ghost".to_string(), 0), ("c1".to_string(), 1), ("c0".to_string(), 2)]
    );
}

#[tokio::test]
async fn test_failed_tree_is_rolled_back() {
    let mut dataset = Dataset::new("collision");
    dataset.create_character(
        &[],
        CharacterInit {
            id: Some("c1".to_string()),
            ..Default::default()
        },
    );
    // Same id as the character: the taxa tree fails on insert
    dataset.create_taxon(
        &[],
        TaxonInit {
            id: Some("c1".to_string()),
            ..Default::default()
        },
    );

    let dir = TempDir::new().unwrap();
    let db = dir.path().join("collision.sq3");
    let store = SqliteDatasetStore::new(&db).unwrap();
    let err = store.load_dataset(&dataset).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Database);
    // Characters were committed before the taxa tree started
    assert_eq!(count(&db, "SELECT COUNT(*) FROM Characters"), 1);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM Items WHERE id = 't0'"), 0);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM Taxons"), 0);
}

#[tokio::test]
async fn test_second_load_is_rejected_and_first_kept() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("flora.sq3");
    let store = SqliteDatasetStore::new(&db).unwrap();
    store.load_dataset(&flora_dataset()).await.unwrap();

    let err = store.load_dataset(&flora_dataset()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_items, 16);
    assert_eq!(stats.total_closure_rows, 21);
}

#[tokio::test]
async fn test_initialize_is_idempotent_and_data_persists() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("flora.sq3");
    {
        let store = SqliteDatasetStore::new(&db).unwrap();
        store.initialize().await.unwrap();
        store.load_dataset(&flora_dataset()).await.unwrap();
    }

    let reopened = SqliteDatasetStore::new(&db).unwrap();
    reopened.initialize().await.unwrap();

    assert_eq!(count(&db, "SELECT COUNT(*) FROM Languages"), 5);
    let stats = reopened.stats().await.unwrap();
    assert_eq!(stats.total_characters, 4);
    assert_eq!(stats.total_states, 6);
    assert_eq!(stats.total_taxa, 4);
}

#[tokio::test]
async fn test_roots_only_get_self_rows_next_to_an_id_less_record() {
    // A record without id decodes to an item with the empty id
    let dataset =
        codec::decode_str(r#"{ "characters": [ { "name": "no id" } ], "taxons": [ { "id": "t1" } ] }"#)
            .unwrap();

    let dir = TempDir::new().unwrap();
    let db = dir.path().join("blank.sq3");
    let store = SqliteDatasetStore::new(&db).unwrap();
    store.load_dataset(&dataset).await.unwrap();

    assert_eq!(ancestors(&db, ""), vec![("".to_string(), 0), ("c0".to_string(), 1)]);
    assert_eq!(ancestors(&db, "c0"), vec![("c0".to_string(), 0)]);
    assert_eq!(ancestors(&db, "t0"), vec![("t0".to_string(), 0)]);
    assert_eq!(
        ancestors(&db, "t1"),
        vec![("t1".to_string(), 0), ("t0".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_locked_database_is_a_transaction_error() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("locked.sq3");
    let store = SqliteDatasetStore::new(&db).unwrap();

    // Another writer holds the lock until the busy timeout expires
    let writer = Connection::open(&db).unwrap();
    writer.execute_batch("BEGIN IMMEDIATE").unwrap();

    let err = store.load_dataset(&flora_dataset()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Transaction);

    writer.execute_batch("ROLLBACK").unwrap();
    assert_eq!(store.stats().await.unwrap().total_items, 0);
}
