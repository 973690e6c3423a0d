//! Relational schema
//!
//! `Hierarchies` is the transitive closure of both trees: one row per
//! (ancestor, descendant) pair, `length` being the number of edges between
//! them and every node its own descendant at length 0.

use rusqlite::{params, Connection};

use crate::domain::standard_languages;
use crate::error::Result;

const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS Items (
        id TEXT NOT NULL,
        seq INTEGER NOT NULL DEFAULT 0,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        PRIMARY KEY (id)
    )",
    "CREATE TABLE IF NOT EXISTS ItemNames (
        item TEXT NOT NULL,
        lang TEXT NOT NULL,
        text TEXT NOT NULL,
        PRIMARY KEY (item, lang),
        FOREIGN KEY (item) REFERENCES Items(id)
    )",
    "CREATE TABLE IF NOT EXISTS PictureCache (
        src TEXT NOT NULL,
        data BLOB NOT NULL,
        PRIMARY KEY (src)
    )",
    "CREATE TABLE IF NOT EXISTS ItemPictures (
        id INTEGER PRIMARY KEY,
        picture TEXT NOT NULL DEFAULT '',
        item TEXT NOT NULL,
        url TEXT NOT NULL,
        label TEXT NOT NULL,
        FOREIGN KEY (item) REFERENCES Items(id)
    )",
    "CREATE TABLE IF NOT EXISTS Languages (
        code TEXT NOT NULL,
        label TEXT NOT NULL,
        PRIMARY KEY (code)
    )",
    "CREATE TABLE IF NOT EXISTS Hierarchies (
        ancestor TEXT NOT NULL,
        descendant TEXT NOT NULL,
        length INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (ancestor, descendant),
        FOREIGN KEY (ancestor) REFERENCES Items(id),
        FOREIGN KEY (descendant) REFERENCES Items(id)
    )",
    "CREATE TABLE IF NOT EXISTS Characters (
        item TEXT NOT NULL,
        PRIMARY KEY (item),
        FOREIGN KEY (item) REFERENCES Items(id)
    )",
    "CREATE TABLE IF NOT EXISTS States (
        item TEXT NOT NULL,
        character TEXT NOT NULL,
        color TEXT NOT NULL DEFAULT '',
        PRIMARY KEY (item),
        FOREIGN KEY (item) REFERENCES Items(id),
        FOREIGN KEY (character) REFERENCES Characters(item)
    )",
    "CREATE TABLE IF NOT EXISTS Taxons (
        item TEXT NOT NULL,
        author TEXT NOT NULL DEFAULT '',
        PRIMARY KEY (item),
        FOREIGN KEY (item) REFERENCES Items(id)
    )",
    "CREATE TABLE IF NOT EXISTS TaxonStates (
        taxon TEXT NOT NULL,
        state TEXT NOT NULL,
        PRIMARY KEY (taxon, state)
    )",
    "CREATE TABLE IF NOT EXISTS CharacterRequiredStates (
        character TEXT NOT NULL,
        state TEXT NOT NULL,
        PRIMARY KEY (character, state)
    )",
];

// Create indexes for the query engine joins
const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_hierarchies_descendant ON Hierarchies(descendant, length)",
    "CREATE INDEX IF NOT EXISTS idx_states_character ON States(character)",
    "CREATE INDEX IF NOT EXISTS idx_item_pictures_item ON ItemPictures(item)",
    "CREATE INDEX IF NOT EXISTS idx_taxon_states_state ON TaxonStates(state, taxon)",
];

/// Create every table and index (idempotent)
pub(crate) fn create_tables(conn: &Connection) -> Result<()> {
    for statement in CREATE_TABLES.iter().chain(CREATE_INDEXES) {
        conn.execute(statement, [])?;
    }
    Ok(())
}

/// Seed the standard languages, keeping rows already present
pub(crate) fn insert_standard_content(conn: &Connection) -> Result<()> {
    let mut insert_lang =
        conn.prepare_cached("INSERT OR IGNORE INTO Languages (code, label) VALUES (?1, ?2)")?;
    for lang in standard_languages() {
        insert_lang.execute(params![lang.code, lang.label])?;
    }
    Ok(())
}
