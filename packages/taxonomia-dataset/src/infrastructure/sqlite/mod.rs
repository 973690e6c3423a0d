//! SQLite Dataset Store
//!
//! File-based storage for a loaded dataset:
//! - `schema`: tables, indexes and reference content
//! - `loader`: transactional bulk load with closure-table maintenance
//! - `queries`: identification queries and picture cache reads

mod loader;
mod queries;
mod schema;

use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::domain::{
    CharacterSummary, Dataset, DatasetStore, ItemId, LoadReport, StateId, StoreStats,
    TaxonSummary,
};
use crate::error::Result;

/// SQLite-based DatasetStore implementation
#[derive(Clone)]
pub struct SqliteDatasetStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatasetStore {
    /// Open (or create) the database at the given path
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        debug!(path = %db_path.display(), "Opening dataset store");
        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock()?;
        schema::create_tables(&conn)?;
        schema::insert_standard_content(&conn)?;
        Ok(())
    }
}

fn count(conn: &Connection, sql: &str) -> Result<usize> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(n as usize)
}

#[async_trait]
impl DatasetStore for SqliteDatasetStore {
    async fn initialize(&self) -> Result<()> {
        self.init_schema()
    }

    async fn load_dataset(&self, dataset: &Dataset) -> Result<LoadReport> {
        let mut conn = self.conn.lock()?;
        loader::load_dataset(&mut conn, dataset)
    }

    async fn top_level_characters(&self, except: &[ItemId]) -> Result<Vec<CharacterSummary>> {
        let conn = self.conn.lock()?;
        queries::top_level_characters(&conn, except)
    }

    async fn child_characters(
        &self,
        parent_id: &str,
        except: &[ItemId],
    ) -> Result<Vec<CharacterSummary>> {
        let conn = self.conn.lock()?;
        queries::child_characters(&conn, parent_id, except)
    }

    async fn characters_by_selection(
        &self,
        character_ids: &[ItemId],
        state_ids: &[StateId],
    ) -> Result<Vec<CharacterSummary>> {
        let conn = self.conn.lock()?;
        queries::characters_by_selection(&conn, character_ids, state_ids)
    }

    async fn identify_taxa(&self, state_ids: &[StateId]) -> Result<Vec<TaxonSummary>> {
        let conn = self.conn.lock()?;
        queries::identify_taxa(&conn, state_ids)
    }

    async fn character_tree(&self) -> Result<Vec<CharacterSummary>> {
        let conn = self.conn.lock()?;
        queries::character_tree(&conn)
    }

    async fn picture_sources(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock()?;
        queries::picture_sources(&conn)
    }

    async fn cached_picture(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock()?;
        queries::cached_picture(&conn, url)
    }

    async fn store_cached_pictures(&self, pictures: &[(String, Vec<u8>)]) -> Result<usize> {
        let conn = self.conn.lock()?;
        let tx = conn.unchecked_transaction()?;
        {
            let mut insert = tx.prepare_cached(
                "INSERT OR REPLACE INTO PictureCache (src, data) VALUES (?1, ?2)",
            )?;
            for (url, data) in pictures {
                insert.execute(params![url, data])?;
            }
        }
        tx.commit()?;
        Ok(pictures.len())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock()?;
        Ok(StoreStats {
            total_items: count(&conn, "SELECT COUNT(*) FROM Items")?,
            total_characters: count(&conn, "SELECT COUNT(*) FROM Characters")?,
            total_states: count(&conn, "SELECT COUNT(*) FROM States")?,
            total_taxa: count(&conn, "SELECT COUNT(*) FROM Taxons")?,
            total_closure_rows: count(&conn, "SELECT COUNT(*) FROM Hierarchies")?,
            cached_pictures: count(&conn, "SELECT COUNT(*) FROM PictureCache")?,
        })
    }
}
