//! Storage and fetch ports
//!
//! Port/Adapter split:
//! - `DatasetStore`: bulk load plus the identification queries (SQLite adapter)
//! - `PictureFetcher`: downloads picture blobs for the cache (HTTP adapter)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::dataset::Dataset;
use super::models::{ItemId, MultilangText, Picture, State, StateId};
use crate::error::Result;

/// Character as returned by the query engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub id: ItemId,
    pub name: MultilangText,
    pub description: String,
    pub pictures: Vec<Picture>,
    /// States in sequence order, each with its overrides and pictures
    pub states: Vec<State>,
    /// Only filled by [`DatasetStore::character_tree`]
    pub children: Vec<CharacterSummary>,
}

/// Taxon matched by [`DatasetStore::identify_taxa`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonSummary {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub author: String,
}

/// Rows written by a bulk load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub characters: usize,
    pub states: usize,
    pub taxa: usize,
    /// Empty records created for dangling child ids
    pub synthesized: usize,
}

/// Store Statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub total_items: usize,
    pub total_characters: usize,
    pub total_states: usize,
    pub total_taxa: usize,
    pub total_closure_rows: usize,
    pub cached_pictures: usize,
}

/// Dataset Store Port
///
/// Loading is append-only: there is no update or delete path for hierarchy
/// nodes once persisted.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Schema & Bulk Load
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Create tables and seed the standard languages (idempotent)
    async fn initialize(&self) -> Result<()>;

    /// Load the character tree, then the taxon tree, one transaction each.
    ///
    /// The first failing write rolls back the tree being loaded and is
    /// returned; a tree committed before the failure stays in place.
    async fn load_dataset(&self, dataset: &Dataset) -> Result<LoadReport>;

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Identification Queries
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Direct children of the characters root, minus `except`
    async fn top_level_characters(&self, except: &[ItemId]) -> Result<Vec<CharacterSummary>>;

    /// Direct children of `parent_id`, minus `except`
    async fn child_characters(
        &self,
        parent_id: &str,
        except: &[ItemId],
    ) -> Result<Vec<CharacterSummary>>;

    /// The given characters, each keeping only states listed in `state_ids`
    async fn characters_by_selection(
        &self,
        character_ids: &[ItemId],
        state_ids: &[StateId],
    ) -> Result<Vec<CharacterSummary>>;

    /// Taxa carrying every one of `state_ids`
    async fn identify_taxa(&self, state_ids: &[StateId]) -> Result<Vec<TaxonSummary>>;

    /// Whole character forest with nested children
    async fn character_tree(&self) -> Result<Vec<CharacterSummary>>;

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Picture Cache
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Distinct picture URLs referenced by stored items
    async fn picture_sources(&self) -> Result<Vec<String>>;

    async fn cached_picture(&self, url: &str) -> Result<Option<Vec<u8>>>;

    /// Write blobs in a single transaction; returns the number written
    async fn store_cached_pictures(&self, pictures: &[(String, Vec<u8>)]) -> Result<usize>;

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Statistics
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    async fn stats(&self) -> Result<StoreStats>;
}

/// Picture Fetcher Port
#[async_trait]
pub trait PictureFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
