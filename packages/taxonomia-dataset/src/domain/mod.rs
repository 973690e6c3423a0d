//! Domain layer for identification datasets
//!
//! # Domain Models
//!
//! - `Dataset`: aggregate root holding both trees and the state arena
//! - `Taxon` / `Character`: tree records composed around a `Hierarchy`
//! - `State`: selectable value owned by one character
//! - `MultilangText`: scientific name with language overrides
//!
//! # Port Traits
//!
//! - `DatasetStore`: bulk load and identification queries
//! - `PictureFetcher`: picture download for the cache refresh
//!
//! # Examples
//!
//! ```rust
//! use taxonomia_dataset::domain::{CharacterInit, Dataset, MultilangText, StateInit, Tree};
//!
//! let mut dataset = Dataset::new("demo");
//! let path = dataset.create_character(
//!     &[],
//!     CharacterInit {
//!         name: MultilangText::new("Leaf shape"),
//!         ..Default::default()
//!     },
//! );
//! let character_id = dataset.get_in(Tree::Characters, &path).id.clone();
//! let state_id = dataset
//!     .add_state(&character_id, StateInit { name: MultilangText::new("ovate"), ..Default::default() })
//!     .unwrap();
//! assert_eq!(dataset.owner_of(&state_id).unwrap().hierarchy.id, character_id);
//! ```

pub mod dataset;
pub mod models;
pub mod ports;

pub use dataset::{
    CharacterInit, Dataset, StateInit, TaxonInit, Tree, CHARACTERS_ROOT_ID, TAXA_ROOT_ID,
};
pub use models::*;
pub use ports::{
    CharacterSummary, DatasetStore, LoadReport, PictureFetcher, StoreStats, TaxonSummary,
};
