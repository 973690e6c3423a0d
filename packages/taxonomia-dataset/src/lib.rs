//! Taxonomia Dataset - identification datasets for taxonomic keys
//!
//! A dataset holds two trees, taxa and characters, plus the states each
//! character offers. This crate reads and writes the Hazo JSON interchange
//! format, loads a dataset into a SQLite closure-table store and answers the
//! identification queries of an interactive key.
//!
//! ## Layers
//!
//! - `domain`: models, the `Dataset` aggregate and the port traits
//! - `codec`: Hazo JSON decode/encode
//! - `infrastructure`: SQLite store and HTTP picture fetcher
//! - `application`: picture cache refresh
//!
//! ## Usage
//!
//! ```rust,ignore
//! use taxonomia_dataset::{codec, DatasetStore, SqliteDatasetStore};
//!
//! let dataset = codec::read_hazo(std::fs::File::open("flora.hazo.json")?)?;
//! let store = SqliteDatasetStore::new("flora.sq3")?;
//! store.load_dataset(&dataset).await?;
//!
//! let taxa = store.identify_taxa(&["s1".to_string()]).await?;
//! ```

pub mod application;
pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;

pub use error::{DatasetError, ErrorKind, Result};

pub use config::DatasetConfig;
pub use domain::{
    Character, CharacterSummary, Dataset, DatasetStore, LoadReport, MultilangText,
    PictureFetcher, State, StoreStats, Taxon, TaxonSummary, Tree,
};

#[cfg(feature = "sqlite")]
pub use infrastructure::SqliteDatasetStore;
