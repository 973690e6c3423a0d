//! Infrastructure layer - adapters for the domain ports
//!
//! - `sqlite`: `DatasetStore` on SQLite
//! - `http`: `PictureFetcher` on reqwest

pub mod http;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use http::HttpPictureFetcher;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatasetStore;
