//! Application services built on the domain ports

pub mod picture_cache;

pub use picture_cache::{refresh_picture_cache, RefreshReport};
