//! Hazo interchange codec
//!
//! - `format`: serde shapes of the JSON document
//! - `decode`: document -> [`Dataset`](crate::domain::Dataset)
//! - `encode`: dataset -> document

pub mod decode;
pub mod encode;
pub mod format;

pub use decode::{decode_document, decode_str, read_hazo};
pub use encode::{encode_dataset, write_hazo, write_hazo_pretty};
pub use format::EncodedDataset;

/// Flat taxon fields folded into the extension map on decode and moved back
/// out on encode
pub const LEGACY_TAXON_FIELDS: [&str; 8] = [
    "vernacularName2",
    "name2",
    "meaning",
    "herbariumpicture",
    "website",
    "noHerbier",
    "fasc",
    "page",
];
