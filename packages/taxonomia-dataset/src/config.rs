//! Runtime configuration (YAML)
//!
//! ```yaml
//! version: 1
//! database_path: db.sq3
//! dataset_path: dataset.hazo.json
//! log_filter: info
//! picture_cache:
//!   user_agent: taxonomia/0.1
//! ```
//!
//! Every key but `version` may be omitted. `TAXONOMIA_DB` overrides
//! `database_path`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DatasetError, Result};

pub const CONFIG_VERSION: u32 = 1;
pub const DATABASE_ENV_VAR: &str = "TAXONOMIA_DB";

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_database_path() -> PathBuf {
    PathBuf::from("db.sq3")
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("dataset.hazo.json")
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_user_agent() -> String {
    concat!("taxonomia/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Picture cache refresh settings
///
/// Fetches run without timeout or cancellation: a stalled server stalls the
/// refresh until the connection drops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PictureCacheConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for PictureCacheConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

/// YAML Schema v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    /// Schema version (always 1 for v1)
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Document read by `import` when no file is given
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,

    /// `tracing` filter directive, used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub picture_cache: PictureCacheConfig,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            database_path: default_database_path(),
            dataset_path: default_dataset_path(),
            log_filter: default_log_filter(),
            picture_cache: PictureCacheConfig::default(),
        }
    }
}

impl DatasetConfig {
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DatasetError::config(format!("Cannot read config '{}': {}", path.display(), e))
                .with_source(e)
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: DatasetConfig = serde_yaml::from_str(content)?;

        // Version check
        if config.version != CONFIG_VERSION {
            return Err(DatasetError::config(format!(
                "Unsupported configuration version {}. Supported versions: {}",
                config.version, CONFIG_VERSION
            )));
        }
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply `TAXONOMIA_DB` when set
    pub fn with_env_overrides(self) -> Self {
        let database = std::env::var(DATABASE_ENV_VAR).ok();
        self.with_database_override(database)
    }

    pub fn with_database_override(mut self, database: Option<String>) -> Self {
        if let Some(path) = database.filter(|p| !p.is_empty()) {
            self.database_path = PathBuf::from(path);
        }
        self
    }
}
