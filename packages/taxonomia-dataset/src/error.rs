//! Error types for taxonomia-dataset

use std::fmt;
use thiserror::Error;

/// Dataset error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Interchange document is not valid JSON
    Decode,
    /// Serialization errors (encode side)
    Serialization,
    /// Database errors (SQLite)
    Database,
    /// Transaction errors
    Transaction,
    /// Picture fetch errors
    Fetch,
    /// Configuration errors
    Config,
    /// I/O errors
    IO,
    /// Internal errors (bugs, poisoned locks)
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Decode => "decode",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Database => "database",
            ErrorKind::Transaction => "transaction",
            ErrorKind::Fetch => "fetch",
            ErrorKind::Config => "config",
            ErrorKind::IO => "io",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dataset error type
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct DatasetError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
}

impl DatasetError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transaction, message)
    }

    pub fn fetch(url: impl AsRef<str>, message: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::Fetch,
            format!("Cannot fetch {}: {}", url.as_ref(), message),
        )
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

// SQLite error conversions
#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for DatasetError {
    fn from(err: rusqlite::Error) -> Self {
        DatasetError::database(format!("SQLite error: {}", err)).with_source(err)
    }
}

// Mutex poison error (for Arc<Mutex<Connection>>)
impl<T> From<std::sync::PoisonError<T>> for DatasetError {
    fn from(_err: std::sync::PoisonError<T>) -> Self {
        DatasetError::internal("Mutex poisoned")
    }
}

// JSON error conversions
impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        DatasetError::serialization(format!("JSON error: {}", err)).with_source(err)
    }
}

impl From<serde_yaml::Error> for DatasetError {
    fn from(err: serde_yaml::Error) -> Self {
        DatasetError::config(format!("YAML parsing error: {}", err)).with_source(err)
    }
}

impl From<reqwest::Error> for DatasetError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        DatasetError::fetch(url, &err).with_source(err)
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        DatasetError::new(ErrorKind::IO, format!("IO error: {}", err)).with_source(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DatasetError>;
