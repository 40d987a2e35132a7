//! Error taxonomy for the wellness core.
//!
//! `Config` is fatal at start-up, `Store` is propagated to the caller, and
//! `Validation` is handled locally by whoever asked (fallback lists, gentle prompts).

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for wellness core operations
pub type WellnessResult<T> = Result<T, WellnessError>;

#[derive(Error, Debug)]
pub enum WellnessError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store I/O error at {}: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed store data at {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Mood classifier error: {0}")]
    Classifier(String),

    #[error("Cache error: {0}")]
    Cache(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl WellnessError {
    pub fn store(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        WellnessError::Store {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn corrupt(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        WellnessError::Corrupt {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Store failures may be transient (locked file, full disk being cleared); nothing else is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WellnessError::Store { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, WellnessError::Config(_))
    }
}

impl From<config::ConfigError> for WellnessError {
    fn from(err: config::ConfigError) -> Self {
        WellnessError::Config(err.to_string())
    }
}
