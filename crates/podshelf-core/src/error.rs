//! Error types for podshelf core
//!
//! Network failures are surfaced to the user; storage failures are
//! recovered locally and only ever logged.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reading or writing the durable key-value store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed for {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize stored value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Library error type
#[derive(Error, Debug)]
pub enum PodError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PodError {
    /// True for failures that came from talking to the catalog API.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            PodError::Network(_) | PodError::Status { .. } | PodError::Decode { .. }
        )
    }
}

/// Result type alias for podshelf core
pub type Result<T> = std::result::Result<T, PodError>;
