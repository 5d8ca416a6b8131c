//! Error types for output sinks.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or persisting credential output.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Existing output could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Existing output exists but is not in the expected shape
    #[error("existing output {} is corrupt: {reason}", .path.display())]
    Corrupt {
        /// Destination path
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// New output could not be written
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for sink operations.
pub type Result<T> = std::result::Result<T, SinkError>;
