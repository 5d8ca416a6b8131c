//! Error types for the scan pipeline.

use leakhound_intelx::IntelxError;
use leakhound_sink::SinkError;
use thiserror::Error;

/// Errors raised while scanning.
///
/// `FetchFailed` is per-document and never aborts a batch; the pipeline
/// records it and moves on. The rest are fatal for the run.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Document content could not be retrieved
    #[error("failed to fetch {document}: {source}")]
    FetchFailed {
        /// Display name of the document
        document: String,
        /// Last error returned by the index
        #[source]
        source: IntelxError,
    },

    /// No search query succeeded
    #[error("upstream index unavailable, all {queries} search queries failed: {source}")]
    UpstreamUnavailable {
        /// Number of queries attempted
        queries: usize,
        /// Error from the last query
        #[source]
        source: IntelxError,
    },

    /// Output could not be persisted
    #[error("output error: {0}")]
    Sink(#[from] SinkError),
}

/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
