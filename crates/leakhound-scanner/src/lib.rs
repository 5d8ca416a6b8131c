//! Leakhound Scanner - credential scan pipeline.
//!
//! This crate turns search hits from a [`leakhound_intelx::LeakIndex`] into
//! deduplicated credential records persisted through a
//! [`leakhound_sink::OutputSink`].
//!
//! # Features
//!
//! - Term × bucket search fan-out with per-query failure isolation
//! - Document-level dedup before any content is fetched
//! - Bounded retry with exponential backoff for transient fetch failures
//! - Fixed pacing between document fetches
//! - Credential dedup across runs and output formats
//!
//! # Example
//!
//! ```rust,no_run
//! use leakhound_core::{AppConfig, OutputFormat, Target};
//! use leakhound_intelx::{IntelxClient, SearchWindow};
//! use leakhound_scanner::{ScanConfig, ScanPipeline};
//! use leakhound_sink::open_sink;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = AppConfig::default();
//! let target = Target::new("corp.example")?;
//! let window = SearchWindow::lookback(chrono::Utc::now().date_naive(), 6);
//!
//! let pipeline = ScanPipeline::new(
//!     ScanConfig::from_app_config(target, &app, window),
//!     Arc::new(IntelxClient::from_config("api-key", &app.intelx)?),
//!     open_sink(OutputFormat::Txt, "out/corp.example-creds.txt"),
//! );
//!
//! let report = pipeline.run().await?;
//! println!("{} new credentials", report.new_count());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod aggregator;
pub mod dedup;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod retry;

// Re-export commonly used types
pub use aggregator::ResultAggregator;
pub use dedup::DedupStore;
pub use error::{Result, ScanError};
pub use extractor::CredentialExtractor;
pub use pipeline::{DocumentScanResult, DocumentState, ScanConfig, ScanPipeline, ScanReport};
pub use retry::{RetryPolicy, Retryable};
