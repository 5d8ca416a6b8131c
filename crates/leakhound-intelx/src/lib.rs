//! Leakhound IntelX - client for the Intelligence X leak index.
//!
//! This crate provides the upstream search collaborator used by the scanner:
//! a [`LeakIndex`] trait describing the two operations the pipeline needs
//! (search a bucket for a term, view a document's text), and an
//! [`IntelxClient`] implementing it over the Intelligence X HTTP API.
//!
//! # Example
//!
//! ```rust,no_run
//! use leakhound_core::{Bucket, IntelxConfig};
//! use leakhound_intelx::{IntelxClient, LeakIndex, SearchQuery, SearchWindow};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = IntelxClient::from_config("api-key", &IntelxConfig::default())?;
//! let window = SearchWindow::lookback(chrono::Utc::now().date_naive(), 6);
//!
//! let query = SearchQuery::new("corp.example", 100, vec![Bucket::new("pastes")], window);
//! for hit in client.search(&query).await? {
//!     println!("{:?}", hit.name);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod api;
pub mod client;
pub mod error;
pub mod index;

// Re-export commonly used types
pub use client::IntelxClient;
pub use error::{IntelxError, Result};
pub use index::{LeakIndex, SearchQuery, SearchWindow};
