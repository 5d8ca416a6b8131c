//! Leak index trait and search request types.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use leakhound_core::types::SearchHit;
use leakhound_core::{Bucket, DocumentRef};
use std::fmt;

/// Trait for upstream leak indexes.
///
/// The scanner only needs two operations: run a search and read back a
/// document's text. Implementations should be thread-safe (Send + Sync) for
/// use in async contexts.
#[async_trait]
pub trait LeakIndex: Send + Sync {
    /// Run a search and return the metadata of every hit.
    ///
    /// # Errors
    /// Returns error if the search cannot be submitted or its results cannot be read.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>>;

    /// Fetch the full text content of a document.
    ///
    /// # Errors
    /// Returns error if the document cannot be retrieved.
    async fn file_view(&self, document: &DocumentRef) -> Result<String>;
}

/// Inclusive date range a search is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    /// Start date
    pub from: NaiveDate,
    /// End date
    pub to: NaiveDate,
}

impl SearchWindow {
    /// Window ending at `today` and reaching back `months` calendar months.
    ///
    /// Month arithmetic clamps to the last day of shorter months.
    #[must_use]
    pub fn lookback(today: NaiveDate, months: u32) -> Self {
        let from = today
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        Self { from, to: today }
    }

    /// Start of the window in the index's timestamp format.
    #[must_use]
    pub fn from_timestamp(&self) -> String {
        format_timestamp(self.from)
    }

    /// End of the window in the index's timestamp format.
    #[must_use]
    pub fn to_timestamp(&self) -> String {
        format_timestamp(self.to)
    }
}

impl fmt::Display for SearchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from_timestamp(), self.to_timestamp())
    }
}

fn format_timestamp(date: NaiveDate) -> String {
    format!("{} 00:00:00", date.format("%Y-%m-%d"))
}

/// A single term/bucket search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Search term
    pub term: String,
    /// Result cap
    pub max_results: u32,
    /// Buckets to search
    pub buckets: Vec<Bucket>,
    /// Date restriction
    pub window: SearchWindow,
}

impl SearchQuery {
    /// Create a new search query.
    #[must_use]
    pub fn new(
        term: impl Into<String>,
        max_results: u32,
        buckets: Vec<Bucket>,
        window: SearchWindow,
    ) -> Self {
        Self {
            term: term.into(),
            max_results,
            buckets,
            window,
        }
    }
}
