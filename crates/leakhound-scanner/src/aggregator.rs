//! Search fan-out and document-level dedup.

use crate::error::{Result, ScanError};
use leakhound_core::{Bucket, DocumentRef};
use leakhound_intelx::{LeakIndex, SearchQuery, SearchWindow};
use std::collections::HashSet;
use std::sync::Arc;

/// Runs every term against every bucket and merges the hits.
///
/// A failing term/bucket combination is logged and skipped. Documents are
/// keyed by storage id and kept in first-seen order, so a document returned
/// by several queries is only fetched once.
pub struct ResultAggregator {
    index: Arc<dyn LeakIndex>,
    buckets: Vec<Bucket>,
    max_results: u32,
    window: SearchWindow,
}

impl ResultAggregator {
    /// Create an aggregator over `buckets`.
    #[must_use]
    pub fn new(
        index: Arc<dyn LeakIndex>,
        buckets: Vec<Bucket>,
        max_results: u32,
        window: SearchWindow,
    ) -> Self {
        Self {
            index,
            buckets,
            max_results,
            window,
        }
    }

    /// Query `terms` × buckets and return the distinct documents.
    ///
    /// # Errors
    /// Returns [`ScanError::UpstreamUnavailable`] only when every query fails.
    pub async fn collect(&self, terms: &[String]) -> Result<Vec<DocumentRef>> {
        let mut seen = HashSet::new();
        let mut documents = Vec::new();
        let mut attempted = 0;
        let mut failures = Vec::new();

        for term in terms {
            for bucket in &self.buckets {
                attempted += 1;
                tracing::debug!("Searching bucket '{}' for '{}'...", bucket, term);

                let query =
                    SearchQuery::new(term.as_str(), self.max_results, vec![bucket.clone()], self.window);
                let hits = match self.index.search(&query).await {
                    Ok(hits) => hits,
                    Err(e) => {
                        tracing::warn!("Bucket '{}' failed for '{}': {}", bucket, term, e);
                        failures.push(e);
                        continue;
                    }
                };

                tracing::debug!("  -> {} records from {} for '{}'", hits.len(), bucket, term);

                for hit in hits {
                    let Some(document) = hit.into_document() else {
                        tracing::debug!("Dropping hit without storage id from {}", bucket);
                        continue;
                    };
                    if seen.insert(document.storage_id.clone()) {
                        documents.push(document);
                    }
                }
            }
        }

        if failures.len() == attempted {
            if let Some(source) = failures.pop() {
                return Err(ScanError::UpstreamUnavailable {
                    queries: attempted,
                    source,
                });
            }
        }

        tracing::info!("Found {} unique results across all buckets", documents.len());
        Ok(documents)
    }
}
