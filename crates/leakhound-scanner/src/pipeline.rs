//! Scan pipeline driver.
//!
//! A run searches the index, then walks the resulting documents one at a
//! time: fetch with retry, extract, dedup. New credentials are held in memory
//! and handed to the output sink once, after the last document.

use crate::aggregator::ResultAggregator;
use crate::dedup::DedupStore;
use crate::error::{Result, ScanError};
use crate::extractor::CredentialExtractor;
use crate::retry::RetryPolicy;
use leakhound_core::{AppConfig, Bucket, CredentialRecord, DocumentRef, Target};
use leakhound_intelx::{LeakIndex, SearchWindow};
use leakhound_sink::OutputSink;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Everything a run needs to know, passed in explicitly.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// What to search for
    pub target: Target,
    /// Also search for `@target`
    pub email_search: bool,
    /// Buckets queried for every term
    pub buckets: Vec<Bucket>,
    /// Result cap per term/bucket query
    pub max_results: u32,
    /// Date restriction for searches
    pub window: SearchWindow,
    /// Per-document fetch retry policy
    pub retry: RetryPolicy,
    /// Pause between consecutive document fetches
    pub request_delay: Duration,
}

impl ScanConfig {
    /// Config with default buckets, limits and pacing.
    #[must_use]
    pub fn new(target: Target, window: SearchWindow) -> Self {
        Self::from_app_config(target, &AppConfig::default(), window)
    }

    /// Config taking buckets, limits, pacing and retry from `config`.
    #[must_use]
    pub fn from_app_config(target: Target, config: &AppConfig, window: SearchWindow) -> Self {
        Self {
            target,
            email_search: config.scanning.email_search,
            buckets: config.scanning.buckets.clone(),
            max_results: config.scanning.max_results,
            window,
            retry: RetryPolicy::from(&config.retry),
            request_delay: config.scanning.request_delay(),
        }
    }

    /// Search terms implied by the target and email mode.
    #[must_use]
    pub fn search_terms(&self) -> Vec<String> {
        self.target.search_terms(self.email_search)
    }
}

/// Where a document is in its processing.
///
/// `Pending → Fetching → (FetchFailed | Fetched)`, then
/// `Fetched → Extracting → Extracted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Queued, not yet touched
    Pending,
    /// Content is being retrieved
    Fetching,
    /// Retrieval failed after retries
    FetchFailed,
    /// Content retrieved
    Fetched,
    /// Content is being scanned
    Extracting,
    /// Content scanned
    Extracted,
}

impl DocumentState {
    /// Whether the document was skipped because of an error.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::FetchFailed)
    }
}

/// Outcome for a single document.
#[derive(Debug, Clone)]
pub struct DocumentScanResult {
    /// The document
    pub document: DocumentRef,
    /// Final state
    pub state: DocumentState,
    /// New credentials this document contributed
    pub credentials_found: usize,
    /// Error message if the document was skipped
    pub error: Option<String>,
}

impl DocumentScanResult {
    fn pending(document: DocumentRef) -> Self {
        Self {
            document,
            state: DocumentState::Pending,
            credentials_found: 0,
            error: None,
        }
    }

    fn advance(&mut self, state: DocumentState) {
        tracing::trace!("{}: {:?} -> {:?}", self.document.name, self.state, state);
        self.state = state;
    }

    fn fail(&mut self, error: &ScanError) {
        tracing::error!("Error processing leak {}: {}", self.document.name, error);
        self.advance(DocumentState::FetchFailed);
        self.error = Some(error.to_string());
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Per-document outcomes, in processing order
    pub documents: Vec<DocumentScanResult>,
    /// Distinct credentials loaded from previous output
    pub previously_seen: usize,
    /// Credentials persisted by this run
    pub new_credentials: Vec<CredentialRecord>,
    /// Distinct credentials across this and all previous runs
    pub total_unique: usize,
    /// Output destination
    pub output: PathBuf,
}

impl ScanReport {
    /// Documents skipped because of an error.
    pub fn failed_documents(&self) -> impl Iterator<Item = &DocumentScanResult> {
        self.documents.iter().filter(|d| d.state.is_failure())
    }

    /// Number of credentials persisted by this run.
    #[must_use]
    pub fn new_count(&self) -> usize {
        self.new_credentials.len()
    }
}

/// Drives one scan from search to persisted output.
pub struct ScanPipeline {
    config: ScanConfig,
    index: Arc<dyn LeakIndex>,
    sink: Box<dyn OutputSink>,
    extractor: CredentialExtractor,
}

impl ScanPipeline {
    /// Create a pipeline.
    #[must_use]
    pub fn new(config: ScanConfig, index: Arc<dyn LeakIndex>, sink: Box<dyn OutputSink>) -> Self {
        let extractor = CredentialExtractor::new(config.target.clone());
        Self {
            config,
            index,
            sink,
            extractor,
        }
    }

    /// Execute the scan.
    ///
    /// Query and per-document failures are logged and skipped. The run fails
    /// only if no search query succeeds or the output cannot be written.
    pub async fn run(&self) -> Result<ScanReport> {
        let mut store = self.load_store();
        let previously_seen = store.len();

        let aggregator = ResultAggregator::new(
            Arc::clone(&self.index),
            self.config.buckets.clone(),
            self.config.max_results,
            self.config.window,
        );
        let documents = aggregator.collect(&self.config.search_terms()).await?;

        let total = documents.len();
        let mut results = Vec::with_capacity(total);
        let mut new_credentials = Vec::new();

        for (i, document) in documents.into_iter().enumerate() {
            tracing::debug!("Processing leak [{}/{}]: {}", i + 1, total, document.name);
            let result = self
                .scan_document(document, &mut store, &mut new_credentials)
                .await;
            results.push(result);

            if i + 1 < total {
                tokio::time::sleep(self.config.request_delay).await;
            }
        }

        if new_credentials.is_empty() {
            tracing::info!("No new credentials found");
        } else {
            self.sink.append(&new_credentials)?;
            tracing::info!(
                "Wrote {} new credentials to: {}",
                new_credentials.len(),
                self.sink.path().display()
            );
        }
        tracing::info!("Total unique credentials (all runs): {}", store.len());

        Ok(ScanReport {
            documents: results,
            previously_seen,
            new_credentials,
            total_unique: store.len(),
            output: self.sink.path().to_path_buf(),
        })
    }

    /// Seed the dedup store from previous output. Unreadable output is not
    /// fatal; the run starts with an empty store instead.
    fn load_store(&self) -> DedupStore {
        let mut store = DedupStore::new();
        if !self.sink.path().exists() {
            return store;
        }

        tracing::info!(
            "Resuming: loading existing credentials from {}",
            self.sink.path().display()
        );
        match self.sink.load_keys() {
            Ok(keys) => {
                let loaded = store.load(keys);
                tracing::info!("Loaded {} existing credentials for dedup", loaded);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not parse existing output file, starting fresh dedup: {}",
                    e
                );
            }
        }
        store
    }

    async fn scan_document(
        &self,
        document: DocumentRef,
        store: &mut DedupStore,
        new_credentials: &mut Vec<CredentialRecord>,
    ) -> DocumentScanResult {
        let mut result = DocumentScanResult::pending(document);
        result.advance(DocumentState::Fetching);

        let what = format!("FILE_VIEW for {}", result.document.name);
        let index = &self.index;
        let document = &result.document;
        let fetched = self
            .config
            .retry
            .run(&what, || index.file_view(document))
            .await;

        let content = match fetched {
            Ok(content) => content,
            Err(source) => {
                let error = ScanError::FetchFailed {
                    document: result.document.name.clone(),
                    source,
                };
                result.fail(&error);
                return result;
            }
        };
        result.advance(DocumentState::Fetched);

        result.advance(DocumentState::Extracting);
        let before = new_credentials.len();
        new_credentials.extend(self.extractor.extract(&content, &result.document.name, store));
        result.credentials_found = new_credentials.len() - before;
        result.advance(DocumentState::Extracted);
        result
    }
}
