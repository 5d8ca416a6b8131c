use async_trait::async_trait;
use chrono::NaiveDate;
use leakhound_core::{Bucket, DocumentRef, OutputFormat, SearchHit, Target};
use leakhound_intelx::{IntelxError, LeakIndex, SearchQuery, SearchWindow};
use leakhound_scanner::{DocumentState, ScanConfig, ScanError, ScanPipeline};
use leakhound_sink::open_sink;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;

/// In-memory leak index.
///
/// Every bucket returns the documents registered for it regardless of term.
/// Fetch failures are scripted per storage id.
#[derive(Default)]
struct FakeIndex {
    documents: Vec<(String, SearchHit)>,
    contents: HashMap<String, String>,
    failing_fetches: HashMap<String, (usize, fn() -> IntelxError)>,
    failing_searches: bool,
    views: Mutex<HashMap<String, usize>>,
}

impl FakeIndex {
    fn document(mut self, bucket: &str, storage_id: &str, content: &str) -> Self {
        let hit = SearchHit {
            storage_id: Some(storage_id.to_string()),
            system_id: Some(format!("sys-{storage_id}")),
            name: Some(format!("{storage_id}.txt")),
            content_type: 1,
            media: 24,
            bucket: bucket.to_string(),
        };
        self.documents.push((bucket.to_string(), hit));
        self.contents
            .insert(storage_id.to_string(), content.to_string());
        self
    }

    fn failing_fetch(mut self, storage_id: &str, times: usize, error: fn() -> IntelxError) -> Self {
        self.failing_fetches
            .insert(storage_id.to_string(), (times, error));
        self
    }

    fn failing_searches(mut self) -> Self {
        self.failing_searches = true;
        self
    }

    fn views_of(&self, storage_id: &str) -> usize {
        self.views
            .lock()
            .expect("lock")
            .get(storage_id)
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl LeakIndex for FakeIndex {
    async fn search(&self, query: &SearchQuery) -> leakhound_intelx::Result<Vec<SearchHit>> {
        if self.failing_searches {
            return Err(IntelxError::AuthenticationFailed {
                message: "invalid key".to_string(),
            });
        }
        Ok(self
            .documents
            .iter()
            .filter(|(bucket, _)| query.buckets.iter().any(|b| b.as_str() == bucket.as_str()))
            .map(|(_, hit)| hit.clone())
            .collect())
    }

    async fn file_view(&self, document: &DocumentRef) -> leakhound_intelx::Result<String> {
        let attempt = {
            let mut views = self.views.lock().expect("lock");
            let count = views.entry(document.storage_id.clone()).or_default();
            *count += 1;
            *count
        };

        if let Some((times, error)) = self.failing_fetches.get(&document.storage_id) {
            if attempt <= *times {
                return Err(error());
            }
        }

        self.contents
            .get(&document.storage_id)
            .cloned()
            .ok_or_else(|| IntelxError::NotFound {
                what: document.name.clone(),
            })
    }
}

fn unavailable() -> IntelxError {
    IntelxError::ApiError {
        status: 503,
        message: "service unavailable".to_string(),
    }
}

fn gone() -> IntelxError {
    IntelxError::NotFound {
        what: "document".to_string(),
    }
}

fn config(buckets: &[&str]) -> ScanConfig {
    let target = Target::new("corp.example").expect("valid target");
    let window =
        SearchWindow::lookback(NaiveDate::from_ymd_opt(2025, 7, 15).expect("valid date"), 6);
    let mut config = ScanConfig::new(target, window);
    config.buckets = buckets.iter().map(|b| Bucket::new(*b)).collect();
    config
}

fn pipeline(
    index: &Arc<FakeIndex>,
    config: ScanConfig,
    format: OutputFormat,
    path: &Path,
) -> ScanPipeline {
    ScanPipeline::new(config, index.clone(), open_sink(format, path))
}

#[tokio::test(start_paused = true)]
async fn test_second_run_finds_nothing_new() {
    let index = Arc::new(
        FakeIndex::default()
            .document(
                "pastes",
                "p1",
                "https://site.example/login:user@corp.example:Sup3rSecret!\nrandomtext nopattern\n",
            )
            .document("leaks.public", "l1", "admin@corp.example:a:b:c\n"),
    );

    for format in [OutputFormat::Txt, OutputFormat::Csv, OutputFormat::Json] {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join(format!("creds.{}", format.extension()));

        let first = pipeline(&index, config(&["pastes", "leaks.public"]), format, &path)
            .run()
            .await
            .expect("first run");
        assert_eq!(first.new_count(), 2, "{format}");
        assert_eq!(first.total_unique, 2, "{format}");

        let written = std::fs::read(&path).expect("output written");

        let second = pipeline(&index, config(&["pastes", "leaks.public"]), format, &path)
            .run()
            .await
            .expect("second run");
        assert_eq!(second.new_count(), 0, "{format}");
        assert_eq!(second.previously_seen, 2, "{format}");
        assert_eq!(second.total_unique, 2, "{format}");
        assert_eq!(
            std::fs::read(&path).expect("output still there"),
            written,
            "{format} output changed on a run with nothing new"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_document_in_several_buckets_is_fetched_once() {
    let index = Arc::new(
        FakeIndex::default()
            .document("pastes", "shared", "a@corp.example:pw\n")
            .document("leaks.public", "shared", "a@corp.example:pw\n")
            .document("leaks.public", "other", "b@corp.example:pw\n"),
    );
    let mut config = config(&["pastes", "leaks.public"]);
    config.email_search = true;

    let tmp = TempDir::new().expect("create temp dir");
    let report = pipeline(&index, config, OutputFormat::Txt, &tmp.path().join("creds.txt"))
        .run()
        .await
        .expect("run");

    assert_eq!(report.documents.len(), 2);
    assert_eq!(index.views_of("shared"), 1);
    assert_eq!(index.views_of("other"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_same_credential_in_two_documents_recorded_once() {
    let index = Arc::new(
        FakeIndex::default()
            .document("pastes", "first", "dup@corp.example:pw\n")
            .document("pastes", "second", "dup@corp.example:pw\nnew@corp.example:pw\n"),
    );

    let tmp = TempDir::new().expect("create temp dir");
    let report = pipeline(
        &index,
        config(&["pastes"]),
        OutputFormat::Json,
        &tmp.path().join("creds.json"),
    )
    .run()
    .await
    .expect("run");

    let sources: Vec<(&str, &str)> = report
        .new_credentials
        .iter()
        .map(|r| (r.email.as_str(), r.source.as_str()))
        .collect();
    assert_eq!(
        sources,
        vec![("dup@corp.example", "first.txt"), ("new@corp.example", "second.txt")]
    );
    assert_eq!(report.documents[0].credentials_found, 1);
    assert_eq!(report.documents[1].credentials_found, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_is_skipped_after_full_backoff() {
    let index = Arc::new(
        FakeIndex::default()
            .document("pastes", "broken", "never@corp.example:seen\n")
            .document("pastes", "fine", "ok@corp.example:pw\n")
            .failing_fetch("broken", usize::MAX, unavailable),
    );
    let config = config(&["pastes"]);
    let expected = config.retry.total_delay() + config.request_delay;

    let tmp = TempDir::new().expect("create temp dir");
    let start = Instant::now();
    let report = pipeline(&index, config, OutputFormat::Txt, &tmp.path().join("creds.txt"))
        .run()
        .await
        .expect("run");

    assert_eq!(start.elapsed(), expected);
    assert_eq!(expected, Duration::from_millis(6500));
    assert_eq!(index.views_of("broken"), 3);

    assert_eq!(report.documents[0].state, DocumentState::FetchFailed);
    assert!(report.documents[0]
        .error
        .as_deref()
        .is_some_and(|e| e.contains("broken.txt")));
    assert_eq!(report.documents[1].state, DocumentState::Extracted);
    assert_eq!(report.failed_documents().count(), 1);
    assert_eq!(report.new_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transient_fetch_failure_recovers() {
    let index = Arc::new(
        FakeIndex::default()
            .document("pastes", "flaky", "ok@corp.example:pw\n")
            .failing_fetch("flaky", 1, unavailable),
    );

    let tmp = TempDir::new().expect("create temp dir");
    let start = Instant::now();
    let report = pipeline(&index, config(&["pastes"]), OutputFormat::Txt, &tmp.path().join("creds.txt"))
        .run()
        .await
        .expect("run");

    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert_eq!(index.views_of("flaky"), 2);
    assert_eq!(report.new_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_permanent_fetch_failure_is_not_retried() {
    let index = Arc::new(
        FakeIndex::default()
            .document("pastes", "gone", "x@corp.example:pw\n")
            .failing_fetch("gone", usize::MAX, gone),
    );

    let tmp = TempDir::new().expect("create temp dir");
    let start = Instant::now();
    let report = pipeline(&index, config(&["pastes"]), OutputFormat::Txt, &tmp.path().join("creds.txt"))
        .run()
        .await
        .expect("run");

    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(index.views_of("gone"), 1);
    assert_eq!(report.documents[0].state, DocumentState::FetchFailed);
}

#[tokio::test(start_paused = true)]
async fn test_document_with_nul_bytes_is_still_scanned() {
    let index = Arc::new(FakeIndex::default().document(
        "leaks.public",
        "dump",
        "user@corp.example:hunter2\nadmin@corp.example:pw\n\0\0 trailing blob\n",
    ));

    let tmp = TempDir::new().expect("create temp dir");
    let path = tmp.path().join("creds.txt");
    let report = pipeline(&index, config(&["leaks.public"]), OutputFormat::Txt, &path)
        .run()
        .await
        .expect("run");

    assert_eq!(report.documents[0].state, DocumentState::Extracted);
    assert_eq!(report.documents[0].credentials_found, 2);
    assert_eq!(report.failed_documents().count(), 0);
    assert_eq!(
        std::fs::read_to_string(&path).expect("read output"),
        "user@corp.example:hunter2\nadmin@corp.example:pw\n"
    );
}

#[tokio::test(start_paused = true)]
async fn test_unwritable_output_is_fatal() {
    let index = Arc::new(FakeIndex::default().document("pastes", "p", "a@corp.example:pw\n"));

    let tmp = TempDir::new().expect("create temp dir");
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, "not a directory").expect("write blocker file");
    let path = blocker.join("creds.txt");

    let err = pipeline(&index, config(&["pastes"]), OutputFormat::Txt, &path)
        .run()
        .await
        .expect_err("output directory cannot be created");

    assert!(matches!(err, ScanError::Sink(_)));
    assert_eq!(
        std::fs::read_to_string(&blocker).expect("blocker untouched"),
        "not a directory"
    );
}

#[tokio::test(start_paused = true)]
async fn test_nothing_new_writes_nothing() {
    let index = Arc::new(FakeIndex::default().document("pastes", "p", "randomtext nopattern\n"));

    let tmp = TempDir::new().expect("create temp dir");
    let path = tmp.path().join("out").join("creds.csv");
    let report = pipeline(&index, config(&["pastes"]), OutputFormat::Csv, &path)
        .run()
        .await
        .expect("run");

    assert_eq!(report.new_count(), 0);
    assert!(!path.exists());
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_index_is_fatal() {
    let index = Arc::new(
        FakeIndex::default()
            .document("pastes", "p", "a@corp.example:pw\n")
            .failing_searches(),
    );

    let tmp = TempDir::new().expect("create temp dir");
    let path = tmp.path().join("creds.txt");
    let err = pipeline(&index, config(&["pastes", "leaks.public"]), OutputFormat::Txt, &path)
        .run()
        .await
        .expect_err("no search succeeded");

    assert!(matches!(err, ScanError::UpstreamUnavailable { queries: 2, .. }));
    assert!(!path.exists());
}

#[tokio::test(start_paused = true)]
async fn test_corrupt_output_starts_fresh() {
    let index = Arc::new(FakeIndex::default().document("pastes", "p", "a@corp.example:pw\n"));

    let tmp = TempDir::new().expect("create temp dir");
    let path = tmp.path().join("creds.json");
    std::fs::write(&path, "[{\"email\": ").expect("write corrupt output");

    let report = pipeline(&index, config(&["pastes"]), OutputFormat::Json, &path)
        .run()
        .await
        .expect("run");

    assert_eq!(report.previously_seen, 0);
    assert_eq!(report.new_count(), 1);
    assert!(tmp.path().join("creds.json.corrupt").exists());
}

#[tokio::test(start_paused = true)]
async fn test_resume_across_formats_via_line_output() {
    let index = Arc::new(
        FakeIndex::default().document("pastes", "p", "a@corp.example:pw\nb@corp.example:pw\n"),
    );

    let tmp = TempDir::new().expect("create temp dir");
    let path = tmp.path().join("creds.txt");
    std::fs::write(&path, "legacy entry without a credential\na@corp.example:pw\n")
        .expect("write previous output");

    let report = pipeline(&index, config(&["pastes"]), OutputFormat::Txt, &path)
        .run()
        .await
        .expect("run");

    assert_eq!(report.previously_seen, 2);
    assert_eq!(report.new_count(), 1);
    assert_eq!(report.new_credentials[0].email, "b@corp.example");
    assert_eq!(report.total_unique, 3);
    assert_eq!(
        std::fs::read_to_string(&path).expect("read output"),
        "legacy entry without a credential\na@corp.example:pw\nb@corp.example:pw\n"
    );
}
