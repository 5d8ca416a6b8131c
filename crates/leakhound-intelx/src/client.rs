//! Intelligence X HTTP client.

use crate::api::{view_format, ResultStatus, SearchRequest, SearchResultPage, SearchStarted};
use crate::error::{IntelxError, Result};
use crate::index::{LeakIndex, SearchQuery};
use async_trait::async_trait;
use leakhound_core::types::SearchHit;
use leakhound_core::{DocumentRef, IntelxConfig};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use zeroize::Zeroizing;

/// Intelligence X API client.
///
/// The API key is sent only in the `x-key` header. Query strings are echoed in
/// reqwest error messages, so the key never goes there.
pub struct IntelxClient {
    api_key: Zeroizing<String>,
    client: Client,
    base_url: String,
    user_agent: String,
    search_timeout_secs: u64,
    poll_interval: Duration,
    max_polls: u32,
}

impl IntelxClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn from_config(api_key: impl Into<String>, config: &IntelxConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IntelxError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key: Zeroizing::new(api_key.into()),
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            search_timeout_secs: config.search_timeout_secs,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_polls: config.max_polls.max(1),
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.get(format!("{}{path}", self.base_url)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.post(format!("{}{path}", self.base_url)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("x-key", self.api_key.as_str())
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
    }

    /// Submit a search and return its id.
    async fn start_search(&self, query: &SearchQuery) -> Result<String> {
        let body = SearchRequest::from_query(query, self.search_timeout_secs);
        let response = self.post("/intelligent/search").json(&body).send().await?;
        let response = check_status(response, &format!("search '{}'", query.term)).await?;

        let started: SearchStarted = response.json().await?;
        if let Some(reason) = started.rejection_reason() {
            return Err(IntelxError::SearchRejected {
                term: query.term.clone(),
                reason: reason.to_string(),
            });
        }

        tracing::debug!("Search {} started for '{}'", started.id, query.term);
        Ok(started.id)
    }

    async fn fetch_results(&self, search_id: &str, limit: usize) -> Result<SearchResultPage> {
        let limit = limit.to_string();
        let response = self
            .get("/intelligent/search/result")
            .query(&[("id", search_id), ("limit", limit.as_str())])
            .send()
            .await?;
        let response = check_status(response, &format!("search results {search_id}")).await?;
        Ok(response.json().await?)
    }

    async fn terminate_search(&self, search_id: &str) {
        let result = self
            .get("/intelligent/search/terminate")
            .query(&[("id", search_id)])
            .send()
            .await;

        if let Err(e) = result {
            tracing::debug!("Failed to terminate search {}: {}", search_id, e);
        }
    }
}

#[async_trait]
impl LeakIndex for IntelxClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let search_id = self.start_search(query).await?;
        let mut remaining = query.max_results as usize;
        let mut hits = Vec::new();

        for _ in 0..self.max_polls {
            tokio::time::sleep(self.poll_interval).await;

            let page = self.fetch_results(&search_id, remaining).await?;
            let status = page.status();
            let records = page.into_records();
            remaining = remaining.saturating_sub(records.len());
            hits.extend(records.into_iter().map(SearchHit::from));

            if remaining == 0 {
                self.terminate_search(&search_id).await;
                return Ok(hits);
            }

            match status {
                ResultStatus::Done | ResultStatus::NotFound => return Ok(hits),
                ResultStatus::MoreResults | ResultStatus::Pending => {}
            }
        }

        tracing::warn!(
            "Search for '{}' still running after {} polls, keeping {} partial results",
            query.term,
            self.max_polls,
            hits.len()
        );
        self.terminate_search(&search_id).await;
        Ok(hits)
    }

    async fn file_view(&self, document: &DocumentRef) -> Result<String> {
        let format = view_format(document.content_type, document.media).to_string();
        let response = self
            .get("/file/view")
            .query(&[
                ("f", format.as_str()),
                ("storageid", document.storage_id.as_str()),
                ("bucket", document.bucket.as_str()),
                ("escape", "0"),
            ])
            .send()
            .await?;

        let response = check_status(response, &format!("document {}", document.name)).await?;
        Ok(response.text().await?)
    }
}

/// Map non-success HTTP statuses onto `IntelxError`.
async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("no details").to_string()
    } else {
        body.trim().to_string()
    };

    Err(match status {
        StatusCode::UNAUTHORIZED => IntelxError::AuthenticationFailed { message },
        StatusCode::PAYMENT_REQUIRED => IntelxError::PaymentRequired { message },
        StatusCode::NOT_FOUND => IntelxError::NotFound {
            what: what.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => IntelxError::RateLimited { message },
        _ => IntelxError::ApiError {
            status: status.as_u16(),
            message,
        },
    })
}
