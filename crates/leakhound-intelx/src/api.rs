//! Wire types for the Intelligence X HTTP API.

use crate::index::SearchQuery;
use leakhound_core::types::SearchHit;
use serde::{Deserialize, Serialize};

/// Body of `POST /intelligent/search`.
#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub term: &'a str,
    pub buckets: Vec<&'a str>,
    pub lookuplevel: u8,
    pub maxresults: u32,
    pub timeout: u64,
    pub datefrom: String,
    pub dateto: String,
    pub sort: u8,
    pub media: u8,
    pub terminate: Vec<String>,
}

impl<'a> SearchRequest<'a> {
    /// Build the request body for a query.
    #[must_use]
    pub fn from_query(query: &'a SearchQuery, timeout_secs: u64) -> Self {
        Self {
            term: &query.term,
            buckets: query.buckets.iter().map(|b| b.as_str()).collect(),
            lookuplevel: 0,
            maxresults: query.max_results,
            timeout: timeout_secs,
            datefrom: query.window.from_timestamp(),
            dateto: query.window.to_timestamp(),
            // Date descending
            sort: 4,
            media: 0,
            terminate: Vec::new(),
        }
    }
}

/// Response of `POST /intelligent/search`.
#[derive(Debug, Deserialize)]
pub struct SearchStarted {
    pub id: String,
    #[serde(default)]
    pub status: i64,
}

impl SearchStarted {
    /// Explanation for a non-zero submission status.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<&'static str> {
        match self.status {
            0 => None,
            1 => Some("invalid term"),
            2 => Some("max concurrent searches per API key reached"),
            _ => Some("unknown search status"),
        }
    }
}

/// Poll status of `GET /intelligent/search/result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    /// Records returned, more may follow
    MoreResults,
    /// No more results
    Done,
    /// Search id unknown or expired
    NotFound,
    /// Nothing yet, keep polling
    Pending,
}

impl From<i64> for ResultStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::MoreResults,
            1 => Self::Done,
            3 => Self::Pending,
            _ => Self::NotFound,
        }
    }
}

/// Response of `GET /intelligent/search/result`.
#[derive(Debug, Deserialize)]
pub struct SearchResultPage {
    #[serde(default)]
    pub records: Option<Vec<ApiRecord>>,
    #[serde(default)]
    pub status: i64,
}

impl SearchResultPage {
    /// Decoded poll status.
    #[must_use]
    pub fn status(&self) -> ResultStatus {
        ResultStatus::from(self.status)
    }

    /// Take the records, treating `null` as empty.
    #[must_use]
    pub fn into_records(self) -> Vec<ApiRecord> {
        self.records.unwrap_or_default()
    }
}

/// One search record. Only the fields the scanner uses are decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRecord {
    #[serde(default)]
    pub systemid: Option<String>,
    #[serde(default)]
    pub storageid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub content_type: i64,
    #[serde(default)]
    pub media: i64,
    #[serde(default)]
    pub bucket: String,
}

impl From<ApiRecord> for SearchHit {
    fn from(record: ApiRecord) -> Self {
        SearchHit {
            storage_id: record.storageid,
            system_id: record.systemid,
            name: record.name,
            content_type: record.content_type,
            media: record.media,
            bucket: record.bucket,
        }
    }
}

/// Content type code for plain text.
const TYPE_TEXT: i64 = 1;

/// `f` parameter for `GET /file/view`, picked from media and content type.
#[must_use]
pub fn view_format(content_type: i64, media: i64) -> u8 {
    match (media, content_type) {
        (9 | 23, _) => 7,
        (_, TYPE_TEXT) => 0,
        (15, _) => 6,
        (16, _) => 8,
        (18, _) => 10,
        (25, _) => 11,
        (17, _) => 9,
        _ => 1,
    }
}
