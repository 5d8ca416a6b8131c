//! Shared types used across leakhound.
//!
//! This module defines the domain model: the scan target, the documents the
//! upstream index hands back, the credential records persisted as output, and
//! the output format selector.

use crate::error::LeakhoundError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display name used when the upstream omits one.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// The domain (or other literal) being searched for.
///
/// Matching is a case-insensitive literal substring search; the value is
/// escaped before it reaches the regex engine.
#[derive(Debug, Clone)]
pub struct Target {
    value: String,
    matcher: Regex,
}

impl Target {
    /// Create a new `Target`.
    ///
    /// # Errors
    /// Returns error if the target is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, LeakhoundError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(LeakhoundError::Validation(
                "invalid target: must not be empty".to_string(),
            ));
        }

        let matcher = RegexBuilder::new(&regex::escape(&value))
            .case_insensitive(true)
            .build()
            .map_err(|e| LeakhoundError::Internal(format!("failed to build target matcher: {e}")))?;

        Ok(Self { value, matcher })
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Case-insensitive literal containment check.
    #[must_use]
    pub fn appears_in(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// The `@target` form used for email-oriented searches.
    #[must_use]
    pub fn email_variant(&self) -> String {
        if self.value.starts_with('@') {
            self.value.clone()
        } else {
            format!("@{}", self.value)
        }
    }

    /// Search terms for this target, bare form first.
    #[must_use]
    pub fn search_terms(&self, include_email_variant: bool) -> Vec<String> {
        let mut terms = vec![self.value.clone()];
        if include_email_variant {
            let email = self.email_variant();
            if email != self.value {
                terms.push(email);
            }
        }
        terms
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A named partition of the upstream index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bucket(String);

impl Bucket {
    /// Buckets queried when none are configured.
    pub const DEFAULTS: [&'static str; 4] =
        ["leaks.private", "leaks.public", "leaks.private.li", "pastes"];

    /// Create a bucket label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The default bucket list.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        Self::DEFAULTS.iter().map(|b| Self::new(*b)).collect()
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Document metadata as returned by a search, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Opaque storage identifier; hits without one cannot be fetched.
    pub storage_id: Option<String>,
    /// Stable upstream identifier.
    pub system_id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Upstream content type code.
    pub content_type: i64,
    /// Upstream media type code.
    pub media: i64,
    /// Bucket the hit lives in.
    pub bucket: String,
}

impl SearchHit {
    /// Promote to a fetchable document, dropping hits without a storage id.
    #[must_use]
    pub fn into_document(self) -> Option<DocumentRef> {
        let storage_id = self.storage_id.filter(|sid| !sid.is_empty())?;
        Some(DocumentRef {
            storage_id,
            system_id: self.system_id,
            name: self
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            content_type: self.content_type,
            media: self.media,
            bucket: self.bucket,
        })
    }
}

/// A retrievable document. Immutable once obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Opaque storage identifier, the document-level dedup key.
    pub storage_id: String,
    /// Stable upstream identifier.
    pub system_id: Option<String>,
    /// Display name, recorded as the `source` of extracted credentials.
    pub name: String,
    /// Upstream content type code.
    pub content_type: i64,
    /// Upstream media type code.
    pub media: i64,
    /// Bucket the document lives in.
    pub bucket: String,
}

/// A single extracted credential, the unit of persisted output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Context preceding the credential on its line, possibly empty
    pub url: String,
    /// Matched email
    pub email: String,
    /// Matched password
    pub password: String,
    /// Display name of the originating document
    pub source: String,
    /// The trimmed source line
    pub raw: String,
}

impl CredentialRecord {
    /// Dedup key for this record.
    #[must_use]
    pub fn key(&self) -> crate::credential::DedupKey {
        crate::credential::DedupKey::new(&self.email, &self.password)
    }
}

/// Output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One raw matched line per credential, appended
    #[default]
    Txt,
    /// Rows of `url,email,password,source`, header on first write
    Csv,
    /// A single array of credential objects, rewritten on each run
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = LeakhoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(LeakhoundError::Validation(format!(
                "invalid output format '{other}', expected one of: txt, json, csv"
            ))),
        }
    }
}
