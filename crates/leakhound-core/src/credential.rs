//! Credential pattern matching and dedup key derivation.
//!
//! The same pattern is used when extracting credentials from fetched documents
//! and when re-reading line-oriented output from a previous run, so the dedup
//! keys produced on both paths are identical.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `user@domain.tld:password`, anchored to end of line.
///
/// The email side excludes `/`, `:`, `@` and whitespace on both halves and
/// requires a 2+ letter suffix. The password side takes everything up to the
/// end of the line, colons included.
static CREDENTIAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([^/:@\s]+@[^/:@\s]+\.[a-zA-Z]{2,}):(.+)$")
        .expect("valid credential regex")
});

/// Identity of a credential: `email:password`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupKey(String);

impl DedupKey {
    /// Build the key for a matched email/password pair.
    #[must_use]
    pub fn new(email: &str, password: &str) -> Self {
        Self(format!("{email}:{password}"))
    }

    /// Use an unparseable persisted line verbatim as its own key.
    #[must_use]
    pub fn from_raw(line: impl Into<String>) -> Self {
        Self(line.into())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A credential located inside a single line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialMatch<'a> {
    /// Context preceding the match, trailing colons and whitespace removed.
    pub url: &'a str,
    /// Capture group 1.
    pub email: &'a str,
    /// Capture group 2, never empty.
    pub password: &'a str,
}

impl CredentialMatch<'_> {
    /// Dedup key for this match.
    #[must_use]
    pub fn key(&self) -> DedupKey {
        DedupKey::new(self.email, self.password)
    }
}

/// Matcher for `email:password` credential lines.
#[derive(Debug, Clone)]
pub struct CredentialPattern {
    regex: Regex,
}

impl CredentialPattern {
    /// Create a matcher backed by the shared compiled pattern.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regex: CREDENTIAL_PATTERN.clone(),
        }
    }

    /// Find the credential in an already trimmed line.
    #[must_use]
    pub fn find<'a>(&self, line: &'a str) -> Option<CredentialMatch<'a>> {
        let caps = self.regex.captures(line)?;
        let whole = caps.get(0)?;
        let email = caps.get(1)?.as_str();
        let password = caps.get(2)?.as_str();

        let url = line[..whole.start()].trim_end_matches(':').trim();

        Some(CredentialMatch {
            url,
            email,
            password,
        })
    }

    /// Dedup key for a line read back from line-oriented output.
    ///
    /// Lines that no longer match the pattern still count as seen, keyed by
    /// their trimmed text.
    #[must_use]
    pub fn key_for_persisted_line(&self, line: &str) -> DedupKey {
        let line = line.trim();
        match self.find(line) {
            Some(found) => found.key(),
            None => DedupKey::from_raw(line),
        }
    }
}

impl Default for CredentialPattern {
    fn default() -> Self {
        Self::new()
    }
}
