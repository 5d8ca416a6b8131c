//! Credential extraction from fetched document text.

use crate::dedup::DedupStore;
use leakhound_core::{CredentialPattern, CredentialRecord, Target};

/// Pulls `email:password` records mentioning the target out of free text.
#[derive(Debug, Clone)]
pub struct CredentialExtractor {
    target: Target,
    pattern: CredentialPattern,
}

impl CredentialExtractor {
    /// Create an extractor for `target`.
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self {
            target,
            pattern: CredentialPattern::new(),
        }
    }

    /// Lazily extract new credentials from one document.
    ///
    /// Each yielded record has already been registered in `store`, so a
    /// credential repeated later in the same document, or in a later document,
    /// is skipped. The iterator is a single pass over `content`.
    ///
    /// NUL bytes end a line just like `\n`, so text embedded in binary dumps
    /// is still scanned.
    pub fn extract<'a>(
        &'a self,
        content: &'a str,
        source: &'a str,
        store: &'a mut DedupStore,
    ) -> impl Iterator<Item = CredentialRecord> + 'a {
        content
            .split(['\n', '\0'])
            .filter_map(move |line| self.extract_line(line, source, store))
    }

    /// Extract a credential from a single line, registering it in `store`.
    pub fn extract_line(
        &self,
        line: &str,
        source: &str,
        store: &mut DedupStore,
    ) -> Option<CredentialRecord> {
        if !self.target.appears_in(line) {
            return None;
        }

        let line = line.trim();
        let Some(found) = self.pattern.find(line) else {
            tracing::debug!("Skipped (no valid credential pattern): {}", line);
            return None;
        };

        if !store.add(found.key()) {
            tracing::debug!("Duplicate skipped: {}", found.email);
            return None;
        }

        tracing::info!("Found: {}", line);
        Some(CredentialRecord {
            url: found.url.to_string(),
            email: found.email.to_string(),
            password: found.password.to_string(),
            source: source.to_string(),
            raw: line.to_string(),
        })
    }
}
