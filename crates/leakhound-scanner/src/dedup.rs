//! Credential-level dedup across this run and previously persisted output.

use leakhound_core::DedupKey;
use std::collections::HashSet;

/// Set of credential identities already seen.
#[derive(Debug, Default, Clone)]
pub struct DedupStore {
    seen: HashSet<DedupKey>,
}

impl DedupStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from persisted output. Returns how many distinct keys
    /// were added.
    pub fn load(&mut self, keys: impl IntoIterator<Item = DedupKey>) -> usize {
        let before = self.seen.len();
        self.seen.extend(keys);
        self.seen.len() - before
    }

    /// Whether `key` has been seen.
    #[must_use]
    pub fn contains(&self, key: &DedupKey) -> bool {
        self.seen.contains(key)
    }

    /// Record `key`. Returns `false` if it was already present.
    pub fn add(&mut self, key: DedupKey) -> bool {
        self.seen.insert(key)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been seen yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
