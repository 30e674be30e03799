//! In-memory tier keyed by fingerprint.

use moka::sync::Cache;
use std::sync::Arc;

use crate::prediction::SuperWeightPrediction;

/// Bounded in-memory map from fingerprint to prediction list.
pub struct MemoryTier {
    entries: Cache<String, Arc<Vec<SuperWeightPrediction>>>,
}

impl MemoryTier {
    /// Creates a tier holding at most `capacity` entries.
    #[inline]
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    #[inline]
    pub fn get(&self, fingerprint: &str) -> Option<Vec<SuperWeightPrediction>> {
        self.entries
            .get(fingerprint)
            .map(|predictions| predictions.as_ref().clone())
    }

    /// Inserts or overwrites the entry for `fingerprint`.
    #[inline]
    pub fn insert(&self, fingerprint: &str, predictions: &[SuperWeightPrediction]) {
        self.entries
            .insert(fingerprint.to_string(), Arc::new(predictions.to_vec()));
    }

    #[inline]
    pub fn remove(&self, fingerprint: &str) -> bool {
        self.entries.remove(fingerprint).is_some()
    }

    /// Approximate entry count; call [`run_pending_tasks`](Self::run_pending_tasks) first
    /// for an exact figure.
    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    #[inline]
    /// Invalidates every entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    #[inline]
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}

impl std::fmt::Debug for MemoryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTier")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}
