//! Content-addressed prediction cache.
//!
//! [`PredictionCache`] keys prediction lists by [`fingerprint`] and layers a
//! bounded in-memory tier over a directory of `<fingerprint>.jsonl` files.
//! Disk hits are promoted into memory; writes go to both tiers.
//!
//! Every failure is fail-open: a read error is reported as a miss and a write
//! error is logged and dropped, so losing the cache never blocks a prediction.

pub mod disk;
pub mod error;
pub mod memory;
pub mod types;

#[cfg(test)]
mod tests;

pub use disk::DiskTier;
pub use error::{CacheError, CacheResult};
pub use memory::MemoryTier;
pub use types::{CacheStats, CacheStatus};

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::constants::{DEFAULT_MEMORY_CAPACITY, DEFAULT_VERSION_SALT};
use crate::hashing::fingerprint;
use crate::prediction::SuperWeightPrediction;
use crate::telemetry::Telemetry;
use types::CacheCounters;

/// Settings for [`PredictionCache::open`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    /// Mixed into every key; changing it invalidates all entries.
    pub version_salt: String,
    pub memory_capacity: u64,
}

impl CacheConfig {
    /// Enabled cache in `dir` with the default salt and capacity.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            dir: dir.into(),
            version_salt: DEFAULT_VERSION_SALT.to_string(),
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }

    pub fn with_version_salt(mut self, salt: impl Into<String>) -> Self {
        self.version_salt = salt.into();
        self
    }

    pub fn with_memory_capacity(mut self, capacity: u64) -> Self {
        self.memory_capacity = capacity;
        self
    }

    /// Turns the cache off; [`PredictionCache::open`] then touches no files.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Outcome of [`PredictionCache::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLookup {
    pub status: CacheStatus,
    pub predictions: Option<Vec<SuperWeightPrediction>>,
}

impl CacheLookup {
    fn resolved(status: CacheStatus, predictions: Vec<SuperWeightPrediction>) -> Self {
        Self {
            status,
            predictions: Some(predictions),
        }
    }

    fn absent(status: CacheStatus) -> Self {
        Self {
            status,
            predictions: None,
        }
    }
}

#[derive(Debug)]
struct Tiers {
    memory: MemoryTier,
    disk: DiskTier,
}

/// Two-tier prediction cache. A disabled cache reports every lookup as
/// [`CacheStatus::Disabled`] and ignores writes.
#[derive(Debug)]
pub struct PredictionCache {
    tiers: Option<Tiers>,
    version_salt: String,
    counters: CacheCounters,
    telemetry: Telemetry,
}

impl PredictionCache {
    /// Opens the cache described by `config`, creating its directory.
    ///
    /// # Errors
    ///
    /// [`CacheError::DirectoryUnavailable`] if the directory cannot be created.
    pub fn open(config: &CacheConfig) -> CacheResult<Self> {
        if !config.enabled {
            return Ok(Self::disabled_with_salt(config.version_salt.clone()));
        }

        let disk = DiskTier::new(config.dir.clone());
        disk.ensure_dir()?;

        Ok(Self {
            tiers: Some(Tiers {
                memory: MemoryTier::with_capacity(config.memory_capacity),
                disk,
            }),
            version_salt: config.version_salt.clone(),
            counters: CacheCounters::default(),
            telemetry: Telemetry::default(),
        })
    }

    /// A cache that stores nothing.
    pub fn disabled() -> Self {
        Self::disabled_with_salt(DEFAULT_VERSION_SALT.to_string())
    }

    fn disabled_with_salt(version_salt: String) -> Self {
        Self {
            tiers: None,
            version_salt,
            counters: CacheCounters::default(),
            telemetry: Telemetry::default(),
        }
    }

    /// Routes read and write failures through `telemetry`.
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.tiers.is_some()
    }

    /// Entry directory, or `None` when disabled.
    pub fn dir(&self) -> Option<&Path> {
        self.tiers.as_ref().map(|t| t.disk.dir())
    }

    /// Salt mixed into every fingerprint.
    pub fn version_salt(&self) -> &str {
        &self.version_salt
    }

    /// Cache key for the given request under this cache's version salt.
    pub fn fingerprint(&self, model_id: &str, text: &str, top_k: usize, seed: Option<u64>) -> String {
        fingerprint(&self.version_salt, model_id, text, top_k, seed)
    }

    /// Resolves a request against memory, then disk.
    pub fn lookup(
        &self,
        model_id: &str,
        text: &str,
        top_k: usize,
        seed: Option<u64>,
    ) -> CacheLookup {
        let Some(tiers) = &self.tiers else {
            return CacheLookup::absent(CacheStatus::Disabled);
        };
        let key = self.fingerprint(model_id, text, top_k, seed);

        let lookup = self.telemetry.scope(|| {
            if let Some(predictions) = tiers.memory.get(&key) {
                return CacheLookup::resolved(CacheStatus::HitMemory, predictions);
            }

            match tiers.disk.load(&key) {
                Ok(Some(predictions)) => {
                    tiers.memory.insert(&key, &predictions);
                    CacheLookup::resolved(CacheStatus::HitDisk, predictions)
                }
                Ok(None) => CacheLookup::absent(CacheStatus::Miss),
                Err(e) => {
                    warn!(fingerprint = %key, error = %e, "Cache read failed, treating as miss");
                    self.counters.record_failure();
                    CacheLookup::absent(CacheStatus::Miss)
                }
            }
        });

        self.counters.record(lookup.status);
        self.telemetry.scope(|| {
            debug!(fingerprint = %key, status = %lookup.status, "Cache lookup");
        });
        lookup
    }

    /// Previously stored predictions for the request, if any.
    pub fn get(
        &self,
        model_id: &str,
        text: &str,
        top_k: usize,
        seed: Option<u64>,
    ) -> Option<Vec<SuperWeightPrediction>> {
        self.lookup(model_id, text, top_k, seed).predictions
    }

    /// Stores `predictions`, overwriting any existing entry for the key.
    ///
    /// Returns `true` if the entry reached disk. Does nothing when disabled.
    pub fn put(
        &self,
        model_id: &str,
        text: &str,
        top_k: usize,
        seed: Option<u64>,
        predictions: &[SuperWeightPrediction],
    ) -> bool {
        let Some(tiers) = &self.tiers else {
            return false;
        };
        let key = self.fingerprint(model_id, text, top_k, seed);

        tiers.memory.insert(&key, predictions);

        self.telemetry.scope(|| match tiers.disk.store(&key, predictions) {
            Ok(path) => {
                self.counters.record_write();
                debug!(
                    fingerprint = %key,
                    path = %path.display(),
                    records = predictions.len(),
                    "Cache entry stored"
                );
                true
            }
            Err(e) => {
                self.counters.record_failure();
                warn!(fingerprint = %key, error = %e, "Cache write failed");
                false
            }
        })
    }

    /// Drops the entry from both tiers; returns `true` if either held it.
    pub fn remove(&self, model_id: &str, text: &str, top_k: usize, seed: Option<u64>) -> bool {
        let Some(tiers) = &self.tiers else {
            return false;
        };
        let key = self.fingerprint(model_id, text, top_k, seed);

        let in_memory = tiers.memory.remove(&key);
        let on_disk = match tiers.disk.remove(&key) {
            Ok(removed) => removed,
            Err(e) => {
                self.counters.record_failure();
                self.telemetry.scope(|| {
                    warn!(fingerprint = %key, error = %e, "Cache remove failed");
                });
                false
            }
        };
        in_memory || on_disk
    }

    /// Empties the memory tier; disk entries are kept.
    pub fn clear_memory(&self) {
        if let Some(tiers) = &self.tiers {
            tiers.memory.clear();
            tiers.memory.run_pending_tasks();
        }
    }

    /// Number of entries persisted on disk (`0` when disabled or unreadable).
    pub fn len_on_disk(&self) -> usize {
        self.tiers
            .as_ref()
            .and_then(|t| t.disk.len().ok())
            .unwrap_or(0)
    }

    /// Snapshot of hit, miss and failure counters.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}
