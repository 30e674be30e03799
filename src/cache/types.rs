use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// How a cache lookup was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    HitMemory,
    HitDisk,
    Miss,
    /// Caching is turned off; the caller computes fresh.
    Disabled,
}

impl CacheStatus {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::HitMemory => "HIT_MEMORY",
            CacheStatus::HitDisk => "HIT_DISK",
            CacheStatus::Miss => "MISS",
            CacheStatus::Disabled => "DISABLED",
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheStatus::HitMemory | CacheStatus::HitDisk)
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Point-in-time snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub memory_hits: u64,
    pub disk_hits: u64,
    pub misses: u64,
    pub writes: u64,
    /// Read or write failures that were swallowed (fail-open).
    pub failures: u64,
}

impl CacheStats {
    #[inline]
    pub fn hits(&self) -> u64 {
        self.memory_hits + self.disk_hits
    }

    /// Hits over lookups; `0.0` before the first lookup.
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits() + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits() as f64 / lookups as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    memory_hits: AtomicU64,
    disk_hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    failures: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn record(&self, status: CacheStatus) {
        let counter = match status {
            CacheStatus::HitMemory => &self.memory_hits,
            CacheStatus::HitDisk => &self.disk_hits,
            CacheStatus::Miss => &self.misses,
            CacheStatus::Disabled => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            disk_hits: self.disk_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
