use super::generation::UpdateSummary;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters of a single cache, read with [`CacheStats`]
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    updates: AtomicU64,
    failed_updates: AtomicU64,
    materialized: AtomicU64,
    reused: AtomicU64,
    lookups: AtomicU64,
    misses: AtomicU64,
}

impl CacheCounters {
    pub fn record_update(&self, summary: &UpdateSummary) {
        self.updates.fetch_add(1, Ordering::Relaxed);
        self.materialized
            .fetch_add(summary.materialized, Ordering::Relaxed);
        self.reused.fetch_add(summary.reused, Ordering::Relaxed);
    }

    pub fn record_failed_update(&self) {
        self.failed_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            updates: self.updates.load(Ordering::Relaxed),
            failed_updates: self.failed_updates.load(Ordering::Relaxed),
            materialized: self.materialized.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time cache statistics
///
/// `materialized` counts index builds for the host cache and host to device
/// transfers for the device cache. `reused` counts entries shared with the
/// opposite role. `misses` counts lookups that returned `NotFound`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub updates: u64,
    pub failed_updates: u64,
    pub materialized: u64,
    pub reused: u64,
    pub lookups: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Share of update entries that were reused rather than materialized
    pub fn reuse_rate(&self) -> f64 {
        let total = self.materialized + self.reused;
        if total == 0 {
            0.0
        } else {
            self.reused as f64 / total as f64
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updates ({} failed), {} materialized, {} reused, {} lookups, {} misses",
            self.updates,
            self.failed_updates,
            self.materialized,
            self.reused,
            self.lookups,
            self.misses
        )
    }
}
