//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, loads, and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups served from a fresh entry
    pub hits: u64,
    /// Lookups that found no entry
    pub misses: u64,
    /// Lookups that found an expired entry
    pub stale_hits: u64,
    /// Loader invocations (misses and background refreshes)
    pub loads: u64,
    /// Loader invocations that did not succeed
    pub load_failures: u64,
    /// Entries evicted due to LRU policy
    pub evictions: u64,
    /// Entries removed by the expiration sweeper
    pub expired: u64,
    /// Entry count at snapshot time (advisory)
    pub total_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the fresh-hit rate.
    ///
    /// Returns hits / (hits + misses + stale_hits), or 0.0 if no lookups were made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.stale_hits;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Counter ==
/// Lock-free counters shared by every clone of a cache handle.
#[derive(Debug, Default)]
pub(crate) struct StatsCounter {
    hits: AtomicU64,
    misses: AtomicU64,
    stale_hits: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
    evictions: AtomicU64,
    expired: AtomicU64,
}

impl StatsCounter {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_hit(&self) {
        self.stale_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load(&self, succeeded: bool) {
        self.loads.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.load_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expired(&self, count: usize) {
        self.expired.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Copies the counters into a [`CacheStats`].
    pub fn snapshot(&self, total_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stale_hits: self.stale_hits.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            total_entries,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StatsCounter::default().snapshot(0);
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let counter = StatsCounter::default();
        counter.record_hit();
        counter.record_miss();
        counter.record_stale_hit();
        counter.record_hit();

        let stats = counter.snapshot(2);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.stale_hits, 1);
        assert_eq!(stats.hit_rate(), 0.5);
        assert_eq!(stats.total_entries, 2);
    }

    #[test]
    fn test_record_load_failures() {
        let counter = StatsCounter::default();
        counter.record_load(true);
        counter.record_load(false);
        counter.record_load(false);

        let stats = counter.snapshot(0);
        assert_eq!(stats.loads, 3);
        assert_eq!(stats.load_failures, 2);
    }

    #[test]
    fn test_record_evictions_and_expired() {
        let counter = StatsCounter::default();
        counter.record_eviction();
        counter.record_expired(4);

        let stats = counter.snapshot(0);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expired, 4);
    }

    #[test]
    fn test_stats_serialize() {
        let stats = CacheStats {
            hits: 3,
            ..CacheStats::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["hits"], 3);
        assert_eq!(json["total_entries"], 0);
    }
}
