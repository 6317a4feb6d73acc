//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with heartbeat-based expiry.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A single cache entry: the key it is stored under, its value, and the
/// instant of its last confirmed-fresh write.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// Key the entry is stored under; needed when evicting from the list back
    pub key: K,
    /// The stored value
    pub value: V,
    /// Last confirmed-fresh write
    heartbeat: Instant,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates a new entry whose heartbeat is `now`.
    pub fn new(key: K, value: V, now: Instant) -> Self {
        Self {
            key,
            value,
            heartbeat: now,
        }
    }

    /// Returns the entry's heartbeat.
    pub fn heartbeat(&self) -> Instant {
        self.heartbeat
    }

    // == Is Stale ==
    /// Checks whether `heartbeat + ttl` lies strictly before `now`.
    ///
    /// Without a TTL an entry never goes stale, and neither does one whose
    /// deadline is past the clock's range.
    pub fn is_stale(&self, ttl: Option<Duration>, now: Instant) -> bool {
        match ttl {
            Some(ttl) => self
                .heartbeat
                .checked_add(ttl)
                .map_or(false, |deadline| deadline < now),
            None => false,
        }
    }

    // == Refresh ==
    /// Replaces the value in place and resets the heartbeat to `now`.
    ///
    /// The heartbeat never moves backwards: if a grace extension already
    /// pushed it past `now`, it is kept.
    pub fn refresh(&mut self, value: V, now: Instant) {
        self.value = value;
        if now > self.heartbeat {
            self.heartbeat = now;
        }
    }

    // == Claim Refresh ==
    /// Pushes the heartbeat forward so the entry reads as fresh until
    /// `now + grace`, without touching the value.
    ///
    /// The heartbeat only moves forward and saturates at the clock's range.
    pub fn claim_refresh(&mut self, ttl: Duration, grace: Duration, now: Instant) {
        let bumped = saturating_add(self.heartbeat, grace);
        let floor = saturating_add(now, grace).checked_sub(ttl);
        self.heartbeat = match floor {
            Some(floor) if floor > bumped => floor,
            _ => bumped,
        };
    }
}

/// Adds `by` to `at`, clamping to the latest representable instant.
fn saturating_add(at: Instant, by: Duration) -> Instant {
    if let Some(sum) = at.checked_add(by) {
        return sum;
    }
    let mut out = at;
    let mut step = by;
    while !step.is_zero() {
        match out.checked_add(step) {
            Some(next) => out = next,
            None => step /= 2,
        }
    }
    out
}
