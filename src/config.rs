//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_REFRESH_GRACE;

/// Cache configuration parameters.
///
/// Durations are in milliseconds; `0` disables the corresponding feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a write stays fresh (0 = never expires)
    pub ttl_ms: u64,
    /// Maximum number of entries (0 = unbounded)
    pub max_entries: usize,
    /// Interval between expiration sweeps (0 = no sweeper)
    pub sweep_interval_ms: u64,
    /// Window a stale entry is treated as fresh once its refresh is triggered
    pub refresh_grace_ms: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - Entry time-to-live (default: 0, no expiry)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 0, unbounded)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Sweep frequency (default: 0, no sweeper)
    /// - `CACHE_REFRESH_GRACE_MS` - Refresh grace window (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_ms: env_or("CACHE_TTL_MS", defaults.ttl_ms),
            max_entries: env_or("CACHE_MAX_ENTRIES", defaults.max_entries),
            sweep_interval_ms: env_or("CACHE_SWEEP_INTERVAL_MS", defaults.sweep_interval_ms),
            refresh_grace_ms: env_or("CACHE_REFRESH_GRACE_MS", defaults.refresh_grace_ms),
        }
    }

    // == Duration Accessors ==
    /// Entry time-to-live, or `None` when expiry is disabled.
    pub fn time_to_live(&self) -> Option<Duration> {
        non_zero_millis(self.ttl_ms)
    }

    /// Sweep interval, or `None` when no sweeper should run.
    pub fn sweep_interval(&self) -> Option<Duration> {
        non_zero_millis(self.sweep_interval_ms)
    }

    /// Window a stale entry is served as fresh once its refresh is claimed.
    pub fn refresh_grace(&self) -> Duration {
        Duration::from_millis(self.refresh_grace_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 0,
            max_entries: 0,
            sweep_interval_ms: 0,
            refresh_grace_ms: DEFAULT_REFRESH_GRACE.as_millis() as u64,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn non_zero_millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}
