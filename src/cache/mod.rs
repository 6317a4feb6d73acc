//! Cache Module
//!
//! Provides the in-memory cache engine: heartbeat expiry, LRU eviction,
//! single-flight loading, and stale-while-refresh serving.

mod engine;
mod entry;
mod flight;
mod loader;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

use std::time::Duration;

// Re-export public types
pub use engine::Cache;
pub use entry::CacheEntry;
pub use flight::{LoadGroup, LoadOutcome};
pub use loader::{LoadFuture, Loader};
pub use lru::{LruList, NodeId};
pub use stats::CacheStats;
pub use store::CacheStore;

pub(crate) use engine::Shared;

// == Public Constants ==
/// Shortest accepted sweep interval; shorter intervals are ignored
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Default window a stale entry is treated as fresh once its refresh is triggered
pub const DEFAULT_REFRESH_GRACE: Duration = Duration::from_secs(3);
