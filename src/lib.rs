//! Mini Cache - An in-process concurrent key/value cache
//!
//! Provides TTL expiration, LRU eviction, a pluggable loader with
//! single-flight coalescing, and a periodic expiration sweeper.
//!
//! ```no_run
//! use std::time::Duration;
//! use mini_cache::{Cache, LoadError};
//!
//! # async fn demo() {
//! let cache: Cache<String, String> = Cache::new();
//! cache.set_time_to_live(Duration::from_secs(60));
//! cache.set_max_entries(10_000);
//! cache.set_loader(|key: String| async move { Ok::<_, LoadError>(format!("{key}_value")) });
//! let sweeper = cache.set_sweep_interval(Duration::from_secs(30));
//!
//! let value = cache.get(&"key1".to_string()).await;
//! assert_eq!(value, Ok("key1_value".to_string()));
//!
//! if let Some(sweeper) = sweeper {
//!     sweeper.stop();
//! }
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats, Loader, MIN_SWEEP_INTERVAL};
pub use config::CacheConfig;
pub use error::{CacheError, LoadError, STATUS_FAILURE, STATUS_SUCCESS};
pub use tasks::SweepHandle;
