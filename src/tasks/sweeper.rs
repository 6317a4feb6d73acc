//! Expiration Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::fmt;
use std::hash::Hash;
use std::sync::Weak;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Shared;

/// Spawns a task that sweeps expired entries from `shared` forever.
///
/// The interval is re-read before every sleep, so retuning the cache's sweep
/// interval takes effect on the next cycle. The task holds only a weak
/// reference and exits once every cache handle has been dropped.
pub(crate) fn spawn_sweeper<K, V>(runtime: &Handle, shared: Weak<Shared<K, V>>) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + fmt::Debug + Send + Sync + 'static,
{
    runtime.spawn(async move {
        info!("Starting expiration sweeper");

        loop {
            let Some(interval) = shared.upgrade().and_then(|s| s.sweep_interval()) else {
                break;
            };

            tokio::time::sleep(interval).await;

            let Some(cache) = shared.upgrade() else {
                break;
            };
            let removed = cache.clear_expired().await;

            if removed > 0 {
                info!(removed, "Sweep removed expired entries");
            } else {
                debug!("Sweep found no expired entries");
            }
        }

        info!("Cache dropped, expiration sweeper exiting");
    })
}

// == Sweep Handle ==
/// Owner's handle to a running expiration sweeper.
///
/// Dropping the handle leaves the sweeper running until the cache itself is
/// dropped; call [`SweepHandle::stop`] to end it explicitly.
#[derive(Debug)]
#[must_use = "the sweeper keeps running until stopped or the cache is dropped"]
pub struct SweepHandle {
    handle: JoinHandle<()>,
}

impl SweepHandle {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    /// Stops the sweeper. A later `set_sweep_interval` starts a new one.
    pub fn stop(self) {
        self.handle.abort();
        info!("Expiration sweeper stopped");
    }

    /// Returns true while the sweeper task is alive.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::cache::Cache;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_entries() {
        let cache = Cache::new();
        cache.set_time_to_live(Duration::from_secs(1));
        cache.put("expire_soon", "value").await;

        let handle = cache
            .set_sweep_interval(Duration::from_secs(1))
            .expect("sweeper started");

        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(cache.len(), 0);
        assert!(cache.get(&"expire_soon").await.is_err());
        assert_eq!(cache.stats().expired, 1);

        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_preserves_valid_entries() {
        let cache = Cache::new();
        cache.set_time_to_live(Duration::from_secs(3600));
        cache.put("long_lived", "value").await;

        let handle = cache
            .set_sweep_interval(Duration::from_secs(1))
            .expect("sweeper started");

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.get(&"long_lived").await, Ok("value"));
        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_without_ttl_removes_nothing() {
        let cache = Cache::new();
        cache.put("a", 1).await;

        let handle = cache
            .set_sweep_interval(Duration::from_secs(1))
            .expect("sweeper started");
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(cache.len(), 1);
        handle.stop();
    }

    #[tokio::test]
    async fn test_sweeper_can_be_stopped_and_restarted() {
        let cache: Cache<u32, u32> = Cache::new();

        let handle = cache
            .set_sweep_interval(Duration::from_secs(1))
            .expect("sweeper started");
        assert!(handle.is_running());
        handle.stop();

        tokio::time::sleep(Duration::from_millis(100)).await;

        let restarted = cache.set_sweep_interval(Duration::from_secs(1));
        assert!(restarted.is_some(), "stopped sweeper should be replaceable");
        if let Some(handle) = restarted {
            handle.stop();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_exits_when_cache_dropped() {
        let cache: Cache<u32, u32> = Cache::new();
        let handle = cache
            .set_sweep_interval(Duration::from_secs(1))
            .expect("sweeper started");

        drop(cache);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(!handle.is_running());
    }
}
