//! Cache Facade Module
//!
//! Public cache handle orchestrating the entry store, the load coalescing
//! group, and the expiration sweeper.

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::flight::{LoadGroup, LoadOutcome};
use crate::cache::stats::StatsCounter;
use crate::cache::{
    CacheStats, CacheStore, Loader, DEFAULT_REFRESH_GRACE, MIN_SWEEP_INTERVAL,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result, STATUS_SUCCESS};
use crate::tasks::{spawn_sweeper, SweepHandle};

// == Settings ==
/// Tunables read at the start of each operation.
struct Settings<K, V> {
    ttl: Option<Duration>,
    max_entries: usize,
    sweep_interval: Option<Duration>,
    refresh_grace: Duration,
    loader: Option<Arc<dyn Loader<K, V>>>,
}

impl<K, V> Clone for Settings<K, V> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            max_entries: self.max_entries,
            sweep_interval: self.sweep_interval,
            refresh_grace: self.refresh_grace,
            loader: self.loader.clone(),
        }
    }
}

impl<K, V> Default for Settings<K, V> {
    fn default() -> Self {
        Self {
            ttl: None,
            max_entries: 0,
            sweep_interval: None,
            refresh_grace: DEFAULT_REFRESH_GRACE,
            loader: None,
        }
    }
}

// == Shared State ==
/// State shared by every clone of a [`Cache`] and, weakly, by its sweeper.
pub(crate) struct Shared<K, V> {
    store: RwLock<CacheStore<K, V>>,
    /// Entry count mirrored after each mutation; read without the store lock
    len: AtomicUsize,
    settings: parking_lot::RwLock<Settings<K, V>>,
    group: LoadGroup<K, V>,
    stats: StatsCounter,
    sweeper: parking_lot::Mutex<Option<AbortHandle>>,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn settings(&self) -> Settings<K, V> {
        self.settings.read().clone()
    }

    pub(crate) fn sweep_interval(&self) -> Option<Duration> {
        self.settings.read().sweep_interval
    }

    /// Stores a value under the exclusive lock, evicting if over capacity.
    async fn write(&self, key: K, value: V) {
        let max_entries = self.settings.read().max_entries;
        let mut store = self.store.write().await;
        if store.write(key, value, Instant::now(), max_entries).is_some() {
            self.stats.record_eviction();
        }
        self.len.store(store.len(), Ordering::Relaxed);
    }

    /// Removes every expired entry; a no-op without a TTL.
    pub(crate) async fn clear_expired(&self) -> usize {
        let ttl = self.settings.read().ttl;
        let mut store = self.store.write().await;
        let removed = store.clear_expired(ttl, Instant::now());
        self.len.store(store.len(), Ordering::Relaxed);
        self.stats.record_expired(removed);
        removed
    }

    /// Loads `key` through the coalescing group, writing it back on success.
    async fn load(&self, key: &K, loader: Arc<dyn Loader<K, V>>) -> LoadOutcome<V> {
        self.group
            .resolve(key, || async move {
                debug!("Invoking loader");
                let outcome = loader.load(key.clone()).await;
                self.stats.record_load(outcome.is_ok());
                if let Ok(value) = &outcome {
                    self.write(key.clone(), value.clone()).await;
                }
                outcome
            })
            .await
    }
}

// == Cache ==
/// Concurrent key/value cache with TTL expiration, LRU eviction, and
/// single-flight loading.
///
/// `Cache` is a cheap handle; clones share the same entries. Operations that
/// may load or refresh spawn onto the current Tokio runtime.
pub struct Cache<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("len", &self.shared.len.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + fmt::Debug + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty cache with no TTL, no size cap, no loader, and no sweeper.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                store: RwLock::new(CacheStore::new()),
                len: AtomicUsize::new(0),
                settings: parking_lot::RwLock::new(Settings::default()),
                group: LoadGroup::new(),
                stats: StatsCounter::default(),
                sweeper: parking_lot::Mutex::new(None),
            }),
        }
    }

    /// Creates a cache configured from `config`.
    ///
    /// Returns the sweeper handle when the config enables a sweeper and it was started.
    pub fn with_config(config: &CacheConfig) -> (Self, Option<SweepHandle>) {
        let cache = Self::new();
        cache.set_time_to_live(config.time_to_live().unwrap_or(Duration::ZERO));
        cache.set_max_entries(config.max_entries);
        cache.set_refresh_grace(config.refresh_grace());
        let sweeper = config
            .sweep_interval()
            .and_then(|interval| cache.set_sweep_interval(interval));
        (cache, sweeper)
    }

    // == Configuration ==
    /// Sets how long a write stays fresh. `Duration::ZERO` disables expiry.
    pub fn set_time_to_live(&self, ttl: Duration) {
        self.shared.settings.write().ttl = (!ttl.is_zero()).then_some(ttl);
    }

    /// Caps the number of entries. `0` means unbounded.
    pub fn set_max_entries(&self, max_entries: usize) {
        self.shared.settings.write().max_entries = max_entries;
    }

    /// Sets how far a stale entry's heartbeat is pushed forward when a
    /// background refresh is triggered.
    pub fn set_refresh_grace(&self, grace: Duration) {
        self.shared.settings.write().refresh_grace = grace;
    }

    /// Installs the loader used on misses and for background refreshes.
    pub fn set_loader(&self, loader: impl Loader<K, V>) {
        self.shared.settings.write().loader = Some(Arc::new(loader));
    }

    /// Removes the loader; misses then report [`CacheError::NotFound`].
    pub fn clear_loader(&self) {
        self.shared.settings.write().loader = None;
    }

    // == Sweep Interval ==
    /// Starts the expiration sweeper, or retunes a running one.
    ///
    /// Intervals below [`MIN_SWEEP_INTERVAL`] are ignored. Returns a handle
    /// only when a new sweeper task was started; the owner should call
    /// [`SweepHandle::stop`] when the cache is discarded.
    pub fn set_sweep_interval(&self, interval: Duration) -> Option<SweepHandle> {
        if interval < MIN_SWEEP_INTERVAL {
            warn!(
                ?interval,
                minimum = ?MIN_SWEEP_INTERVAL,
                "Sweep interval below minimum, ignoring"
            );
            return None;
        }
        self.shared.settings.write().sweep_interval = Some(interval);

        let mut sweeper = self.shared.sweeper.lock();
        if sweeper.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!(?interval, "Retuned running sweeper");
            return None;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("No Tokio runtime available, sweeper not started");
                return None;
            }
        };
        let handle = spawn_sweeper(&runtime, Arc::downgrade(&self.shared));
        *sweeper = Some(handle.abort_handle());
        Some(SweepHandle::new(handle))
    }

    // == Get ==
    /// Looks up a key.
    ///
    /// - Fresh hit: returns the value.
    /// - Miss: runs the loader through the coalescing group, or returns
    ///   [`CacheError::NotFound`] without one.
    /// - Stale hit without a loader: returns [`CacheError::Stale`] carrying
    ///   the last value.
    /// - Stale hit with a loader: returns the stale value immediately and
    ///   triggers at most one background refresh per grace window.
    pub async fn get(&self, key: &K) -> Result<V> {
        let settings = self.shared.settings();

        let lookup = {
            let store = self.shared.store.read().await;
            let now = Instant::now();
            store
                .read(key)
                .map(|entry| (entry.value.clone(), entry.is_stale(settings.ttl, now)))
        };

        let Some((value, stale)) = lookup else {
            self.shared.stats.record_miss();
            return match settings.loader {
                Some(loader) => Ok(self.shared.load(key, loader).await?),
                None => Err(CacheError::NotFound),
            };
        };

        if !stale {
            self.shared.stats.record_hit();
            if settings.max_entries > 0 {
                self.shared.store.write().await.touch(key);
            }
            return Ok(value);
        }

        self.shared.stats.record_stale_hit();
        let Some(loader) = settings.loader else {
            return Err(CacheError::Stale(value));
        };

        let claimed = self.shared.store.write().await.extend_if_stale(
            key,
            settings.ttl,
            settings.refresh_grace,
            Instant::now(),
        );
        if claimed {
            self.spawn_refresh(key.clone(), loader);
        }
        Ok(value)
    }

    /// Same as [`Cache::get`], reported as a value/status pair.
    ///
    /// A stale hit without a loader yields the stale value with a failure status.
    pub async fn get_with_status(&self, key: &K) -> (Option<V>, i32) {
        match self.get(key).await {
            Ok(value) => (Some(value), STATUS_SUCCESS),
            Err(err) => {
                let status = err.status();
                (err.into_stale(), status)
            }
        }
    }

    fn spawn_refresh(&self, key: K, loader: Arc<dyn Loader<K, V>>) {
        debug!("Triggering background refresh of stale entry");
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            if let Err(err) = shared.load(&key, loader).await {
                warn!(%err, "Background refresh failed, keeping stale value");
            }
        });
    }

    // == Put ==
    /// Writes a value with a fresh heartbeat, evicting the LRU entry if over capacity.
    pub async fn put(&self, key: K, value: V) {
        self.shared.write(key, value).await;
    }

    // == Delete ==
    /// Removes a key if present.
    pub async fn delete(&self, key: &K) {
        let mut store = self.shared.store.write().await;
        store.delete(key);
        self.shared.len.store(store.len(), Ordering::Relaxed);
    }

    // == Clear ==
    /// Empties the cache.
    pub async fn clear(&self) {
        let mut store = self.shared.store.write().await;
        store.clear();
        self.shared.len.store(0, Ordering::Relaxed);
    }

    // == Length ==
    /// Returns the entry count.
    ///
    /// Advisory: read without the store lock, so it may lag concurrent writes.
    pub fn len(&self) -> usize {
        self.shared.len.load(Ordering::Relaxed)
    }

    /// Returns true if the cache holds no entries; as advisory as [`Cache::len`].
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Keys ==
    /// Keys from most to least recently used.
    pub async fn keys(&self) -> Vec<K> {
        self.shared.store.read().await.keys()
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.shared.stats.snapshot(self.len())
    }

    // == Sweep ==
    /// Runs one expiration sweep immediately, returning the number of entries removed.
    pub async fn sweep(&self) -> usize {
        self.shared.clear_expired().await
    }

    #[cfg(test)]
    pub(crate) async fn assert_consistent(&self) {
        let store = self.shared.store.read().await;
        store.assert_consistent();
        assert_eq!(store.len(), self.len());
    }
}
