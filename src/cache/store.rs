//! Cache Store Module
//!
//! Entry store combining HashMap lookup with an LRU order list and heartbeat expiry.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::cache::lru::{LruList, NodeId};
use crate::cache::CacheEntry;

// == Cache Store ==
/// Map from key to a node in the LRU list; the node owns the entry.
///
/// The map and the list are kept in 1:1 correspondence by every method.
/// The store is not synchronized; the cache facade wraps it in a lock.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key to list node
    index: HashMap<K, NodeId>,
    /// Entries in recency order
    order: LruList<CacheEntry<K, V>>,
}

impl<K, V> Default for CacheStore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            order: LruList::new(),
        }
    }

    // == Read ==
    /// Looks up an entry without changing its recency.
    pub fn read(&self, key: &K) -> Option<&CacheEntry<K, V>> {
        let id = self.index.get(key)?;
        self.order.get(*id)
    }

    // == Write ==
    /// Stores a value, resetting its heartbeat to `now` and moving it to the front.
    ///
    /// If `max_entries` is positive and the store grew past it, the single
    /// back-most entry is evicted and its key returned.
    pub fn write(&mut self, key: K, value: V, now: Instant, max_entries: usize) -> Option<K> {
        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.order.get_mut(id) {
                entry.refresh(value, now);
            }
            self.order.move_to_front(id);
        } else {
            let id = self
                .order
                .push_front(CacheEntry::new(key.clone(), value, now));
            self.index.insert(key, id);
        }

        if max_entries > 0 && self.index.len() > max_entries {
            return self.evict_back();
        }
        None
    }

    // == Touch ==
    /// Marks a key as most recently used. Returns false if the key is absent.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&id) => self.order.move_to_front(id),
            None => false,
        }
    }

    // == Extend If Stale ==
    /// Re-checks staleness and, if the entry is still past its TTL, keeps it
    /// fresh until `now + grace`.
    ///
    /// Returns true when this call claimed the refresh.
    pub fn extend_if_stale(
        &mut self,
        key: &K,
        ttl: Option<Duration>,
        grace: Duration,
        now: Instant,
    ) -> bool {
        let (Some(&id), Some(ttl)) = (self.index.get(key), ttl) else {
            return false;
        };
        match self.order.get_mut(id) {
            Some(entry) if entry.is_stale(Some(ttl), now) => {
                entry.claim_refresh(ttl, grace, now);
                true
            }
            _ => false,
        }
    }

    // == Delete ==
    /// Removes an entry by key, returning its value if it was present.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.order.remove(id).map(|entry| entry.value)
    }

    // == Clear ==
    /// Empties both the map and the order list.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }

    // == Clear Expired ==
    /// Removes every entry whose `heartbeat + ttl` is before `now`.
    ///
    /// Returns the number of entries removed. A store without TTL never expires anything.
    pub fn clear_expired(&mut self, ttl: Option<Duration>, now: Instant) -> usize {
        if ttl.is_none() {
            return 0;
        }

        let expired: Vec<NodeId> = self
            .order
            .iter()
            .filter(|(_, entry)| entry.is_stale(ttl, now))
            .map(|(id, _)| id)
            .collect();

        let count = expired.len();
        for id in expired {
            if let Some(entry) = self.order.remove(id) {
                self.index.remove(&entry.key);
            }
        }
        count
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Keys ==
    /// Keys from most to least recently touched.
    pub fn keys(&self) -> Vec<K> {
        self.order.iter().map(|(_, entry)| entry.key.clone()).collect()
    }

    fn evict_back(&mut self) -> Option<K> {
        let entry = self.order.pop_back()?;
        self.index.remove(&entry.key);
        debug!(remaining = self.index.len(), "Evicted least recently used entry");
        Some(entry.key)
    }

    /// Asserts that the map and list agree on membership and size.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.index.len(), self.order.len());
        for (id, entry) in self.order.iter() {
            assert_eq!(self.index.get(&entry.key), Some(&id));
        }
    }
}
