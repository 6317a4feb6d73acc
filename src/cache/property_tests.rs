//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the entry store against a simple recency model.

use proptest::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::CacheStore;

// == Strategies ==
/// Small key space so operations collide often
fn key_strategy() -> impl Strategy<Value = u8> {
    0u8..16
}

#[derive(Debug, Clone)]
enum StoreOp {
    Write { key: u8, value: u32 },
    Touch { key: u8 },
    Delete { key: u8 },
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        3 => (key_strategy(), any::<u32>()).prop_map(|(key, value)| StoreOp::Write { key, value }),
        1 => key_strategy().prop_map(|key| StoreOp::Touch { key }),
        1 => key_strategy().prop_map(|key| StoreOp::Delete { key }),
    ]
}

/// Reference model: front of the deque is most recently used.
#[derive(Default)]
struct Model {
    order: VecDeque<u8>,
    values: HashMap<u8, u32>,
}

impl Model {
    fn promote(&mut self, key: u8) {
        self.order.retain(|k| *k != key);
        self.order.push_front(key);
    }

    fn write(&mut self, key: u8, value: u32, max_entries: usize) -> Option<u8> {
        self.values.insert(key, value);
        self.promote(key);
        if max_entries > 0 && self.values.len() > max_entries {
            let evicted = self.order.pop_back()?;
            self.values.remove(&evicted);
            return Some(evicted);
        }
        None
    }

    fn touch(&mut self, key: u8) -> bool {
        if self.values.contains_key(&key) {
            self.promote(key);
            true
        } else {
            false
        }
    }

    fn delete(&mut self, key: u8) -> Option<u32> {
        self.order.retain(|k| *k != key);
        self.values.remove(&key)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Every operation sequence leaves the store agreeing with the model on
    // contents, recency order, and evicted keys; map and list stay 1:1.
    #[test]
    fn prop_store_matches_lru_model(
        max_entries in 0usize..8,
        ops in prop::collection::vec(store_op_strategy(), 1..100)
    ) {
        let now = Instant::now();
        let mut store = CacheStore::new();
        let mut model = Model::default();

        for op in ops {
            match op {
                StoreOp::Write { key, value } => {
                    let evicted = store.write(key, value, now, max_entries);
                    prop_assert_eq!(evicted, model.write(key, value, max_entries));
                }
                StoreOp::Touch { key } => {
                    prop_assert_eq!(store.touch(&key), model.touch(key));
                }
                StoreOp::Delete { key } => {
                    prop_assert_eq!(store.delete(&key), model.delete(key));
                }
            }
            store.assert_consistent();
        }

        prop_assert_eq!(store.keys(), model.order.iter().copied().collect::<Vec<_>>());
        for (key, value) in &model.values {
            prop_assert_eq!(store.read(key).map(|e| e.value), Some(*value));
        }
    }

    // Inserting M + K distinct keys into a store capped at M keeps exactly the
    // M most recently written keys.
    #[test]
    fn prop_capacity_keeps_most_recent(
        max_entries in 1usize..20,
        extra in 1usize..20
    ) {
        let now = Instant::now();
        let mut store = CacheStore::new();
        let total = max_entries + extra;

        for key in 0..total {
            store.write(key, key, now, max_entries);
            prop_assert!(store.len() <= max_entries);
        }

        prop_assert_eq!(store.len(), max_entries);
        for key in 0..extra {
            prop_assert!(store.read(&key).is_none(), "key {} should be evicted", key);
        }
        for key in extra..total {
            prop_assert!(store.read(&key).is_some(), "key {} should remain", key);
        }
    }

    // A sweep removes exactly the entries whose heartbeat + ttl is past.
    #[test]
    fn prop_clear_expired_removes_only_stale(
        ages in prop::collection::vec(0u64..10, 1..30),
        ttl_secs in 1u64..10
    ) {
        let base = Instant::now();
        let now = base + Duration::from_secs(10);
        let ttl = Some(Duration::from_secs(ttl_secs));
        let mut store = CacheStore::new();

        for (key, age) in ages.iter().enumerate() {
            store.write(key, *age, now - Duration::from_secs(*age), 0);
        }

        let expected_stale = ages.iter().filter(|age| **age > ttl_secs).count();
        prop_assert_eq!(store.clear_expired(ttl, now), expected_stale);
        prop_assert_eq!(store.len(), ages.len() - expected_stale);
        store.assert_consistent();
    }
}
