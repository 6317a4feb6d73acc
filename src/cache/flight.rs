//! Load Coalescing Module
//!
//! Ensures at most one loader invocation per key is in flight; concurrent
//! callers for the same key wait for that invocation and share its outcome.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

use crate::error::LoadError;

/// Outcome shared between the leading caller and every waiter.
pub type LoadOutcome<V> = Result<V, LoadError>;

type CallReceiver<V> = watch::Receiver<Option<LoadOutcome<V>>>;

// == Load Group ==
/// Tracks in-flight loads by key.
///
/// The call map has its own lock, independent of the store lock, and that
/// lock is never held across an await.
#[derive(Debug)]
pub struct LoadGroup<K, V> {
    calls: Mutex<HashMap<K, CallReceiver<V>>>,
}

impl<K, V> Default for LoadGroup<K, V> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }
}

enum Role<V> {
    Leader(watch::Sender<Option<LoadOutcome<V>>>),
    Waiter(CallReceiver<V>),
}

impl<K, V> LoadGroup<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a group with no loads in flight.
    pub fn new() -> Self {
        Self::default()
    }

    // == Resolve ==
    /// Runs `load` for `key` unless a load for the same key is already in
    /// flight, in which case the caller waits for that load's outcome.
    ///
    /// `load` is only invoked by the leading caller. It should include any
    /// write-back, since waiters are released only after it completes.
    pub async fn resolve<F, Fut>(&self, key: &K, load: F) -> LoadOutcome<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = LoadOutcome<V>>,
    {
        let role = {
            let mut calls = self.calls.lock();
            match calls.get(key) {
                Some(rx) => Role::Waiter(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    calls.insert(key.clone(), rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Waiter(rx) => Self::wait(rx).await,
            Role::Leader(tx) => {
                let _guard = CallGuard { group: self, key };
                let outcome = load().await;
                tx.send_replace(Some(outcome.clone()));
                outcome
            }
        }
    }

    /// Returns the number of loads currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }

    async fn wait(mut rx: CallReceiver<V>) -> LoadOutcome<V> {
        match rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone().unwrap_or(Err(LoadError::Abandoned)),
            // Leader dropped without publishing: cancelled or panicked
            Err(_) => Err(LoadError::Abandoned),
        }
    }
}

/// Removes the call entry once the leader finishes, is cancelled, or panics.
struct CallGuard<'a, K, V>
where
    K: Eq + Hash,
{
    group: &'a LoadGroup<K, V>,
    key: &'a K,
}

impl<K, V> Drop for CallGuard<'_, K, V>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        if self.group.calls.lock().remove(self.key).is_none() {
            debug!("In-flight load entry already removed");
        }
    }
}
