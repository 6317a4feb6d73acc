//! Loader Module
//!
//! The user-supplied capability that populates the cache on a miss or refresh.

use std::future::Future;
use std::pin::Pin;

use crate::error::LoadError;

/// Boxed future returned by a [`Loader`].
pub type LoadFuture<V> = Pin<Box<dyn Future<Output = Result<V, LoadError>> + Send>>;

// == Loader ==
/// Fetches the value for a key from the backing source.
///
/// Failures are reported through [`LoadError`] and are never retried by the
/// cache. Any `Fn(K) -> impl Future<Output = Result<V, LoadError>>` closure
/// implements this trait.
pub trait Loader<K, V>: Send + Sync + 'static {
    fn load(&self, key: K) -> LoadFuture<V>;
}

impl<K, V, F, Fut> Loader<K, V> for F
where
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, LoadError>> + Send + 'static,
{
    fn load(&self, key: K) -> LoadFuture<V> {
        Box::pin(self(key))
    }
}
