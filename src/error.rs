//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::fmt;

use thiserror::Error;

// == Status Codes ==
/// Status reported for a successful lookup or load.
pub const STATUS_SUCCESS: i32 = 0;

/// Generic failure status (not found, stale without a loader, abandoned load).
pub const STATUS_FAILURE: i32 = -1;

// == Load Error ==
/// Failure reported by a loader, or by the coalescing group on its behalf.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The loader ran and returned a non-success status
    #[error("loader failed with status {status}")]
    Failed { status: i32 },

    /// The leading load was cancelled or panicked before producing a result
    #[error("in-flight load was abandoned")]
    Abandoned,
}

impl LoadError {
    /// Creates a failure carrying the loader's own status code.
    pub fn failed(status: i32) -> Self {
        LoadError::Failed { status }
    }

    /// Returns the status code this failure surfaces to callers.
    pub fn status(&self) -> i32 {
        match self {
            LoadError::Failed { status } => *status,
            LoadError::Abandoned => STATUS_FAILURE,
        }
    }
}

// == Cache Error Enum ==
/// Unified error type for cache lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError<V: fmt::Debug> {
    /// Key not present and no loader configured
    #[error("key not found")]
    NotFound,

    /// Key present but expired and no loader configured; carries the last good value
    #[error("entry is stale")]
    Stale(V),

    /// Loader invoked on a miss and did not succeed
    #[error(transparent)]
    Loader(#[from] LoadError),
}

impl<V: fmt::Debug> CacheError<V> {
    /// Returns the numeric status for this error.
    ///
    /// Loader statuses pass through unchanged; every other failure is
    /// [`STATUS_FAILURE`].
    pub fn status(&self) -> i32 {
        match self {
            CacheError::NotFound | CacheError::Stale(_) => STATUS_FAILURE,
            CacheError::Loader(err) => err.status(),
        }
    }

    /// Recovers the degraded value carried by a stale hit.
    pub fn into_stale(self) -> Option<V> {
        match self {
            CacheError::Stale(value) => Some(value),
            _ => None,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache lookups.
pub type Result<V> = std::result::Result<V, CacheError<V>>;
