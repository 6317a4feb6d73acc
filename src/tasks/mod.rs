//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - Expiration Sweeper: Removes expired cache entries at a configured interval

mod sweeper;

pub(crate) use sweeper::spawn_sweeper;
pub use sweeper::SweepHandle;
