//! TTL LRU Cache - A bounded, thread-safe in-memory cache
//!
//! Combines capacity-driven LRU eviction with per-entry TTL expiry and a
//! background sweep that proactively removes expired entries.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{SharedCache, Ttl};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::{spawn_sweep_task, SweepHandle};
