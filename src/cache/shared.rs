//! Shared Cache Module
//!
//! Thread-safe handle over a `CacheStore`. Every operation, reads included,
//! runs under one exclusive lock because lookups reorder recency and may
//! expire entries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::cache::{CacheStore, Ttl};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::{spawn_sweep_task, SweepHandle};

// == Shared Cache ==
/// Cloneable handle to one cache engine.
///
/// Clones share the same state. Values are cloned out on `get`; wrap large
/// values in an `Arc` if that is too costly.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use ttl_lru_cache::SharedCache;
///
/// let cache = SharedCache::with_defaults();
/// cache.set("user", "kevin".to_string(), Duration::from_secs(3)).unwrap();
/// assert_eq!(cache.get("user"), Some("kevin".to_string()));
///
/// assert!(cache.set_secs("user", "x".to_string(), -5).is_err());
/// assert_eq!(cache.get("user"), Some("kevin".to_string()));
/// ```
#[derive(Debug)]
pub struct SharedCache<V> {
    inner: Arc<Mutex<CacheStore<V>>>,
    sweep_interval: Duration,
}

impl<V> Clone for SharedCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            sweep_interval: self.sweep_interval,
        }
    }
}

impl<V: Clone> SharedCache<V> {
    // == Constructor ==
    /// Creates a cache from a configuration, rejecting non-positive bounds.
    pub fn new(config: CacheConfig) -> Result<Self> {
        let store = CacheStore::from_config(&config)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(store)),
            sweep_interval: config.sweep_interval,
        })
    }

    /// Creates a cache with capacity 3, a 60s sweep interval and a 60s default TTL.
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default()).expect("default configuration is valid")
    }

    // == Get ==
    /// Returns a clone of the value if present and not expired.
    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    // == Set ==
    /// Stores a value that expires `ttl` from now.
    ///
    /// A zero TTL fails with `InvalidArgument` and leaves the cache untouched.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) -> Result<()> {
        let ttl = Ttl::new(ttl)?;
        self.set_ttl(key, value, ttl)
    }

    /// Stores a value with a TTL in signed seconds.
    ///
    /// Zero and negative TTLs fail with `InvalidArgument`.
    pub fn set_secs(&self, key: impl Into<String>, value: V, ttl_secs: i64) -> Result<()> {
        let ttl = Ttl::from_secs(ttl_secs)?;
        self.set_ttl(key, value, ttl)
    }

    /// Stores a value with the configured default TTL.
    pub fn set_default(&self, key: impl Into<String>, value: V) -> Result<()> {
        self.inner.lock().set_default(key.into(), value)
    }

    /// Stores a value with an already validated TTL.
    pub fn set_ttl(&self, key: impl Into<String>, value: V, ttl: Ttl) -> Result<()> {
        self.inner.lock().set(key.into(), value, ttl)
    }
}

impl<V> SharedCache<V> {
    // == Delete ==
    /// Removes a key. Absent keys are ignored.
    pub fn delete(&self, key: &str) {
        self.inner.lock().delete(key);
    }

    // == Clear ==
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    // == Sweep ==
    /// Runs one sweep cycle, returning the number of expired entries removed.
    pub fn sweep_expired(&self) -> usize {
        self.inner.lock().sweep_expired()
    }

    // == Inspection ==
    // None of these refresh recency or expire entries.

    /// Number of stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().contains_key(key)
    }

    /// Stored keys, least recently used first.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.inner.lock().keys_by_recency()
    }

    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.inner.lock().ttl_remaining_at(key, Instant::now())
    }

    /// Verifies that recency order, values and expiry records agree.
    pub fn check_invariants(&self) -> Result<()> {
        self.inner.lock().check_invariants()
    }
}

impl<V: Send + 'static> SharedCache<V> {
    /// Starts the background sweep on the current tokio runtime using the
    /// configured interval.
    ///
    /// The sweep outlives the returned handle unless `stop` is awaited.
    pub fn spawn_sweeper(&self) -> SweepHandle {
        spawn_sweep_task(self.clone(), self.sweep_interval)
    }
}
