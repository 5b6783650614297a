//! Cache Store Module
//!
//! Cache state machine combining the recency-ordered entry list with the expiry
//! index. Not synchronized: `SharedCache` wraps it in the engine lock.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::{CacheEntry, ExpiryIndex, LruList, Ttl};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Cache storage with LRU eviction and TTL expiry.
///
/// Every live key has exactly one node in the recency list and exactly one
/// record in the expiry index. Operations come in pairs: the plain form reads
/// the clock, the `_at` form takes the current instant explicitly.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Entries in recency order
    lru: LruList<V>,
    /// Keys in expiry order
    expiry: ExpiryIndex,
    /// Maximum number of entries allowed
    capacity: usize,
    /// TTL used by `set_default`
    default_ttl: Ttl,
    /// Next write stamp
    next_seq: u64,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with the given capacity and default TTL.
    pub fn new(capacity: usize, default_ttl: Duration) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidArgument(
                "Capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            lru: LruList::with_capacity(capacity),
            expiry: ExpiryIndex::new(),
            capacity,
            default_ttl: Ttl::new(default_ttl)?,
            next_seq: 0,
        })
    }

    /// Creates a CacheStore from a validated configuration.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.capacity, config.default_ttl)
    }

    // == Get ==
    /// Retrieves a value by key and marks it most recently used.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<&V> {
        let expired = self.lru.get(key)?.is_expired_at(now);
        if expired {
            self.remove_entry(key);
            debug!(key, "Lazily expired entry on read");
            return None;
        }

        self.lru.touch(key);
        self.lru.get(key).map(|entry| &entry.value)
    }

    pub fn get(&mut self, key: &str) -> Option<&V> {
        self.get_at(key, Instant::now())
    }

    // == Set ==
    /// Stores a key-value pair expiring `ttl` after `now`.
    ///
    /// Overwriting an existing key replaces its value and expiry in place.
    /// Inserting a new key into a full store first evicts the least recently
    /// used entry, whether or not that entry has expired.
    pub fn set_at(&mut self, key: String, value: V, ttl: Ttl, now: Instant) -> Result<()> {
        let expires_at = ttl.expires_from(now)?;

        match self.lru.get(&key) {
            Some(existing) => {
                self.expiry.remove(existing.expiry_slot());
            }
            None if self.lru.len() >= self.capacity => self.evict_oldest(),
            None => {}
        }

        let entry = CacheEntry::new(value, expires_at, self.next_seq);
        self.next_seq += 1;
        self.expiry.insert(entry.expiry_slot(), key.clone());
        self.lru.insert(key, entry);
        Ok(())
    }

    pub fn set(&mut self, key: String, value: V, ttl: Ttl) -> Result<()> {
        self.set_at(key, value, ttl, Instant::now())
    }

    /// Stores a key-value pair with the default TTL.
    pub fn set_default(&mut self, key: String, value: V) -> Result<()> {
        let ttl = self.default_ttl;
        self.set(key, value, ttl)
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether an entry was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key).is_some()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.lru.clear();
        self.expiry.clear();
    }

    // == Sweep Expired ==
    /// Removes entries in increasing expiry order until the first live one.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired_at(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        while let Some(key) = self.expiry.pop_expired(now) {
            self.lru.remove(&key);
            removed += 1;
        }
        removed
    }

    pub fn sweep_expired(&mut self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    // == Inspection ==
    /// Returns the number of stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl.as_duration()
    }

    /// Checks raw presence without touching recency or expiring anything.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lru.contains(key)
    }

    /// Returns the stored keys from least to most recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.lru.iter().map(|(key, _)| key.to_string()).collect()
    }

    /// Returns the remaining TTL of a stored entry at `now`.
    pub fn ttl_remaining_at(&self, key: &str, now: Instant) -> Option<Duration> {
        self.lru.get(key).map(|entry| entry.ttl_remaining_at(now))
    }

    // == Invariants ==
    /// Verifies that the recency list and expiry index describe the same keys
    /// and that the store is within capacity.
    pub fn check_invariants(&self) -> Result<()> {
        self.lru.verify()?;

        if self.lru.len() > self.capacity {
            return Err(CacheError::Internal(format!(
                "{} entries exceed capacity {}",
                self.lru.len(),
                self.capacity
            )));
        }
        if self.lru.len() != self.expiry.len() {
            return Err(CacheError::Internal(format!(
                "{} entries but {} expiry records",
                self.lru.len(),
                self.expiry.len()
            )));
        }
        for (key, entry) in self.lru.iter() {
            if self.expiry.get(entry.expiry_slot()) != Some(key) {
                return Err(CacheError::Internal(format!(
                    "key '{}' has no matching expiry record",
                    key
                )));
            }
        }
        Ok(())
    }

    // == Internal ==
    fn evict_oldest(&mut self) {
        if let Some((key, entry)) = self.lru.pop_oldest() {
            self.expiry.remove(entry.expiry_slot());
            debug!(key = %key, "Evicted least recently used entry");
        }
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.lru.remove(key)?;
        self.expiry.remove(entry.expiry_slot());
        Some(entry)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn ttl(secs: i64) -> Ttl {
        Ttl::from_secs(secs).unwrap()
    }

    fn store(capacity: usize) -> CacheStore<String> {
        CacheStore::new(capacity, Duration::from_secs(60)).unwrap()
    }

    fn set(store: &mut CacheStore<String>, key: &str, value: &str, secs: i64, now: Instant) {
        store
            .set_at(key.to_string(), value.to_string(), ttl(secs), now)
            .unwrap();
    }

    #[test]
    fn test_store_new() {
        let store = store(3);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 3);
        assert_eq!(store.default_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_store_rejects_invalid_construction() {
        assert!(matches!(
            CacheStore::<String>::new(0, Duration::from_secs(60)),
            Err(CacheError::InvalidArgument(_))
        ));
        assert!(matches!(
            CacheStore::<String>::new(3, Duration::ZERO),
            Err(CacheError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(3);
        let now = Instant::now();

        set(&mut store, "key1", "value1", 60, now);

        assert_eq!(store.get_at("key1", now), Some(&"value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store(3);
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store(3);
        let now = Instant::now();

        set(&mut store, "key1", "value1", 60, now);

        assert!(store.delete("key1"));
        assert!(store.is_empty());
        assert_eq!(store.get_at("key1", now), None);
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn test_store_delete_nonexistent_is_noop() {
        let mut store = store(3);
        assert!(!store.delete("nonexistent"));
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store(3);
        let now = Instant::now();

        set(&mut store, "key1", "value1", 10, now);
        set(&mut store, "key1", "value2", 100, now);

        assert_eq!(store.get_at("key1", now), Some(&"value2".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.ttl_remaining_at("key1", now),
            Some(Duration::from_secs(100))
        );
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn test_store_overwrite_when_full_does_not_evict() {
        let mut store = store(3);
        let now = Instant::now();

        set(&mut store, "a", "A", 60, now);
        set(&mut store, "b", "B", 60, now);
        set(&mut store, "c", "C", 60, now);
        set(&mut store, "a", "A2", 60, now);

        assert_eq!(store.len(), 3);
        assert_eq!(store.keys_by_recency(), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_store_ttl_lazy_expiration() {
        let mut store = store(3);
        let now = Instant::now();

        set(&mut store, "x", "v", 1, now);

        assert!(store.get_at("x", now).is_some());
        assert_eq!(store.get_at("x", now + Duration::from_secs(1)), None);
        assert!(!store.contains_key("x"));
        assert!(store.is_empty());
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(3);
        let now = Instant::now();

        set(&mut store, "key1", "value1", 60, now);
        set(&mut store, "key2", "value2", 60, now);
        set(&mut store, "key3", "value3", 60, now);

        // Store is full, adding key4 should evict key1 (oldest)
        set(&mut store, "key4", "value4", 60, now);

        assert_eq!(store.len(), 3);
        assert!(!store.contains_key("key1"));
        assert_eq!(store.keys_by_recency(), vec!["key2", "key3", "key4"]);
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = store(3);
        let now = Instant::now();

        set(&mut store, "a", "A", 60, now);
        set(&mut store, "b", "B", 60, now);
        set(&mut store, "c", "C", 60, now);

        // Access a to make it most recently used
        assert!(store.get_at("a", now).is_some());

        // Adding d should evict b (now oldest)
        set(&mut store, "d", "D", 60, now);

        assert!(store.contains_key("a"));
        assert!(!store.contains_key("b"));
    }

    #[test]
    fn test_store_eviction_ignores_expiry_of_others() {
        let mut store = store(2);
        let now = Instant::now();

        // "old" is least recent but lives longest; "short" has already expired
        set(&mut store, "old", "1", 600, now);
        set(&mut store, "short", "2", 1, now);

        set(&mut store, "new", "3", 60, now + Duration::from_secs(5));

        assert!(!store.contains_key("old"));
        assert!(store.contains_key("short"));
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn test_store_get_does_not_refresh_expiry() {
        let mut store = store(3);
        let now = Instant::now();

        set(&mut store, "k", "v", 10, now);
        assert!(store.get_at("k", now + Duration::from_secs(9)).is_some());

        assert_eq!(store.get_at("k", now + Duration::from_secs(10)), None);
    }

    #[test]
    fn test_store_sweep_expired() {
        let mut store = store(5);
        let now = Instant::now();

        set(&mut store, "key1", "value1", 1, now);
        set(&mut store, "key2", "value2", 10, now);
        set(&mut store, "key3", "value3", 2, now);

        let removed = store.sweep_expired_at(now + Duration::from_secs(2));
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert!(store.contains_key("key2"));
        assert!(store.check_invariants().is_ok());

        assert_eq!(store.sweep_expired_at(now + Duration::from_secs(2)), 0);
    }

    #[test]
    fn test_store_sweep_sees_overwritten_expiry() {
        let mut store = store(3);
        let now = Instant::now();

        set(&mut store, "k", "short", 1, now);
        set(&mut store, "k", "long", 100, now);

        assert_eq!(store.sweep_expired_at(now + Duration::from_secs(5)), 0);
        assert_eq!(
            store.get_at("k", now + Duration::from_secs(5)),
            Some(&"long".to_string())
        );
    }

    #[test]
    fn test_store_clear() {
        let mut store = store(3);
        let now = Instant::now();

        set(&mut store, "a", "A", 60, now);
        set(&mut store, "b", "B", 60, now);
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.sweep_expired_at(now + Duration::from_secs(120)), 0);
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn test_store_set_default_uses_configured_ttl() {
        let mut store = CacheStore::new(3, Duration::from_secs(30)).unwrap();

        store.set_default("k".to_string(), 1u32).unwrap();

        let remaining = store.ttl_remaining_at("k", Instant::now()).unwrap();
        assert!(remaining <= Duration::from_secs(30));
        assert!(remaining > Duration::from_secs(25));
    }

    #[test]
    fn test_store_rejected_ttl_leaves_state_unchanged() {
        let mut store = store(1);
        let now = Instant::now();
        set(&mut store, "a", "A", 60, now);

        let huge = Ttl::new(Duration::MAX).unwrap();
        let result = store.set_at("b".to_string(), "B".to_string(), huge, now);

        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
        assert_eq!(store.keys_by_recency(), vec!["a"]);
        assert!(store.check_invariants().is_ok());
    }
}
