//! Expiry Index Module
//!
//! Orders live keys by expiry instant so the sweep only visits expired entries.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::cache::ExpirySlot;

// == Expiry Index ==
/// Keys ordered by `(expiry instant, write stamp)`, earliest first.
#[derive(Debug, Default)]
pub struct ExpiryIndex {
    by_expiry: BTreeMap<ExpirySlot, String>,
}

impl ExpiryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` at `slot`.
    pub fn insert(&mut self, slot: ExpirySlot, key: String) {
        self.by_expiry.insert(slot, key);
    }

    /// Drops the record at `slot`, returning its key.
    pub fn remove(&mut self, slot: ExpirySlot) -> Option<String> {
        self.by_expiry.remove(&slot)
    }

    /// Returns the key recorded at `slot`.
    pub fn get(&self, slot: ExpirySlot) -> Option<&str> {
        self.by_expiry.get(&slot).map(String::as_str)
    }

    // == Earliest ==
    /// Returns the earliest expiry instant and its key.
    pub fn peek_earliest(&self) -> Option<(Instant, &str)> {
        self.by_expiry
            .first_key_value()
            .map(|((expires_at, _), key)| (*expires_at, key.as_str()))
    }

    /// Removes and returns the earliest key if it has expired at `now`.
    ///
    /// Returns None once the earliest remaining entry is still live.
    pub fn pop_expired(&mut self, now: Instant) -> Option<String> {
        let expired = self
            .peek_earliest()
            .is_some_and(|(expires_at, _)| expires_at <= now);
        if !expired {
            return None;
        }
        self.by_expiry.pop_first().map(|(_, key)| key)
    }

    pub fn len(&self) -> usize {
        self.by_expiry.len()
    }

    pub fn clear(&mut self) {
        self.by_expiry.clear();
    }
}
