//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and the validated TTL type.

use std::time::{Duration, Instant};

use tracing::warn;

use crate::error::{CacheError, Result};

/// Position of an entry in the expiry index: expiry instant plus an insertion
/// stamp that keeps entries with identical instants distinct.
pub type ExpirySlot = (Instant, u64);

// == TTL ==
/// A strictly positive time-to-live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ttl(Duration);

impl Ttl {
    /// Validates a TTL given as a duration.
    pub fn new(ttl: Duration) -> Result<Self> {
        if ttl.is_zero() {
            warn!("Rejected zero TTL");
            return Err(CacheError::InvalidArgument(
                "TTL must be a positive duration".to_string(),
            ));
        }
        Ok(Self(ttl))
    }

    /// Validates a TTL given in signed seconds.
    ///
    /// Zero and negative values are rejected.
    pub fn from_secs(secs: i64) -> Result<Self> {
        if secs <= 0 {
            warn!(ttl_secs = secs, "Rejected non-positive TTL");
            return Err(CacheError::InvalidArgument(format!(
                "TTL must be a positive number of seconds, got {}",
                secs
            )));
        }
        Ok(Self(Duration::from_secs(secs.unsigned_abs())))
    }

    /// Returns the wrapped duration.
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Computes the expiry instant for an entry written at `now`.
    pub fn expires_from(&self, now: Instant) -> Result<Instant> {
        now.checked_add(self.0).ok_or_else(|| {
            CacheError::InvalidArgument(format!("TTL of {:?} is out of range", self.0))
        })
    }
}

// == Cache Entry ==
/// Represents a single cache entry with its value and expiry instant.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Instant at which the entry stops being served
    pub expires_at: Instant,
    /// Write stamp, unique per store
    seq: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    pub fn new(value: V, expires_at: Instant, seq: u64) -> Self {
        Self {
            value,
            expires_at,
            seq,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry whose expiry instant equals `now` is
    /// already expired.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining TTL at `now`, zero once expired.
    pub fn ttl_remaining_at(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }

    /// Key of this entry in the expiry index.
    pub fn expiry_slot(&self) -> ExpirySlot {
        (self.expires_at, self.seq)
    }
}
