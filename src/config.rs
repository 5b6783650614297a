//! Configuration Module
//!
//! Construction-time parameters of the cache engine.

use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default maximum number of live entries.
pub const DEFAULT_CAPACITY: usize = 3;

/// Default period between two background sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Default TTL applied by `set_default`.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Cache configuration parameters.
///
/// Fixed once the cache is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Interval between background sweep runs
    pub sweep_interval: Duration,
    /// TTL for entries stored without an explicit TTL
    pub default_ttl: Duration,
}

impl CacheConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    pub fn with_default_ttl(mut self, default_ttl: Duration) -> Self {
        self.default_ttl = default_ttl;
        self
    }

    // == Validate ==
    /// Checks that every bound is positive.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidArgument(
                "Capacity must be at least 1".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidArgument(
                "Sweep interval must be positive".to_string(),
            ));
        }
        if self.default_ttl.is_zero() {
            return Err(CacheError::InvalidArgument(
                "Default TTL must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            default_ttl: DEFAULT_TTL,
        }
    }
}
