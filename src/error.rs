//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
///
/// Absence of a key is never an error: lookups return `Option`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Rejected input, e.g. a zero or negative TTL or a zero capacity
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal bookkeeping is inconsistent (reported by invariant checks only)
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheError::InvalidArgument("TTL must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid argument: TTL must be positive");

        let err = CacheError::Internal("lru out of sync".to_string());
        assert_eq!(err.to_string(), "Internal error: lru out of sync");
    }
}
