//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod expiry;
mod lru;
mod shared;
mod store;


// Re-export public types
pub use entry::{CacheEntry, ExpirySlot, Ttl};
pub use expiry::ExpiryIndex;
pub use lru::LruList;
pub use shared::SharedCache;
pub use store::CacheStore;
