//! TTL LRU Cache - demonstration driver
//!
//! Walks through the cache contract: basic set/get, TTL expiry, LRU eviction,
//! recency refresh and the background sweep.

use std::time::Duration;

use anyhow::ensure;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_lru_cache::{CacheConfig, CacheError, SharedCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_lru_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::default().with_sweep_interval(Duration::from_secs(1));
    info!(
        "Configuration: capacity={}, sweep_interval={:?}, default_ttl={:?}",
        config.capacity, config.sweep_interval, config.default_ttl
    );

    let cache: SharedCache<String> = SharedCache::new(config)?;
    let sweeper = cache.spawn_sweeper();

    // Basic set/get
    cache.set("user", "kevin".to_string(), Duration::from_secs(1))?;
    ensure!(cache.get("user").as_deref() == Some("kevin"), "basic set/get");
    info!("Basic set/get works");

    // TTL expiry
    tokio::time::sleep(Duration::from_millis(1500)).await;
    ensure!(cache.get("user").is_none(), "entry should have expired");
    info!("TTL expiry works");

    // LRU eviction
    for key in ["a", "b", "c", "d"] {
        cache.set_default(key, key.to_uppercase())?;
    }
    ensure!(!cache.contains_key("a"), "a should have been evicted");
    info!("LRU eviction works");

    // Access order
    cache.get("b");
    cache.set_default("e", "E".to_string())?;
    ensure!(!cache.contains_key("c"), "c should have been evicted");
    ensure!(cache.contains_key("b"), "b was refreshed and should survive");
    info!("Access order maintained: {:?}", cache.keys_by_recency());

    // Invalid TTL
    ensure!(
        matches!(
            cache.set_secs("bad", "x".to_string(), -5),
            Err(CacheError::InvalidArgument(_))
        ),
        "negative TTL must be rejected"
    );
    info!("Invalid TTL rejected");

    // Background sweep
    cache.set("temp", "123".to_string(), Duration::from_millis(500))?;
    tokio::time::sleep(Duration::from_millis(2500)).await;
    ensure!(!cache.contains_key("temp"), "sweep should have removed temp");
    info!("Background sweep removes expired keys");

    sweeper.stop().await;
    info!("All checks passed");
    Ok(())
}
