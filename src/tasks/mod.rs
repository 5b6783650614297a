//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a cache.
//!
//! # Tasks
//! - TTL Sweep: Removes expired cache entries at the configured interval

mod sweep;

pub use sweep::{spawn_sweep_task, SweepHandle};
