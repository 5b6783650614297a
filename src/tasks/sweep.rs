//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::cache::SharedCache;

// == Sweep Handle ==
/// Owns a running sweep task.
///
/// `stop` signals the task and waits for it to finish. Dropping the handle
/// detaches the task, which then keeps sweeping for the life of the runtime.
#[derive(Debug)]
pub struct SweepHandle {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Signals the task to stop after its current cycle and joins it.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        if let Err(e) = self.task.await {
            warn!("Sweep task ended abnormally: {}", e);
        }
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The first sweep runs one `interval` after the task starts. Each cycle
/// takes the cache lock, removes entries in increasing expiry order until the
/// first live one, and releases the lock. A cycle that panics is logged and
/// the next cycle runs on schedule.
///
/// Must be called from within a tokio runtime.
///
/// # Example
/// ```ignore
/// let cache = SharedCache::<String>::with_defaults();
/// let sweeper = spawn_sweep_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweeper.stop().await;
/// ```
pub fn spawn_sweep_task<V: Send + 'static>(
    cache: SharedCache<V>,
    interval: Duration,
) -> SweepHandle {
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        info!("Starting TTL sweep task with interval of {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        // Set once the handle is dropped without stopping
        let mut detached = false;

        loop {
            tokio::select! {
                signal = &mut stop_rx, if !detached => match signal {
                    Ok(()) => break,
                    Err(_) => {
                        debug!("Sweep handle dropped; sweep task detached");
                        detached = true;
                    }
                },
                _ = ticker.tick() => {
                    run_guarded(|| cache.sweep_expired());
                }
            }
        }

        info!("TTL sweep task stopped");
    });

    SweepHandle { stop_tx, task }
}

/// Runs one sweep cycle, containing any panic it raises.
fn run_guarded<F: FnOnce() -> usize>(cycle: F) -> Option<usize> {
    match panic::catch_unwind(AssertUnwindSafe(cycle)) {
        Ok(removed) => {
            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
            Some(removed)
        }
        Err(_) => {
            error!("TTL sweep cycle panicked; retrying on the next tick");
            None
        }
    }
}
