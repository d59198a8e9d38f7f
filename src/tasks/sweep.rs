//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries.
//!
//! Lazy expiry already guarantees correctness (expired entries are never
//! served); the sweep only bounds how long unread expired entries occupy
//! memory. Callers on the lazy strategy never run it.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Cache;

/// Spawns a background task that periodically evicts expired entries.
///
/// The task loops forever, sleeping for `interval` between sweeps. The
/// returned handle can be aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Cache::with_defaults();
/// let handle = spawn_sweep_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task(cache: Cache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "starting expiry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.evict_expired();
            if removed > 0 {
                info!(removed, "expiry sweep removed entries");
            } else {
                debug!("expiry sweep found nothing expired");
            }
        }
    })
}
