//! In-Flight Fetch Module
//!
//! Bookkeeping for single-flight population: one `Flight` exists per key
//! with a fetch in progress. The leader broadcasts the outcome over a watch
//! channel; followers clone the receiver and wait. Invalidation marks a
//! flight superseded so its result still reaches waiters but is never
//! written back to the store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

/// Outcome of an in-flight fetch, shared by leader and followers.
///
/// The failure side is `Arc`ed so a single producer error can be handed to
/// every waiter.
pub(crate) type FlightResult = std::result::Result<Value, Arc<anyhow::Error>>;

// == Flight ==
/// One in-flight fetch for a single key.
pub(crate) struct Flight {
    /// Receiver template cloned by each waiter; holds `None` until done
    rx: watch::Receiver<Option<FlightResult>>,
    /// Set by invalidation that logically follows this fetch's start:
    /// the result must not be written back
    superseded: AtomicBool,
}

impl std::fmt::Debug for Flight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flight")
            .field("resolved", &self.rx.borrow().is_some())
            .field("superseded", &self.is_superseded())
            .finish()
    }
}

impl Flight {
    /// Creates a flight and the sender its leader will complete it with.
    pub(crate) fn new() -> (Arc<Self>, watch::Sender<Option<FlightResult>>) {
        let (tx, rx) = watch::channel(None);
        let flight = Arc::new(Self {
            rx,
            superseded: AtomicBool::new(false),
        });
        (flight, tx)
    }

    /// A fresh receiver for a waiter to await the outcome on.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<FlightResult>> {
        self.rx.clone()
    }

    /// Marks the flight's eventual result as not-to-be-cached.
    pub(crate) fn supersede(&self) {
        self.superseded.store(true, Ordering::Release);
    }

    pub(crate) fn is_superseded(&self) -> bool {
        self.superseded.load(Ordering::Acquire)
    }
}
