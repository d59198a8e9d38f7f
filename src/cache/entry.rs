//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

use serde_json::Value;

// == Cache Entry ==
/// A single cached value with the metadata needed to judge its freshness.
///
/// Entries are owned exclusively by the store; callers only ever receive the
/// (deserialized) value, never a reference to the entry itself. The produce
/// time uses the monotonic clock so freshness survives wall-clock jumps.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// When the value was produced
    pub produced_at: Instant,
    /// How long the value stays fresh after production
    pub ttl: Duration,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry produced now.
    pub fn new(value: Value, ttl: Duration) -> Self {
        Self {
            value,
            produced_at: Instant::now(),
            ttl,
        }
    }

    // == Is Fresh ==
    /// Checks whether the entry is still fresh at `now`.
    ///
    /// An entry is fresh iff `now - produced_at < ttl`. Freshness is
    /// evaluated at read time only; nothing pre-computes or sweeps it.
    /// A zero TTL therefore means "never fresh" and always reads as a miss.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.produced_at) < self.ttl
    }

    /// Convenience freshness check against the current instant.
    pub fn is_expired(&self) -> bool {
        !self.is_fresh(Instant::now())
    }

    // == Remaining TTL ==
    /// Returns the remaining freshness window, zero if already expired.
    ///
    /// Diagnostics only.
    pub fn remaining_ttl(&self) -> Duration {
        self.ttl
            .saturating_sub(Instant::now().duration_since(self.produced_at))
    }
}
