//! Cache Statistics Module
//!
//! Diagnostic snapshot of the cache: entry count, keys, and counters.
//! Carries no freshness information and must never back business logic.

use serde::Serialize;

// == Cache Stats ==
/// A point-in-time view of the cache, for diagnostics only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Current number of entries (fresh or not; expiry is lazy)
    pub size: usize,
    /// All current keys, sorted lexicographically
    pub keys: Vec<String>,
    /// Freshness-checked lookups that returned a value
    pub hits: u64,
    /// Lookups that found nothing fresh
    pub misses: u64,
    /// Entries removed because their TTL had elapsed
    pub evictions: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
