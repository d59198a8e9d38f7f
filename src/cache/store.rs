//! Cache Store Module
//!
//! The synchronous map engine: entries, freshness-checked lookups, removal
//! operations, and diagnostic counters. Concurrency is layered on top by
//! [`crate::cache::Cache`]; this type is single-threaded by itself.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use regex::Regex;
use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats};

// == Cache Store ==
/// Key-value storage with per-entry TTL and lazy expiry.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Successful freshness-checked lookups
    hits: u64,
    /// Lookups that found nothing fresh
    misses: u64,
    /// Entries removed because their TTL had elapsed
    evictions: u64,
}

impl CacheStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Stores a value under a key with the given TTL.
    ///
    /// Writes are idempotent replacements: an existing entry for the key is
    /// superseded wholesale, never merged, and the TTL is reset to `ttl`.
    pub fn insert(&mut self, key: String, value: Value, ttl: Duration) {
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    // == Get Fresh ==
    /// Returns the value for `key` if a fresh entry exists.
    ///
    /// Expired entries are removed on the way out (lazy expiry) and counted
    /// as both a miss and an eviction. Absent keys count as a miss.
    pub fn get_fresh(&mut self, key: &str) -> Option<Value> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if entry.is_fresh(now) => {
                self.hits += 1;
                Some(entry.value.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                self.misses += 1;
                self.evictions += 1;
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    // == Remove ==
    /// Removes the entry for an exact key. Returns whether one was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Remove Matching ==
    /// Removes every entry whose key matches the compiled pattern.
    ///
    /// Returns the number of entries removed. O(number of keys), which is
    /// fine at the low-thousands scale this cache is built for.
    pub fn remove_matching(&mut self, pattern: &Regex) -> usize {
        let matched: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect();

        for key in &matched {
            self.entries.remove(key);
        }
        matched.len()
    }

    // == Clear ==
    /// Removes all entries unconditionally. Returns how many were present.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    // == Evict Expired ==
    /// Removes every entry whose TTL has elapsed.
    ///
    /// Returns the number of entries removed. Backs the optional periodic
    /// sweep; lazy expiry alone never calls this.
    pub fn evict_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_fresh(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
        }
        self.evictions += expired.len() as u64;
        expired.len()
    }

    // == Stats ==
    /// Snapshot of entry count, sorted key list, and counters.
    pub fn stats(&self) -> CacheStats {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: self.entries.len(),
            keys,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
