//! Read-Through Cache Module
//!
//! The public cache façade. Wraps the synchronous [`CacheStore`] in a shared
//! handle that is safe under parallel-thread access and deduplicates
//! concurrent misses for the same key (single-flight): the first caller
//! becomes the leader and performs the fetch, concurrent callers follow and
//! receive the leader's value or failure without issuing redundant fetches.
//!
//! Lock discipline: the mutex guards only the decide/mutate sections and is
//! never held across an `.await`. The producer itself runs in a detached
//! task, so it completes and reports even if every waiter is cancelled.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::flight::{Flight, FlightResult};
use crate::cache::{CacheStats, CacheStore};
use crate::config::{CacheConfig, Eviction};
use crate::error::{CacheError, Result};
use crate::tasks::spawn_sweep_task;

// == Cache ==
/// Shared read-through cache handle.
///
/// Cloning is cheap and clones see the same store. Intended usage is one
/// cache per process, constructed at the composition root and handed to
/// whichever service layer needs it.
#[derive(Debug, Clone)]
pub struct Cache {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: CacheConfig,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    store: CacheStore,
    in_flight: HashMap<String, Arc<Flight>>,
}

/// Outcome of the locked decide step in `get_or_populate`.
enum Role {
    Hit(Value),
    Follower(watch::Receiver<Option<FlightResult>>),
    Leader {
        flight: Arc<Flight>,
        tx: watch::Sender<Option<FlightResult>>,
        rx: watch::Receiver<Option<FlightResult>>,
    },
}

impl Cache {
    // == Constructor ==
    /// Creates a cache with the given configuration.
    ///
    /// Fails with `InvalidConfiguration` if the config carries a zero
    /// default TTL or a zero sweep interval.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(State::default()),
            }),
        })
    }

    /// Creates a cache with default configuration (5 minute TTL, lazy expiry).
    pub fn with_defaults() -> Self {
        Self {
            inner: Arc::new(Inner {
                config: CacheConfig::default(),
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// The configuration this cache was constructed with.
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    // == Get Or Populate ==
    /// Returns the fresh cached value for `key`, or produces one.
    ///
    /// On a hit the fetcher is never invoked. On a miss, exactly one fetch
    /// runs per key no matter how many callers race: the leader fetches,
    /// followers wait on the same outcome. A failed fetch is propagated to
    /// the leader and every follower and leaves no entry behind, so the key
    /// stays eligible for a fresh attempt on the next call.
    ///
    /// The fetch runs in a detached task and always completes; callers that
    /// stop waiting (timeout, cancellation) abandon cleanly without
    /// disturbing it.
    ///
    /// # Arguments
    /// * `key` - Non-empty cache key
    /// * `fetcher` - Zero-argument async producer, invoked only on a miss
    /// * `ttl` - Optional TTL override (uses the configured default if None)
    pub async fn get_or_populate<T, F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        ttl: Option<Duration>,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        validate_key(key)?;
        let ttl = ttl.unwrap_or(self.inner.config.default_ttl);

        let role = {
            let mut state = self.lock();
            if let Some(value) = state.store.get_fresh(key) {
                Role::Hit(value)
            } else if let Some(flight) = state.in_flight.get(key) {
                Role::Follower(flight.subscribe())
            } else {
                let (flight, tx) = Flight::new();
                let rx = flight.subscribe();
                state.in_flight.insert(key.to_string(), Arc::clone(&flight));
                Role::Leader { flight, tx, rx }
            }
        };

        let rx = match role {
            Role::Hit(value) => {
                debug!(key, "cache hit");
                return decode(key, value);
            }
            Role::Follower(rx) => {
                debug!(key, "joining in-flight fetch");
                rx
            }
            Role::Leader { flight, tx, rx } => {
                debug!(key, "cache miss, fetching");
                // The producer future is created outside the lock.
                let fut = fetcher();
                let cache = self.clone();
                let key = key.to_string();
                tokio::spawn(async move {
                    cache.complete_flight(key, flight, tx, fut, ttl).await;
                });
                rx
            }
        };

        let value = await_flight(rx, key).await?;
        decode(key, value)
    }

    /// Runs the fetch and broadcasts its outcome. Detached-task body.
    async fn complete_flight<T, Fut>(
        self,
        key: String,
        flight: Arc<Flight>,
        tx: watch::Sender<Option<FlightResult>>,
        fut: Fut,
        ttl: Duration,
    ) where
        T: Serialize + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        // The inner spawn contains producer panics as JoinErrors so waiters
        // are released with a failure instead of hanging.
        let joined = tokio::spawn(fut).await;
        let result: FlightResult = match joined {
            Ok(Ok(value)) => serde_json::to_value(&value).map_err(|e| {
                Arc::new(anyhow::Error::new(e).context("produced value is not serializable"))
            }),
            Ok(Err(e)) => Err(Arc::new(e)),
            Err(e) => Err(Arc::new(anyhow::anyhow!("producer task failed: {e}"))),
        };

        {
            let mut state = self.lock();
            if let Ok(value) = &result {
                if flight.is_superseded() {
                    debug!(key = key.as_str(), "fetch superseded by invalidation, not cached");
                } else {
                    state.store.insert(key.clone(), value.clone(), ttl);
                }
            }
            // Remove the flight only if the slot still holds it; an
            // invalidation may have cleared it and a newer flight may
            // already occupy the key.
            if let Some(current) = state.in_flight.get(&key) {
                if Arc::ptr_eq(current, &flight) {
                    state.in_flight.remove(&key);
                }
            }
        }

        if result.is_err() {
            warn!(key = key.as_str(), "producer failed, nothing cached");
        }
        let _ = tx.send(Some(result));
    }

    // == Set ==
    /// Stores a value under a key, replacing any previous entry.
    ///
    /// # Arguments
    /// * `key` - Non-empty cache key
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL override (uses the configured default if None)
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()> {
        validate_key(key)?;
        let ttl = ttl.unwrap_or(self.inner.config.default_ttl);
        let encoded = serde_json::to_value(value).map_err(|source| CacheError::TypeMismatch {
            key: key.to_string(),
            source,
        })?;

        let mut state = self.lock();
        state.store.insert(key.to_string(), encoded, ttl);
        Ok(())
    }

    // == Invalidate ==
    /// Removes the entry for an exact key; no-op if absent.
    ///
    /// Any in-flight fetch for the key is superseded: its result is still
    /// delivered to waiters but is not written back, so a stale value cannot
    /// reappear after this call returns.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut state = self.lock();
        let removed = state.store.remove(key);
        if let Some(flight) = state.in_flight.remove(key) {
            flight.supersede();
        }
        if removed {
            debug!(key, "invalidated");
        }
        removed
    }

    // == Invalidate Pattern ==
    /// Removes every entry whose key matches the regular expression.
    ///
    /// Returns the number of stored entries removed. A malformed pattern
    /// fails with `InvalidPattern` and invalidates nothing. In-flight
    /// fetches with matching keys are superseded like in [`Cache::invalidate`].
    pub fn invalidate_pattern(&self, pattern: &str) -> Result<usize> {
        let compiled = Regex::new(pattern).map_err(|source| CacheError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut state = self.lock();
        let removed = state.store.remove_matching(&compiled);
        let matching: Vec<String> = state
            .in_flight
            .keys()
            .filter(|key| compiled.is_match(key))
            .cloned()
            .collect();
        for key in matching {
            if let Some(flight) = state.in_flight.remove(&key) {
                flight.supersede();
            }
        }
        debug!(pattern, removed, "pattern invalidation");
        Ok(removed)
    }

    // == Clear ==
    /// Removes all entries unconditionally and supersedes every in-flight fetch.
    pub fn clear(&self) {
        let mut state = self.lock();
        let removed = state.store.clear();
        for (_, flight) in state.in_flight.drain() {
            flight.supersede();
        }
        debug!(removed, "cache cleared");
    }

    // == Stats ==
    /// Diagnostic snapshot: entry count, sorted keys, hit/miss counters.
    ///
    /// Exposes no freshness information; never base business logic on it.
    pub fn stats(&self) -> CacheStats {
        self.lock().store.stats()
    }

    // == Evict Expired ==
    /// Removes every entry whose TTL has elapsed; returns how many.
    ///
    /// Called by the periodic sweeper; harmless to call manually.
    pub fn evict_expired(&self) -> usize {
        self.lock().store.evict_expired()
    }

    // == Sweeper ==
    /// Starts the background expiry sweep if the config asks for one.
    ///
    /// Returns `None` under lazy eviction. The returned handle can be
    /// aborted during shutdown.
    pub fn spawn_sweeper(&self) -> Option<JoinHandle<()>> {
        match self.inner.config.eviction {
            Eviction::Lazy => None,
            Eviction::Periodic(interval) => Some(spawn_sweep_task(self.clone(), interval)),
        }
    }

    /// Locks the shared state. Guard-holding sections never await; a
    /// poisoned lock only means some thread panicked mid-section, and every
    /// section leaves the maps coherent, so the guard is recovered.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// == Helpers ==
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| CacheError::TypeMismatch {
        key: key.to_string(),
        source,
    })
}

/// Waits for an in-flight fetch to resolve and maps its failure.
async fn await_flight(
    mut rx: watch::Receiver<Option<FlightResult>>,
    key: &str,
) -> Result<Value> {
    loop {
        if let Some(result) = rx.borrow_and_update().clone() {
            return result.map_err(|cause| CacheError::Producer {
                key: key.to_string(),
                cause,
            });
        }
        if rx.changed().await.is_err() {
            // Sender dropped without a result; only reachable if the
            // completion task itself was torn down (runtime shutdown).
            return Err(CacheError::Producer {
                key: key.to_string(),
                cause: Arc::new(anyhow::anyhow!("in-flight fetch was abandoned")),
            });
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        let cache = Cache::with_defaults();
        let result = cache.set("", &1, None);
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_set_then_stats() {
        let cache = Cache::with_defaults();
        cache.set("a", &1, None).unwrap();
        cache.set("b", &2, None).unwrap();

        let stats = cache.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.keys, vec!["a", "b"]);
    }

    #[test]
    fn test_invalidate_exact() {
        let cache = Cache::with_defaults();
        cache.set("a", &1, None).unwrap();
        cache.set("b", &2, None).unwrap();

        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.stats().keys, vec!["b"]);
    }

    #[test]
    fn test_invalidate_pattern_bad_regex() {
        let cache = Cache::with_defaults();
        cache.set("user:1", &1, None).unwrap();

        let result = cache.invalidate_pattern("user:(");
        assert!(matches!(result, Err(CacheError::InvalidPattern { .. })));
        // nothing was invalidated
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn test_invalidate_pattern_removes_matches() {
        let cache = Cache::with_defaults();
        cache.set("user:1", &1, None).unwrap();
        cache.set("user:2", &2, None).unwrap();
        cache.set("order:1", &3, None).unwrap();

        let removed = cache.invalidate_pattern("^user:").unwrap();
        assert_eq!(removed, 2);
        assert_eq!(cache.stats().keys, vec!["order:1"]);
    }

    #[test]
    fn test_clear_is_total() {
        let cache = Cache::with_defaults();
        for i in 0..20 {
            cache.set(&format!("key:{i}"), &i, None).unwrap();
        }

        cache.clear();
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_hit_does_not_invoke_fetcher() {
        tokio_test::block_on(async {
            let cache = Cache::with_defaults();
            cache.set("k", &"v".to_string(), None).unwrap();

            let value: String = cache
                .get_or_populate("k", || async { unreachable!("fetcher must not run on a hit") }, None)
                .await
                .unwrap();
            assert_eq!(value, "v");
        });
    }

    #[test]
    fn test_miss_populates_store() {
        tokio_test::block_on(async {
            let cache = Cache::with_defaults();

            let value: i32 = cache
                .get_or_populate("answer", || async { Ok(42) }, None)
                .await
                .unwrap();
            assert_eq!(value, 42);
            assert_eq!(cache.stats().keys, vec!["answer"]);
        });
    }

    #[test]
    fn test_type_mismatch_on_hit() {
        tokio_test::block_on(async {
            let cache = Cache::with_defaults();
            cache.set("k", &"text".to_string(), None).unwrap();

            let result: Result<i32> = cache
                .get_or_populate("k", || async { Ok(7) }, None)
                .await;
            assert!(matches!(result, Err(CacheError::TypeMismatch { .. })));
        });
    }
}
