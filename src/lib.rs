//! Query Cache - a read-through in-memory TTL cache
//!
//! Memoizes expensive, idempotent async fetches (typically database queries)
//! for a bounded time window. Concurrent misses for the same key are
//! deduplicated (single-flight), and entries can be invalidated exactly, by
//! regex pattern, or wholesale after the underlying records change.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{make_key, Cache, CacheStats, KeyPart};
pub use config::{CacheConfig, Eviction};
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
