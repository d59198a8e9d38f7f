//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The supplied producer failed (or panicked, or returned a value that
    /// could not be serialized). The underlying cause is shared between the
    /// leader and every follower waiting on the same in-flight fetch.
    #[error("producer failed for key '{key}': {cause:#}")]
    Producer {
        key: String,
        // not a `source` field: anyhow::Error is not std::error::Error
        cause: Arc<anyhow::Error>,
    },

    /// Invalidation pattern failed to compile as a regular expression
    #[error("invalid invalidation pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Construction-time option was rejected (e.g. zero default TTL)
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Key failed validation (empty keys are not allowed)
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A value could not be converted to or from the stored representation,
    /// usually because two call sites disagree on the type behind a key
    #[error("value for key '{key}' does not match requested type: {source}")]
    TypeMismatch {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
