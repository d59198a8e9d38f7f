//! Configuration Module
//!
//! Construction-time options for the cache, with environment-variable
//! overrides and sensible defaults.

use std::env;
use std::time::Duration;

use serde::Serialize;

use crate::error::{CacheError, Result};

/// Expiry strategy for entries that outlive their TTL.
///
/// Lazy expiry never removes an entry until it is next read or explicitly
/// invalidated; periodic expiry additionally runs a background sweep at the
/// given interval. Callers observe the same freshness-checked reads either
/// way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Eviction {
    /// Expired entries linger until next accessed or invalidated
    Lazy,
    /// A background task removes expired entries at this interval
    Periodic(Duration),
}

/// Cache configuration parameters.
#[derive(Debug, Clone, Serialize)]
pub struct CacheConfig {
    /// TTL applied to writes that do not carry an explicit override
    pub default_ttl: Duration,
    /// Expiry strategy
    pub eviction: Eviction,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_SECS` - Default TTL in seconds (default: 300)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - If set, enables the periodic sweep at
    ///   this interval in seconds (default: unset, lazy expiry)
    pub fn from_env() -> Self {
        let default_ttl = env::var("CACHE_DEFAULT_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TTL);

        let eviction = env::var("CACHE_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(|secs| Eviction::Periodic(Duration::from_secs(secs)))
            .unwrap_or(Eviction::Lazy);

        Self {
            default_ttl,
            eviction,
        }
    }

    /// Rejects configurations that would misbehave silently.
    ///
    /// A zero default TTL would turn every read into a miss; a zero sweep
    /// interval would spin the sweeper. Both signal `InvalidConfiguration`.
    /// (A zero *per-call* TTL override is legal and means "never fresh".)
    pub fn validate(&self) -> Result<()> {
        if self.default_ttl.is_zero() {
            return Err(CacheError::InvalidConfiguration(
                "default_ttl must be positive".to_string(),
            ));
        }
        if let Eviction::Periodic(interval) = self.eviction {
            if interval.is_zero() {
                return Err(CacheError::InvalidConfiguration(
                    "sweep interval must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Default TTL applied when neither the caller nor the environment overrides it.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            eviction: Eviction::Lazy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert_eq!(config.eviction, Eviction::Lazy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_DEFAULT_TTL_SECS");
        env::remove_var("CACHE_SWEEP_INTERVAL_SECS");

        let config = CacheConfig::from_env();
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert_eq!(config.eviction, Eviction::Lazy);
    }

    #[test]
    fn test_config_zero_default_ttl_rejected() {
        let config = CacheConfig {
            default_ttl: Duration::ZERO,
            eviction: Eviction::Lazy,
        };
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_config_zero_sweep_interval_rejected() {
        let config = CacheConfig {
            default_ttl: DEFAULT_TTL,
            eviction: Eviction::Periodic(Duration::ZERO),
        };
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfiguration(_))
        ));
    }
}
