//! # Value Objects
//!
//! Constants and configuration for the transaction query subsystem.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::ConfigError;

/// Chain epoch as Unix seconds (2016-05-24T17:00:00Z).
///
/// Transaction timestamps count seconds from this instant.
pub const EPOCH_UNIX_SECONDS: u64 = 1_464_109_200;

/// Page size used when a request does not carry `limit`.
pub const DEFAULT_LIMIT: usize = 100;

/// Largest page a single request may ask for.
pub const MAX_LIMIT: usize = 1000;

/// Maximum length of the `data` filter in bytes.
pub const MAX_DATA_LENGTH: usize = 64;

/// Candidate count above which a full scan is evaluated with rayon.
pub const PARALLEL_THRESHOLD: usize = 4096;

/// Configuration for the query engine and its response cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page size when `limit` is absent (default: 100).
    pub default_limit: usize,
    /// Upper bound accepted for `limit` (default: 1000).
    pub max_limit: usize,
    /// Chain epoch in Unix seconds.
    pub epoch_unix: u64,
    /// Response cache configuration.
    pub cache: CacheConfig,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            epoch_unix: EPOCH_UNIX_SECONDS,
            cache: CacheConfig::default(),
        }
    }
}

impl QueryConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_limit == 0 {
            return Err(ConfigError::InvalidLimit("max_limit cannot be 0".into()));
        }

        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(ConfigError::InvalidLimit(format!(
                "default_limit {} must be within [1, {}]",
                self.default_limit, self.max_limit
            )));
        }

        self.cache.validate()
    }
}

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve and store `/transactions` responses through the cache.
    pub enabled: bool,
    /// Delay before a stored entry becomes visible to readers.
    #[serde(with = "humantime_serde")]
    pub propagation_delay: Duration,
    /// Number of reads a probe makes before giving up.
    pub probe_attempts: u32,
    /// First probe backoff; doubles after every miss.
    #[serde(with = "humantime_serde")]
    pub probe_initial_backoff: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            propagation_delay: Duration::ZERO,
            probe_attempts: 10,
            probe_initial_backoff: Duration::from_millis(10),
        }
    }
}

impl CacheConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe_attempts == 0 {
            return Err(ConfigError::InvalidCache(
                "probe_attempts cannot be 0".into(),
            ));
        }
        Ok(())
    }
}
