//! Polling reader for eventually consistent cache entries.
//!
//! Each miss waits the current backoff and doubles it before the next read.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::{CacheConfig, CacheError};
use crate::ports::outbound::{CacheKey, CachedResponse, ResponseCache};

pub struct CacheProbe {
    cache: Arc<dyn ResponseCache>,
    attempts: u32,
    initial_backoff: Duration,
}

impl CacheProbe {
    pub fn new(cache: Arc<dyn ResponseCache>, attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            cache,
            attempts: attempts.max(1),
            initial_backoff,
        }
    }

    pub fn from_config(cache: Arc<dyn ResponseCache>, config: &CacheConfig) -> Self {
        Self::new(cache, config.probe_attempts, config.probe_initial_backoff)
    }

    /// Read `key` until an entry shows up or the attempts run out.
    pub async fn poll(&self, key: &CacheKey) -> Result<Option<CachedResponse>, CacheError> {
        let mut backoff = self.initial_backoff;
        for attempt in 1..=self.attempts {
            if let Some(response) = self.cache.get(key).await? {
                return Ok(Some(response));
            }
            if attempt < self.attempts {
                debug!(key = %key, attempt, ?backoff, "[qc-03] Cache probe miss");
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            }
        }
        Ok(None)
    }

    /// Read `key` until it is gone. Returns `false` if it is still present
    /// after the last attempt.
    pub async fn poll_absent(&self, key: &CacheKey) -> Result<bool, CacheError> {
        let mut backoff = self.initial_backoff;
        for attempt in 1..=self.attempts {
            if self.cache.get(key).await?.is_none() {
                return Ok(true);
            }
            if attempt < self.attempts {
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            }
        }
        Ok(false)
    }
}
