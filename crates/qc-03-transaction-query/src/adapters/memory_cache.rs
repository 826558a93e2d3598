//! In-memory response cache.
//!
//! Entries become readable `propagation_delay` after they are written, which
//! models a replicated store where writes take a moment to reach readers.
//! With the default zero delay a write is visible immediately.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::domain::{CacheConfig, CacheError};
use crate::ports::outbound::{CacheKey, CachedResponse, ResponseCache};

/// A stored response and the instant it becomes readable.
struct CacheEntry {
    response: CachedResponse,
    visible_at: Instant,
}

/// Cache statistics
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Reads that returned an entry
    pub hits: AtomicU64,
    /// Reads that found nothing visible
    pub misses: AtomicU64,
    /// Entries written
    pub writes: AtomicU64,
    /// Completed flushes
    pub flushes: AtomicU64,
}

pub struct InMemoryResponseCache {
    entries: DashMap<CacheKey, CacheEntry>,
    propagation_delay: Duration,
    stats: CacheStats,
}

impl InMemoryResponseCache {
    pub fn new() -> Self {
        Self::with_propagation_delay(Duration::ZERO)
    }

    pub fn with_propagation_delay(propagation_delay: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            propagation_delay,
            stats: CacheStats::default(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_propagation_delay(config.propagation_delay)
    }

    /// Number of stored entries, visible or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl Default for InMemoryResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedResponse>, CacheError> {
        let now = Instant::now();
        let found = self
            .entries
            .get(key)
            .filter(|entry| entry.visible_at <= now)
            .map(|entry| entry.response.clone());

        if found.is_some() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
        }
        Ok(found)
    }

    async fn set(&self, key: CacheKey, response: CachedResponse) -> Result<(), CacheError> {
        debug!(key = %key, "[qc-03] Cache entry stored");
        self.entries.insert(
            key,
            CacheEntry {
                response,
                visible_at: Instant::now() + self.propagation_delay,
            },
        );
        self.stats.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn flush_all(&self) -> Result<usize, CacheError> {
        let removed = self.entries.len();
        self.entries.clear();
        self.stats.flushes.fetch_add(1, Ordering::Relaxed);
        info!(removed, "[qc-03] Response cache flushed");
        Ok(removed)
    }
}
