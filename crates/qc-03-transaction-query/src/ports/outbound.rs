//! # Outbound Ports (Driven Ports)
//!
//! SPIs required by the Transaction Query subsystem.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::domain::{CacheError, PoolSnapshot, QueryParams, StoreError};

/// Source of consistent pool snapshots.
///
/// A query reads exactly one snapshot, so it observes a pool mutation either
/// completely or not at all.
pub trait PoolStore: Send + Sync {
    /// Current snapshot of all four pools.
    fn snapshot(&self) -> Result<Arc<PoolSnapshot>, StoreError>;
}

impl<T: PoolStore + ?Sized> PoolStore for Arc<T> {
    fn snapshot(&self) -> Result<Arc<PoolSnapshot>, StoreError> {
        (**self).snapshot()
    }
}

/// Normalized request signature: `METHOD path?k1=v1&k2=v2`, pairs sorted.
///
/// Two requests that differ only in parameter order share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(method: &str, path: &str, params: &QueryParams) -> Self {
        Self(format!(
            "{} {}?{}",
            method.to_ascii_uppercase(),
            path,
            params.canonical_query_string()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub body: String,
}

/// Key/value store for serialized responses.
///
/// Reads may lag writes by a propagation delay. There is no TTL: entries
/// live until the next `flush_all`.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Entry for `key`, if one is visible.
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedResponse>, CacheError>;

    /// Store `response` under `key`, replacing any previous entry.
    async fn set(&self, key: CacheKey, response: CachedResponse) -> Result<(), CacheError>;

    /// Remove every entry. Returns how many were removed.
    async fn flush_all(&self) -> Result<usize, CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_ignores_parameter_order() {
        let a = QueryParams::parse("senderId=1L&limit=10&sort=amount:asc");
        let b = QueryParams::parse("sort=amount:asc&senderId=1L&limit=10");
        assert_eq!(
            CacheKey::new("GET", "/transactions", &a),
            CacheKey::new("get", "/transactions", &b)
        );
        assert_eq!(
            CacheKey::new("GET", "/transactions", &a).as_str(),
            "GET /transactions?limit=10&senderId=1L&sort=amount:asc"
        );
    }

    #[test]
    fn test_cache_key_distinguishes_values() {
        let a = QueryParams::parse("senderId=1L");
        let b = QueryParams::parse("senderId=2L");
        assert_ne!(
            CacheKey::new("GET", "/transactions", &a),
            CacheKey::new("GET", "/transactions", &b)
        );
    }
}
