//! # Adapters Layer
//!
//! Secondary adapters for the qc-03 Transaction Query subsystem.
//! These implement the hexagonal architecture pattern.

pub mod api_handler;
pub mod cache_invalidator;
pub mod cache_probe;
pub mod memory_cache;
pub mod pool_registry;

pub use api_handler::{ApiGatewayHandler, ApiRequest, ApiResponse, NOT_FOUND_ERROR};
pub use cache_invalidator::{invalidation_filter, CacheInvalidator};
pub use cache_probe::CacheProbe;
pub use memory_cache::{CacheStats, InMemoryResponseCache};
pub use pool_registry::PoolRegistry;
