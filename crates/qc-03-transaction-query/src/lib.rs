//! # Transaction Query Subsystem (qc-03)
//!
//! Answers filtered, sorted and paginated lookups over the four transaction
//! pools of the node, and keeps a response cache in front of the heaviest
//! endpoint.
//!
//! ## Pools
//!
//! | Pool | Contents | Lookup |
//! |------|----------|--------|
//! | Confirmed | Transactions included in accepted blocks | Indexed queries |
//! | Unconfirmed | Processed, ready for a block | By id, listing |
//! | Queued | Received, not yet processed | By id, listing |
//! | Multisignature | Waiting for co-signatures | By id, listing |
//!
//! A transaction id lives in exactly one pool at a time.
//!
//! ## Query Flow
//!
//! ```text
//! request ─→ ParameterValidator ─→ FilterEngine ⇄ ConfirmedIndex
//!                                       │
//!                                       ↓
//!                              sort_records ─→ paginate ─→ response
//! ```
//!
//! ## Cache Invalidation
//!
//! ```text
//! PoolRegistry ──TransactionsConfirmed──→ [Event Bus] ──→ CacheInvalidator
//!                                                              │
//!                                                              ↓
//!                                                   ResponseCache::flush_all
//! ```
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): validation, indexing, filtering, sorting, pagination
//! - **Ports Layer** (`ports/`): Inbound API trait, Outbound pool store and cache SPIs
//! - **Service** (`service.rs`): the query pipeline over one pool snapshot
//! - **Adapters Layer** (`adapters/`): pool registry, in-memory cache, invalidator, API handler

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export main types for convenience
pub use domain::{
    Asset, CacheConfig, CacheError, ConfigError, ConfirmedTransaction, FilterEngine,
    FilterField, FilterTerm, ParameterValidator, PendingFilter, PoolCounts,
    PoolError, PoolKind, PoolSnapshot, QueryConfig, QueryError, QueryParams, SortDirection,
    SortField, SortOrder, StoreError, Transaction, TransactionQuery, TransactionType,
    TransactionView, ValidationError, EPOCH_UNIX_SECONDS,
};

pub use ports::{
    CacheKey, CachedResponse, PoolStore, ResponseCache, TransactionPage, TransactionQueryApi,
};

pub use service::TransactionQueryService;

pub use adapters::{
    ApiGatewayHandler, ApiRequest, ApiResponse, CacheInvalidator, CacheProbe,
    InMemoryResponseCache, PoolRegistry,
};
