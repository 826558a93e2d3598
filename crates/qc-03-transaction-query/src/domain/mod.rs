//! # Domain Layer
//!
//! Pure query logic for the Transaction Query subsystem: validation,
//! indexing, filtering, sorting and pagination over the transaction pools.
//!
//! ## Hexagonal Architecture
//!
//! This module contains NO I/O dependencies. All external interactions
//! are abstracted through ports in the `ports` module.

pub mod entities;
pub mod errors;
pub mod filter;
pub mod index;
pub mod pagination;
pub mod pools;
pub mod query;
pub mod sort;
pub mod validation;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use filter::{matches_query, AccessPath, FilterEngine, QueryPlan};
pub use index::ConfirmedIndex;
pub use pagination::{paginate, Page};
pub use pools::{PendingPool, PoolCounts, PoolSnapshot};
pub use query::*;
pub use sort::{compare, sort_records, SortKey};
pub use validation::{ParameterValidator, QueryParams};
pub use value_objects::*;
