//! # Inbound Ports (Driving Ports)
//!
//! Public API exposed by the Transaction Query subsystem.

use serde::{Serialize, Serializer};
use shared_bus::TransientPool;

use crate::domain::{PendingFilter, PoolCounts, QueryError, TransactionQuery, TransactionView};

fn serialize_count<S: Serializer>(count: &usize, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(count)
}

/// One page of confirmed transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionView>,
    /// Total matches of the query, ignoring `limit` and `offset`.
    #[serde(serialize_with = "serialize_count")]
    pub count: usize,
}

/// Primary API for the Transaction Query subsystem.
///
/// Every call reads a single snapshot of the pools.
pub trait TransactionQueryApi: Send + Sync {
    /// Filter, sort and paginate the Confirmed pool.
    ///
    /// ## Returns
    ///
    /// - `Ok(TransactionPage)`: the requested window plus the total count
    /// - `Err(QueryError::Store)`: the pools could not be read
    fn find_confirmed(&self, query: &TransactionQuery) -> Result<TransactionPage, QueryError>;

    /// Direct lookup in one transient pool. `Ok(None)` when absent.
    fn get_pending(
        &self,
        pool: TransientPool,
        id: &str,
    ) -> Result<Option<TransactionView>, QueryError>;

    /// Contents of one transient pool, ordered by id.
    fn list_pending(
        &self,
        pool: TransientPool,
        filter: &PendingFilter,
    ) -> Result<Vec<TransactionView>, QueryError>;

    /// Size of every pool.
    fn count_all(&self) -> Result<PoolCounts, QueryError>;
}
