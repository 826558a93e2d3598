//! # Transaction Query Service
//!
//! The main service implementing the Transaction Query API.
//!
//! ## Pipeline
//!
//! 1. Take one snapshot from the `PoolStore`
//! 2. Plan and filter against the Confirmed index
//! 3. Sort (nulls last, id tie-break)
//! 4. Paginate and render views

use shared_bus::TransientPool;
use tracing::debug;

use crate::domain::{
    paginate, sort_records, FilterEngine, PendingFilter, PoolCounts, QueryError,
    TransactionQuery, TransactionView,
};
use crate::ports::inbound::{TransactionPage, TransactionQueryApi};
use crate::ports::outbound::PoolStore;

/// The Transaction Query Service.
pub struct TransactionQueryService<S: PoolStore> {
    store: S,
    engine: FilterEngine,
}

impl<S: PoolStore> TransactionQueryService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            engine: FilterEngine::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: PoolStore> TransactionQueryApi for TransactionQueryService<S> {
    fn find_confirmed(&self, query: &TransactionQuery) -> Result<TransactionPage, QueryError> {
        let snapshot = self.store.snapshot()?;
        let index = snapshot.confirmed();

        let mut matched = self.engine.execute(index, query);
        sort_records(&mut matched, query.sort);

        let tip = index.tip_height();
        let page = paginate(matched, query.offset, query.limit)
            .map(|record| TransactionView::confirmed(record, tip));

        debug!(
            total = page.total,
            returned = page.items.len(),
            sort = %query.sort,
            "[qc-03] Confirmed query executed"
        );

        Ok(TransactionPage {
            transactions: page.items,
            count: page.total,
        })
    }

    fn get_pending(
        &self,
        pool: TransientPool,
        id: &str,
    ) -> Result<Option<TransactionView>, QueryError> {
        let snapshot = self.store.snapshot()?;
        Ok(snapshot
            .transient(pool)
            .get(id)
            .map(|tx| TransactionView::pending(tx)))
    }

    fn list_pending(
        &self,
        pool: TransientPool,
        filter: &PendingFilter,
    ) -> Result<Vec<TransactionView>, QueryError> {
        let snapshot = self.store.snapshot()?;
        Ok(snapshot
            .transient(pool)
            .list(filter)
            .iter()
            .map(|tx| TransactionView::pending(tx))
            .collect())
    }

    fn count_all(&self) -> Result<PoolCounts, QueryError> {
        Ok(self.store.snapshot()?.counts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Asset, FilterField, FilterTerm, PoolSnapshot, SortDirection, SortField, SortOrder,
        StoreError, Transaction,
    };
    use std::collections::BTreeSet;
    use std::sync::Arc;

    struct FixedStore(Arc<PoolSnapshot>);

    impl PoolStore for FixedStore {
        fn snapshot(&self) -> Result<Arc<PoolSnapshot>, StoreError> {
            Ok(Arc::clone(&self.0))
        }
    }

    struct FailingStore;

    impl PoolStore for FailingStore {
        fn snapshot(&self) -> Result<Arc<PoolSnapshot>, StoreError> {
            Err(StoreError::Unavailable {
                message: "connection reset".into(),
            })
        }
    }

    fn tx(id: u32, sender: &str, amount: u64) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount,
            fee: 10,
            sender_id: sender.into(),
            sender_public_key: None,
            recipient_id: Some("9L".into()),
            recipient_public_key: None,
            timestamp: id,
            asset: Asset::Send { data: None },
            signature: String::new(),
            sign_signature: None,
            signatures: vec![],
        }
    }

    fn service() -> TransactionQueryService<FixedStore> {
        let mut snapshot = PoolSnapshot::new();
        snapshot
            .confirm_block("100", 1, (1..=5).map(|i| tx(i, "1L", u64::from(i))).collect())
            .unwrap();
        snapshot
            .confirm_block("200", 2, (6..=8).map(|i| tx(i, "2L", u64::from(i))).collect())
            .unwrap();
        snapshot
            .add_transient(TransientPool::Queued, tx(20, "1L", 1))
            .unwrap();
        TransactionQueryService::new(FixedStore(Arc::new(snapshot)))
    }

    #[test]
    fn test_count_is_total_not_page() {
        let mut query = TransactionQuery {
            limit: 2,
            ..TransactionQuery::default()
        };
        query.filters.insert(
            FilterField::SenderId,
            FilterTerm::SetMembership(BTreeSet::from(["1L".to_string()])),
        );

        let page = service().find_confirmed(&query).unwrap();
        assert_eq!(page.transactions.len(), 2);
        assert_eq!(page.count, 5);
        assert_eq!(page.transactions[0].id, "1");
    }

    #[test]
    fn test_sorted_and_offset() {
        let query = TransactionQuery {
            sort: SortOrder {
                field: SortField::Amount,
                direction: SortDirection::Desc,
            },
            offset: 1,
            limit: 3,
            ..TransactionQuery::default()
        };
        let ids: Vec<String> = service()
            .find_confirmed(&query)
            .unwrap()
            .transactions
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["7", "6", "5"]);
    }

    #[test]
    fn test_confirmations_relative_to_tip() {
        let page = service().find_confirmed(&TransactionQuery::default()).unwrap();
        let first = &page.transactions[0];
        assert_eq!(first.height, Some(1));
        assert_eq!(first.confirmations, Some(2));
    }

    #[test]
    fn test_count_serialized_as_string() {
        let page = service().find_confirmed(&TransactionQuery::default()).unwrap();
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["count"], "8");
    }

    #[test]
    fn test_pending_lookup() {
        let service = service();
        assert!(service
            .get_pending(TransientPool::Queued, "20")
            .unwrap()
            .is_some());
        assert!(service
            .get_pending(TransientPool::Unconfirmed, "20")
            .unwrap()
            .is_none());
        assert_eq!(service.count_all().unwrap().total, 9);
    }

    #[test]
    fn test_store_failure_is_an_error_not_empty() {
        let service = TransactionQueryService::new(FailingStore);
        assert!(matches!(
            service.find_confirmed(&TransactionQuery::default()),
            Err(QueryError::Store(_))
        ));
        assert!(matches!(service.count_all(), Err(QueryError::Store(_))));
    }
}
