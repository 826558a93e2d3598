//! # Transaction Pools
//!
//! The four lifecycle pools as one immutable-once-published snapshot.
//!
//! A transaction id lives in at most one pool at a time. Every mutation
//! below checks that before touching anything, so a rejected mutation leaves
//! the snapshot exactly as it was.

use serde::Serialize;
use shared_bus::TransientPool;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::entities::{ConfirmedTransaction, Transaction};
use super::errors::{PoolError, PoolKind};
use super::index::ConfirmedIndex;
use super::query::PendingFilter;

/// A transient pool, keyed by transaction id.
#[derive(Debug, Clone, Default)]
pub struct PendingPool {
    transactions: HashMap<String, Arc<Transaction>>,
}

impl PendingPool {
    pub fn get(&self, id: &str) -> Option<&Arc<Transaction>> {
        self.transactions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.transactions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    fn insert(&mut self, tx: Arc<Transaction>) {
        self.transactions.insert(tx.id.clone(), tx);
    }

    fn remove(&mut self, id: &str) -> Option<Arc<Transaction>> {
        self.transactions.remove(id)
    }

    /// Transactions passing `filter`, ordered by id.
    pub fn list(&self, filter: &PendingFilter) -> Vec<Arc<Transaction>> {
        let mut matched: Vec<Arc<Transaction>> = self
            .transactions
            .values()
            .filter(|tx| matches_pending(tx, filter))
            .cloned()
            .collect();
        matched.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        matched
    }
}

fn matches_pending(tx: &Transaction, filter: &PendingFilter) -> bool {
    let key_matches = filter.sender_public_key.as_ref().map_or(true, |wanted| {
        tx.sender_public_key
            .as_ref()
            .is_some_and(|key| key.eq_ignore_ascii_case(wanted))
    });
    let address_matches = filter.address.as_ref().map_or(true, |address| {
        tx.sender_id == *address || tx.recipient_id.as_ref() == Some(address)
    });
    key_matches && address_matches
}

/// Pool sizes as reported by `/transactions/count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolCounts {
    pub confirmed: usize,
    pub unconfirmed: usize,
    /// Queued transactions.
    pub unprocessed: usize,
    /// Transactions awaiting multisignature co-signatures.
    pub unsigned: usize,
    pub total: usize,
}

/// Consistent view of all four pools.
#[derive(Debug, Clone, Default)]
pub struct PoolSnapshot {
    confirmed: ConfirmedIndex,
    queued: PendingPool,
    unconfirmed: PendingPool,
    multisignature: PendingPool,
}

impl PoolSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirmed(&self) -> &ConfirmedIndex {
        &self.confirmed
    }

    pub fn transient(&self, pool: TransientPool) -> &PendingPool {
        match pool {
            TransientPool::Queued => &self.queued,
            TransientPool::Unconfirmed => &self.unconfirmed,
            TransientPool::Multisignature => &self.multisignature,
        }
    }

    fn transient_mut(&mut self, pool: TransientPool) -> &mut PendingPool {
        match pool {
            TransientPool::Queued => &mut self.queued,
            TransientPool::Unconfirmed => &mut self.unconfirmed,
            TransientPool::Multisignature => &mut self.multisignature,
        }
    }

    /// Pool currently holding `id`.
    pub fn locate(&self, id: &str) -> Option<PoolKind> {
        if self.confirmed.contains(id) {
            return Some(PoolKind::Confirmed);
        }
        [
            TransientPool::Queued,
            TransientPool::Unconfirmed,
            TransientPool::Multisignature,
        ]
        .into_iter()
        .find(|pool| self.transient(*pool).contains(id))
        .map(PoolKind::Transient)
    }

    pub fn counts(&self) -> PoolCounts {
        let confirmed = self.confirmed.len();
        let unconfirmed = self.unconfirmed.len();
        let unprocessed = self.queued.len();
        let unsigned = self.multisignature.len();
        PoolCounts {
            confirmed,
            unconfirmed,
            unprocessed,
            unsigned,
            total: confirmed + unconfirmed + unprocessed + unsigned,
        }
    }

    /// Admit a new transaction into a transient pool.
    pub fn add_transient(&mut self, pool: TransientPool, tx: Transaction) -> Result<(), PoolError> {
        if let Some(existing) = self.locate(&tx.id) {
            return Err(PoolError::DuplicateTransaction {
                id: tx.id,
                pool: existing,
            });
        }
        self.transient_mut(pool).insert(Arc::new(tx));
        Ok(())
    }

    /// Move a transaction between transient pools.
    pub fn move_transient(
        &mut self,
        id: &str,
        from: TransientPool,
        to: TransientPool,
    ) -> Result<(), PoolError> {
        let tx = self
            .transient_mut(from)
            .remove(id)
            .ok_or_else(|| PoolError::NotInPool {
                id: id.to_string(),
                pool: from,
            })?;
        self.transient_mut(to).insert(tx);
        Ok(())
    }

    /// Remove a transaction from a transient pool without confirming it.
    pub fn drop_transient(
        &mut self,
        id: &str,
        pool: TransientPool,
    ) -> Result<Arc<Transaction>, PoolError> {
        self.transient_mut(pool)
            .remove(id)
            .ok_or_else(|| PoolError::NotInPool {
                id: id.to_string(),
                pool,
            })
    }

    /// Confirm a block: its transactions enter the Confirmed pool and leave
    /// every transient pool in the same step.
    ///
    /// Returns the confirmed ids in block order.
    pub fn confirm_block(
        &mut self,
        block_id: &str,
        height: u64,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<String>, PoolError> {
        let tip = self.confirmed.tip_height();
        if height <= tip {
            return Err(PoolError::NonIncreasingHeight { height, tip });
        }

        let mut batch = HashSet::with_capacity(transactions.len());
        for tx in &transactions {
            if self.confirmed.contains(&tx.id) || !batch.insert(tx.id.as_str()) {
                return Err(PoolError::DuplicateTransaction {
                    id: tx.id.clone(),
                    pool: PoolKind::Confirmed,
                });
            }
        }

        let mut ids = Vec::with_capacity(transactions.len());
        for tx in transactions {
            for pool in [
                TransientPool::Queued,
                TransientPool::Unconfirmed,
                TransientPool::Multisignature,
            ] {
                self.transient_mut(pool).remove(&tx.id);
            }
            ids.push(tx.id.clone());
            self.confirmed.insert(ConfirmedTransaction {
                transaction: Arc::new(tx),
                block_id: block_id.to_string(),
                height,
            });
        }
        self.confirmed.advance_tip(height);
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Asset;

    fn tx(id: &str, sender: &str, recipient: Option<&str>) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount: 1,
            fee: 1,
            sender_id: sender.to_string(),
            sender_public_key: Some("AB".repeat(32)),
            recipient_id: recipient.map(str::to_string),
            recipient_public_key: None,
            timestamp: 0,
            asset: Asset::Send { data: None },
            signature: String::new(),
            sign_signature: None,
            signatures: vec![],
        }
    }

    #[test]
    fn test_ids_unique_across_pools() {
        let mut snapshot = PoolSnapshot::new();
        snapshot
            .add_transient(TransientPool::Queued, tx("1", "1L", None))
            .unwrap();

        let err = snapshot
            .add_transient(TransientPool::Unconfirmed, tx("1", "1L", None))
            .unwrap_err();
        assert_eq!(
            err,
            PoolError::DuplicateTransaction {
                id: "1".into(),
                pool: PoolKind::Transient(TransientPool::Queued)
            }
        );
    }

    #[test]
    fn test_confirm_moves_out_of_transient_pools() {
        let mut snapshot = PoolSnapshot::new();
        snapshot
            .add_transient(TransientPool::Unconfirmed, tx("1", "1L", None))
            .unwrap();

        let ids = snapshot
            .confirm_block("100", 1, vec![tx("1", "1L", None), tx("2", "2L", None)])
            .unwrap();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(snapshot.locate("1"), Some(PoolKind::Confirmed));
        assert!(snapshot.transient(TransientPool::Unconfirmed).is_empty());
        assert_eq!(snapshot.confirmed().tip_height(), 1);
    }

    #[test]
    fn test_confirm_rejects_stale_height_and_duplicates() {
        let mut snapshot = PoolSnapshot::new();
        snapshot.confirm_block("100", 2, vec![tx("1", "1L", None)]).unwrap();

        assert_eq!(
            snapshot.confirm_block("101", 2, vec![]),
            Err(PoolError::NonIncreasingHeight { height: 2, tip: 2 })
        );
        assert!(matches!(
            snapshot.confirm_block("101", 3, vec![tx("1", "1L", None)]),
            Err(PoolError::DuplicateTransaction { .. })
        ));
        assert!(matches!(
            snapshot.confirm_block("101", 3, vec![tx("5", "1L", None), tx("5", "1L", None)]),
            Err(PoolError::DuplicateTransaction { .. })
        ));
        assert_eq!(snapshot.confirmed().len(), 1);
        assert_eq!(snapshot.confirmed().tip_height(), 2);
    }

    #[test]
    fn test_empty_block_advances_tip() {
        let mut snapshot = PoolSnapshot::new();
        snapshot.confirm_block("100", 4, vec![]).unwrap();
        assert_eq!(snapshot.confirmed().tip_height(), 4);
    }

    #[test]
    fn test_move_and_drop() {
        let mut snapshot = PoolSnapshot::new();
        snapshot
            .add_transient(TransientPool::Queued, tx("1", "1L", None))
            .unwrap();
        snapshot
            .move_transient("1", TransientPool::Queued, TransientPool::Multisignature)
            .unwrap();
        assert_eq!(
            snapshot.locate("1"),
            Some(PoolKind::Transient(TransientPool::Multisignature))
        );

        assert!(matches!(
            snapshot.drop_transient("1", TransientPool::Queued),
            Err(PoolError::NotInPool { .. })
        ));
        snapshot
            .drop_transient("1", TransientPool::Multisignature)
            .unwrap();
        assert_eq!(snapshot.locate("1"), None);
    }

    #[test]
    fn test_counts() {
        let mut snapshot = PoolSnapshot::new();
        snapshot.confirm_block("100", 1, vec![tx("1", "1L", None)]).unwrap();
        snapshot
            .add_transient(TransientPool::Queued, tx("2", "1L", None))
            .unwrap();
        snapshot
            .add_transient(TransientPool::Queued, tx("3", "1L", None))
            .unwrap();
        snapshot
            .add_transient(TransientPool::Multisignature, tx("4", "1L", None))
            .unwrap();

        assert_eq!(
            snapshot.counts(),
            PoolCounts {
                confirmed: 1,
                unconfirmed: 0,
                unprocessed: 2,
                unsigned: 1,
                total: 4,
            }
        );
    }

    #[test]
    fn test_pending_listing_filters() {
        let mut snapshot = PoolSnapshot::new();
        for (id, sender, recipient) in [("3", "1L", None), ("1", "2L", Some("1L")), ("2", "2L", None)] {
            snapshot
                .add_transient(TransientPool::Queued, tx(id, sender, recipient))
                .unwrap();
        }
        let pool = snapshot.transient(TransientPool::Queued);

        let all: Vec<String> = pool
            .list(&PendingFilter::default())
            .iter()
            .map(|t| t.id.clone())
            .collect();
        assert_eq!(all, vec!["1", "2", "3"]);

        let by_address = pool.list(&PendingFilter {
            address: Some("1L".into()),
            ..PendingFilter::default()
        });
        assert_eq!(by_address.len(), 2);

        let by_key = pool.list(&PendingFilter {
            sender_public_key: Some("ab".repeat(32)),
            ..PendingFilter::default()
        });
        assert_eq!(by_key.len(), 3);
    }
}
