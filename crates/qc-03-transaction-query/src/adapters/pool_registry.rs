//! # Pool Registry
//!
//! In-memory owner of the four transaction pools.
//!
//! Readers clone an `Arc<PoolSnapshot>` and never wait on writers beyond the
//! pointer swap. Writers are serialized by an async mutex, build the next
//! snapshot from a copy of the current one, swap it in, and announce the
//! mutation on the event bus before releasing the mutex, so subscribers see
//! events in commit order.

use parking_lot::RwLock;
use shared_bus::{EventPublisher, PoolEvent, TransientPool};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::{PoolError, PoolSnapshot, StoreError, Transaction};
use crate::ports::outbound::PoolStore;

pub struct PoolRegistry {
    current: RwLock<Arc<PoolSnapshot>>,
    writer: Mutex<()>,
    publisher: Arc<dyn EventPublisher>,
}

impl PoolRegistry {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self::with_snapshot(PoolSnapshot::new(), publisher)
    }

    /// Start from existing pool contents.
    pub fn with_snapshot(snapshot: PoolSnapshot, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
            publisher,
        }
    }

    /// The snapshot queries currently read.
    pub fn current(&self) -> Arc<PoolSnapshot> {
        Arc::clone(&self.current.read())
    }

    pub async fn add_queued(&self, tx: Transaction) -> Result<(), PoolError> {
        self.admit(TransientPool::Queued, tx).await
    }

    pub async fn add_unconfirmed(&self, tx: Transaction) -> Result<(), PoolError> {
        self.admit(TransientPool::Unconfirmed, tx).await
    }

    pub async fn add_multisignature(&self, tx: Transaction) -> Result<(), PoolError> {
        self.admit(TransientPool::Multisignature, tx).await
    }

    /// Move a transaction from `from` into `to`, e.g. queued to unconfirmed
    /// once processed, or queued to multisignature when co-signatures are
    /// still missing.
    pub async fn promote(
        &self,
        id: &str,
        from: TransientPool,
        to: TransientPool,
    ) -> Result<(), PoolError> {
        let _guard = self.writer.lock().await;
        self.commit(|next| next.move_transient(id, from, to))?;
        debug!(id, %from, %to, "[qc-03] Transaction promoted");
        self.publisher.publish(entered(to, id.to_string())).await;
        Ok(())
    }

    /// Remove a transaction from a transient pool without confirming it.
    pub async fn drop_transient(&self, id: &str, pool: TransientPool) -> Result<(), PoolError> {
        let _guard = self.writer.lock().await;
        self.commit(|next| next.drop_transient(id, pool))?;
        debug!(id, %pool, "[qc-03] Transaction dropped");
        self.publisher
            .publish(PoolEvent::TransactionDropped {
                id: id.to_string(),
                pool,
            })
            .await;
        Ok(())
    }

    /// Apply an accepted block to the Confirmed pool.
    pub async fn confirm_block(
        &self,
        block_id: &str,
        height: u64,
        transactions: Vec<Transaction>,
    ) -> Result<(), PoolError> {
        let _guard = self.writer.lock().await;
        let transaction_ids =
            self.commit(|next| next.confirm_block(block_id, height, transactions))?;
        info!(
            block_id,
            height,
            transactions = transaction_ids.len(),
            "[qc-03] Block confirmed"
        );
        self.publisher
            .publish(PoolEvent::TransactionsConfirmed {
                block_id: block_id.to_string(),
                height,
                transaction_ids,
            })
            .await;
        Ok(())
    }

    async fn admit(&self, pool: TransientPool, tx: Transaction) -> Result<(), PoolError> {
        let _guard = self.writer.lock().await;
        let id = tx.id.clone();
        self.commit(|next| next.add_transient(pool, tx))?;
        debug!(id = %id, %pool, "[qc-03] Transaction admitted");
        self.publisher.publish(entered(pool, id)).await;
        Ok(())
    }

    /// Copy-on-write step. Caller holds the writer mutex.
    fn commit<T>(
        &self,
        mutate: impl FnOnce(&mut PoolSnapshot) -> Result<T, PoolError>,
    ) -> Result<T, PoolError> {
        let mut next = PoolSnapshot::clone(&self.current());
        let out = mutate(&mut next)?;
        *self.current.write() = Arc::new(next);
        Ok(out)
    }
}

impl PoolStore for PoolRegistry {
    fn snapshot(&self) -> Result<Arc<PoolSnapshot>, StoreError> {
        Ok(self.current())
    }
}

fn entered(pool: TransientPool, id: String) -> PoolEvent {
    match pool {
        TransientPool::Queued => PoolEvent::TransactionQueued { id },
        TransientPool::Unconfirmed => PoolEvent::TransactionUnconfirmed { id },
        TransientPool::Multisignature => PoolEvent::TransactionAwaitingSignatures { id },
    }
}
