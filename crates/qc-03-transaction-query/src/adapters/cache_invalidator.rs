//! # Cache Invalidator
//!
//! Flushes the response cache whenever the Confirmed pool changes.
//!
//! The invalidator only knows the cache and a bus subscription. The pool
//! registry never calls it; it reacts to `TransactionsConfirmed` events.

use shared_bus::{EventFilter, EventTopic, PoolEvent, Subscription};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ports::outbound::ResponseCache;

/// Filter for the events that must flush the cache.
pub fn invalidation_filter() -> EventFilter {
    EventFilter::topics(vec![EventTopic::Confirmed])
}

pub struct CacheInvalidator {
    cache: Arc<dyn ResponseCache>,
    subscription: Subscription,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<dyn ResponseCache>, subscription: Subscription) -> Self {
        Self {
            cache,
            subscription,
        }
    }

    /// Run until the bus closes.
    pub async fn run(mut self) {
        while let Some(event) = self.subscription.recv().await {
            self.handle(&event).await;
        }
        debug!("[qc-03] Event bus closed, cache invalidator stopping");
    }

    /// Run on a background task.
    pub fn spawn(cache: Arc<dyn ResponseCache>, subscription: Subscription) -> JoinHandle<()> {
        tokio::spawn(Self::new(cache, subscription).run())
    }

    async fn handle(&self, event: &PoolEvent) {
        if !event.mutates_confirmed() {
            return;
        }
        match self.cache.flush_all().await {
            Ok(removed) => {
                if let PoolEvent::TransactionsConfirmed { block_id, height, .. } = event {
                    info!(
                        block_id = %block_id,
                        height,
                        removed,
                        "[qc-03] Cache invalidated by block confirmation"
                    );
                }
            }
            Err(e) => {
                // Entries survive until the next confirmation flushes them.
                warn!(error = %e, "[qc-03] Cache flush failed");
            }
        }
    }
}
