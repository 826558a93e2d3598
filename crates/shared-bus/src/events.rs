//! # Pool Events
//!
//! Every mutation of a transaction pool is announced as one `PoolEvent`.

use serde::{Deserialize, Serialize};

/// The transient (pre-confirmation) pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransientPool {
    /// Received but not yet processed.
    Queued,
    /// Processed and ready for inclusion in a block.
    Unconfirmed,
    /// Waiting for additional multisignature co-signatures.
    Multisignature,
}

impl std::fmt::Display for TransientPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Unconfirmed => write!(f, "unconfirmed"),
            Self::Multisignature => write!(f, "multisignature"),
        }
    }
}

/// All events that can be published to the pool bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    /// A block was accepted and its transactions moved into the confirmed pool.
    ///
    /// Every listed id has left the transient pools.
    TransactionsConfirmed {
        /// Id of the accepted block.
        block_id: String,
        /// Height of the accepted block.
        height: u64,
        /// Ids of the transactions the block confirmed.
        transaction_ids: Vec<String>,
    },

    /// A transaction entered the queued pool.
    TransactionQueued {
        /// Transaction id.
        id: String,
    },

    /// A transaction entered the unconfirmed pool.
    TransactionUnconfirmed {
        /// Transaction id.
        id: String,
    },

    /// A transaction is waiting for multisignature co-signatures.
    TransactionAwaitingSignatures {
        /// Transaction id.
        id: String,
    },

    /// A transaction was removed from a transient pool without confirmation.
    TransactionDropped {
        /// Transaction id.
        id: String,
        /// Pool it was removed from.
        pool: TransientPool,
    },
}

impl PoolEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::TransactionsConfirmed { .. } => EventTopic::Confirmed,
            Self::TransactionQueued { .. }
            | Self::TransactionUnconfirmed { .. }
            | Self::TransactionAwaitingSignatures { .. }
            | Self::TransactionDropped { .. } => EventTopic::Transient,
        }
    }

    /// Whether this event mutated the confirmed pool.
    #[must_use]
    pub fn mutates_confirmed(&self) -> bool {
        self.topic() == EventTopic::Confirmed
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Confirmed pool mutations.
    Confirmed,
    /// Queued, unconfirmed and multisignature pool mutations.
    Transient,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &PoolEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
