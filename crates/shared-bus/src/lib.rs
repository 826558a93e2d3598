//! # Shared Bus - Pool Event Bus
//!
//! Carries transaction pool mutations from the pool registry to every
//! component that must react to them (the response cache invalidator first
//! among them).
//!
//! ```text
//! ┌───────────────┐                    ┌──────────────────┐
//! │ Pool Registry │                    │ Cache Invalidator│
//! │               │    publish()       │                  │
//! │               │ ──────┐            │                  │
//! └───────────────┘       │            └──────────────────┘
//!                         ▼                    ↑
//!                   ┌──────────────┐           │
//!                   │  Event Bus   │           │
//!                   │              │ ──────────┘
//!                   └──────────────┘  subscribe()
//! ```
//!
//! Publishers never call subscribers directly; every reaction to a pool
//! mutation is driven by a subscription.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, PoolEvent, TransientPool};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
