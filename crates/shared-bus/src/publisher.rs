//! # Event Publisher
//!
//! Defines the publishing side of the pool event bus.

use crate::events::{EventFilter, PoolEvent};
use crate::subscriber::{EventStream, EventSubscriber, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing pool events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the event.
    async fn publish(&self, event: PoolEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the event bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
pub struct InMemoryEventBus {
    /// Broadcast sender for events.
    sender: broadcast::Sender<PoolEvent>,

    /// Active subscription count by topic.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let topic_key = format!("{:?}", filter.topics);

        if let Ok(mut subs) = self.subscriptions.write() {
            *subs.entry(topic_key.clone()).or_insert(0) += 1;
        }

        debug!(topics = ?filter.topics, "New subscription created");

        Subscription::new(receiver, filter, self.subscriptions.clone(), topic_key)
    }

    /// Get a stream of events matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        InMemoryEventBus::subscribe(self, filter)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: PoolEvent) -> usize {
        let topic = event.topic();

        // Counted even when nobody is listening
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(topic = ?topic, receivers = receiver_count, "Event published");
                receiver_count
            }
            Err(e) => {
                warn!(topic = ?topic, error = %e, "Event dropped (no receivers)");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventTopic;

    fn queued() -> PoolEvent {
        PoolEvent::TransactionQueued {
            id: "16580139363949197645".into(),
        }
    }

    #[tokio::test]
    async fn test_publish_no_subscribers() {
        let bus = InMemoryEventBus::new();

        let receivers = bus.publish(queued()).await;
        assert_eq!(receivers, 0);
        assert_eq!(bus.events_published(), 1);
    }

    #[tokio::test]
    async fn test_publish_with_subscriber() {
        let bus = InMemoryEventBus::new();
        let _sub = bus.subscribe(EventFilter::all());

        let receivers = bus.publish(queued()).await;

        assert_eq!(receivers, 1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = InMemoryEventBus::new();

        let _sub1 = bus.subscribe(EventFilter::all());
        let _sub2 = bus.subscribe(EventFilter::topics(vec![EventTopic::Confirmed]));

        // Broadcast delivers to every receiver; topic filtering happens on recv
        let receivers = bus.publish(queued()).await;
        assert_eq!(receivers, 2);
    }

    #[test]
    fn test_default_bus() {
        let bus = InMemoryEventBus::default();
        assert_eq!(bus.capacity(), DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.events_published(), 0);
    }
}
