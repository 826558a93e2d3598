//! # Event Subscriber
//!
//! Defines the subscription side of the pool event bus.

use crate::events::{EventFilter, PoolEvent};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// Trait for subscribing to events from the bus.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe to events matching a filter.
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

/// Decrements the bus's per-topic subscription count when dropped.
struct SubscriptionTracking {
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,
    topic_key: String,
}

impl Drop for SubscriptionTracking {
    fn drop(&mut self) {
        let Ok(mut subs) = self.subscriptions.write() else {
            return;
        };
        if let Some(count) = subs.get_mut(&self.topic_key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                subs.remove(&self.topic_key);
            }
        }
        debug!(topic = %self.topic_key, "Subscription dropped");
    }
}

/// A subscription handle for receiving events.
///
/// When dropped, the subscription is automatically cleaned up.
pub struct Subscription {
    receiver: broadcast::Receiver<PoolEvent>,
    filter: EventFilter,
    tracking: SubscriptionTracking,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<PoolEvent>,
        filter: EventFilter,
        subscriptions: Arc<RwLock<HashMap<String, usize>>>,
        topic_key: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            tracking: SubscriptionTracking {
                subscriptions,
                topic_key,
            },
        }
    }

    /// Receive the next event that matches the filter.
    ///
    /// Returns `None` once the bus has been dropped. A lagging subscriber
    /// skips the overwritten events and keeps receiving.
    pub async fn recv(&mut self) -> Option<PoolEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some events dropped");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Some(event);
            }
        }
    }

    /// Try to receive the next event without blocking.
    ///
    /// - `Ok(Some(event))` - An event was available and matched
    /// - `Ok(None)` - No event available (would block)
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<PoolEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct EventStream {
    inner: BroadcastStream<PoolEvent>,
    filter: EventFilter,
    _tracking: SubscriptionTracking,
}

impl EventStream {
    /// Create a new event stream from a subscription.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        let Subscription {
            receiver,
            filter,
            tracking,
        } = subscription;
        Self {
            inner: BroadcastStream::new(receiver),
            filter,
            _tracking: tracking,
        }
    }

    /// Get the filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = PoolEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if self.filter.matches(&event) {
                        return Poll::Ready(Some(event));
                    }
                }
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    debug!(lagged = count, "Stream lagged, some events dropped");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
