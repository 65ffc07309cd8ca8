//! Event bus - publish/subscribe feed of dispatch activity.
//!
//! Uses a tokio broadcast channel so every subscriber sees every event
//! emitted after it subscribed.

use tokio::sync::broadcast;
use tracing::trace;

use super::TaskEvent;

/// Default channel capacity (events).
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Broadcast feed of [`TaskEvent`]s.
pub struct EventBus<T> {
    tx: broadcast::Sender<TaskEvent<T>>,
}

impl<T: Clone> EventBus<T> {
    /// Create a new event bus with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; configuration validation rejects that first.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers.
    ///
    /// Fire-and-forget: without subscribers the event is dropped, and a
    /// subscriber that falls more than `capacity` events behind observes a lag.
    pub fn emit(&self, event: TaskEvent<T>) {
        trace!(event = event.name(), record_id = %event.record().id, "EventBus::emit");
        let _ = self.tx.send(event);
    }

    /// Subscribe to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent<T>> {
        self.tx.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
