//! Synchronous publish/subscribe bus.

use super::types::{BusEvent, Topic};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::debug;

type Handler = Arc<dyn Fn(&BusEvent) + Send + Sync>;

struct Registration {
    id: u64,
    topic: Topic,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    registrations: Mutex<Vec<Registration>>,
}

impl BusInner {
    fn registrations(&self) -> MutexGuard<'_, Vec<Registration>> {
        // A panicking handler never runs under this lock, so the data is
        // still consistent after a poison.
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: u64) {
        self.registrations().retain(|r| r.id != id);
    }
}

/// Typed in-process event bus.
///
/// Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `topic`.
    ///
    /// The handler stays registered until the returned [`Subscription`] is
    /// unsubscribed or dropped.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&BusEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.registrations().push(Registration {
            id,
            topic,
            handler: Arc::new(handler),
        });
        debug!(%topic, id, "Bus subscription added");
        Subscription {
            id,
            topic,
            bus: Arc::downgrade(&self.inner),
            active: true,
        }
    }

    /// Deliver `event` to every handler of its topic, in subscription order.
    ///
    /// Delivery is synchronous: when this returns, every handler has run.
    /// Returns the number of handlers reached; zero means the event is lost.
    pub fn publish(&self, event: BusEvent) -> usize {
        let topic = event.topic();
        // Snapshot the handlers so they run without the lock held and may
        // themselves publish or (un)subscribe.
        let handlers: Vec<Handler> = self
            .inner
            .registrations()
            .iter()
            .filter(|r| r.topic == topic)
            .map(|r| Arc::clone(&r.handler))
            .collect();

        for handler in &handlers {
            handler(&event);
        }

        debug!(%topic, delivered = handlers.len(), "Published bus event");
        handlers.len()
    }

    /// Number of handlers currently registered for `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner
            .registrations()
            .iter()
            .filter(|r| r.topic == topic)
            .count()
    }
}

/// Capability to deregister a bus handler.
///
/// Dropping the subscription deregisters the handler as well, so a view that
/// is torn down can never be called back.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    topic: Topic,
    bus: Weak<BusInner>,
    active: bool,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.id);
            debug!(topic = %self.topic, id = self.id, "Bus subscription removed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("active", &self.active)
            .finish()
    }
}
