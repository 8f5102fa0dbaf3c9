//! Fire-and-forget event bus between the kernel and its front-ends.

use tokio::sync::broadcast;

use crate::events::KernelEvent;

/// Default number of events buffered per subscriber.
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// Broadcasts [`KernelEvent`]s to every subscriber.
///
/// Publishing never blocks and never fails: with no subscribers the event is
/// dropped, and slow subscribers lose the oldest events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<KernelEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event.
    pub fn publish(&self, event: KernelEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Dropped kernel event: no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<KernelEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
