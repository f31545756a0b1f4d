//! Event bus - in-process fan-out to connected observers

use crate::outbound::EventSink;
use argus_core::Envelope;
use tokio::sync::broadcast;

/// Broadcast-channel event bus. The transport layer subscribes and forwards
/// envelopes to its own connections; a send with no subscribers is not an
/// error.
pub struct EventBus {
    tx: broadcast::Sender<Envelope>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventSink for EventBus {
    fn broadcast(&self, event: Envelope) {
        let _ = self.tx.send(event);
    }
}
