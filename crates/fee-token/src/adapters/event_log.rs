//! # Event Log
//!
//! Records published events in memory, in order.

use crate::events::TokenEvent;
use crate::ports::outbound::EventSink;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::trace;

/// In-memory event sink.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: Mutex<Vec<TokenEvent>>,
}

impl InMemoryEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded event.
    #[must_use]
    pub fn events(&self) -> Vec<TokenEvent> {
        self.events.lock().clone()
    }

    /// Removes and returns every recorded event.
    pub fn drain(&self) -> Vec<TokenEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

#[async_trait]
impl EventSink for InMemoryEventLog {
    async fn publish(&self, event: TokenEvent) {
        trace!(topic = event.topic(), "Event recorded");
        self.events.lock().push(event);
    }
}
