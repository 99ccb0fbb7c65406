use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use blog_core::domain::DomainEvent;
use blog_core::ports::{DispatchError, EventBus};

/// Records every processed event. Works within a single process only.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<DomainEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything processed so far, oldest first.
    pub fn events(&self) -> Vec<DomainEvent> {
        self.recorded().clone()
    }

    // A panic elsewhere never loses what was already recorded.
    fn recorded(&self) -> MutexGuard<'_, Vec<DomainEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn process_events(&self, events: &[DomainEvent]) -> Result<(), DispatchError> {
        for event in events {
            tracing::debug!(post_id = %event.post_id(), ?event, "Event recorded");
        }
        self.recorded().extend_from_slice(events);
        Ok(())
    }
}
