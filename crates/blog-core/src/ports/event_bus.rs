//! Event bus port - hands domain events to downstream processors.

use async_trait::async_trait;

use crate::domain::DomainEvent;

/// Delivers domain events. Events the bus has no handler for are skipped.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Process `events` in order, stopping at the first failure.
    async fn process_events(&self, events: &[DomainEvent]) -> Result<(), DispatchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to send trigger request: {0}")]
    Request(String),

    #[error("trigger request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to decode trigger response: {0}")]
    Decode(String),
}
