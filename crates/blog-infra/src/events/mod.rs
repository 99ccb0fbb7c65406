//! Event bus implementations.
//!
//! `TriggerDevEventBus` forwards post updates to the audio generation task.
//! `InMemoryEventBus` only records events; it is the fallback when no
//! trigger secret is configured.

mod memory;
mod trigger_dev;

pub use memory::InMemoryEventBus;
pub use trigger_dev::{TriggerDevClient, TriggerDevConfig, TriggerDevEventBus, TriggerResponse};
