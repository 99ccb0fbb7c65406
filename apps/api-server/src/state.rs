//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::{ContentGenerator, EventBus};
use blog_core::services::{EngagementService, PostQueries, PostService, Stores, uuid_ids};
use blog_infra::{
    InMemoryEventBus, OpenAiConfig, OpenAiGenerator, TriggerDevClient, TriggerDevConfig,
    TriggerDevEventBus,
};

/// Shared application state, generic over the store backend's transaction type.
pub struct AppState<Tx> {
    pub posts: Arc<PostService<Tx>>,
    pub engagement: Arc<EngagementService<Tx>>,
    pub queries: Arc<PostQueries<Tx>>,
}

impl<Tx> Clone for AppState<Tx> {
    fn clone(&self) -> Self {
        Self {
            posts: Arc::clone(&self.posts),
            engagement: Arc::clone(&self.engagement),
            queries: Arc::clone(&self.queries),
        }
    }
}

impl<Tx: Send + Sync + 'static> AppState<Tx> {
    pub fn new(
        stores: Stores<Tx>,
        generator: Arc<dyn ContentGenerator>,
        events: Arc<dyn EventBus>,
    ) -> Self {
        let next_id = uuid_ids();
        Self {
            posts: Arc::new(PostService::new(
                stores.posts.clone(),
                generator,
                events,
                next_id.clone(),
            )),
            engagement: Arc::new(EngagementService::new(stores.clone(), next_id)),
            queries: Arc::new(PostQueries::new(stores)),
        }
    }
}

/// External service adapters, built once before the store backend is chosen.
pub struct Adapters {
    generator: Arc<dyn ContentGenerator>,
    events: Arc<dyn EventBus>,
}

impl Adapters {
    pub fn from_env() -> Self {
        Self {
            generator: content_generator(),
            events: event_bus(),
        }
    }

    pub fn with_stores<Tx: Send + Sync + 'static>(self, stores: Stores<Tx>) -> AppState<Tx> {
        AppState::new(stores, self.generator, self.events)
    }
}

/// OpenAI-backed generator. Without an API key every generation call fails.
fn content_generator() -> Arc<dyn ContentGenerator> {
    let config = OpenAiConfig::from_env();
    if !config.has_api_key() {
        tracing::warn!("OPENAI_API_KEY not set. Creating or editing posts will fail.");
    }
    Arc::new(OpenAiGenerator::new(config))
}

/// trigger.dev when a secret is configured, otherwise a recording bus.
fn event_bus() -> Arc<dyn EventBus> {
    match TriggerDevConfig::from_env() {
        Some(config) => {
            tracing::info!(base_url = %config.base_url, "Audio generation trigger enabled");
            Arc::new(TriggerDevEventBus::new(TriggerDevClient::new(config)))
        }
        None => {
            tracing::warn!(
                "TRIGGER_SECRET_KEY not set. Post events will only be recorded in memory."
            );
            Arc::new(InMemoryEventBus::new())
        }
    }
}
