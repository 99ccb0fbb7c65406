#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use blog_core::domain::{DomainEvent, User};
use blog_core::ports::{ContentGenerator, DispatchError, EventBus, GenerationError, Store};
use blog_core::services::{
    CreatePost, EngagementService, NextId, PostQueries, PostService, PostView, Stores,
};
use blog_infra::{InMemoryDatabase, InMemoryEventBus, InMemoryTx, memory_stores};

/// Generator returning canned output and counting its calls.
#[derive(Default)]
pub struct FakeGenerator {
    pub calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn generate_summary(&self, content: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("summary of {content}"))
    }

    async fn generate_tags(&self, _content: &str) -> Result<Vec<String>, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec!["a".to_string(), "b".to_string()])
    }
}

/// Generator whose tag call always fails.
pub struct BrokenTagsGenerator;

#[async_trait]
impl ContentGenerator for BrokenTagsGenerator {
    async fn generate_summary(&self, _content: &str) -> Result<String, GenerationError> {
        Ok("summary".to_string())
    }

    async fn generate_tags(&self, _content: &str) -> Result<Vec<String>, GenerationError> {
        Err(GenerationError::MalformedTags("not an array".to_string()))
    }
}

/// Bus that rejects every batch.
pub struct FailingEventBus;

#[async_trait]
impl EventBus for FailingEventBus {
    async fn process_events(&self, _events: &[DomainEvent]) -> Result<(), DispatchError> {
        Err(DispatchError::Rejected {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

/// Sequential IDs: `id-1`, `id-2`, ...
pub fn sequential_ids() -> NextId {
    let counter = Arc::new(AtomicUsize::new(0));
    Arc::new(move || format!("id-{}", counter.fetch_add(1, Ordering::SeqCst) + 1))
}

pub struct Harness {
    pub db: InMemoryDatabase,
    pub stores: Stores<InMemoryTx>,
    pub generator: Arc<FakeGenerator>,
    pub events: Arc<InMemoryEventBus>,
    pub posts: PostService<InMemoryTx>,
    pub engagement: EngagementService<InMemoryTx>,
    pub queries: PostQueries<InMemoryTx>,
}

impl Harness {
    pub fn new() -> Self {
        let db = InMemoryDatabase::new();
        let stores = memory_stores(&db);
        let generator = Arc::new(FakeGenerator::default());
        let events = Arc::new(InMemoryEventBus::new());
        let ids = sequential_ids();

        Self {
            posts: PostService::new(
                stores.posts.clone(),
                generator.clone(),
                events.clone(),
                ids.clone(),
            ),
            engagement: EngagementService::new(stores.clone(), ids),
            queries: PostQueries::new(stores.clone()),
            db,
            stores,
            generator,
            events,
        }
    }

    /// Same stores, but posts go through `bus`.
    pub fn posts_with_bus(&self, bus: Arc<dyn EventBus>) -> PostService<InMemoryTx> {
        PostService::new(
            self.stores.posts.clone(),
            self.generator.clone(),
            bus,
            sequential_ids(),
        )
    }

    pub async fn user(&self, id: &str, username: &str) -> User {
        let user = User::new(id, username, format!("{username}@example.com")).unwrap();
        self.stores.users.create(None, &user).await.unwrap();
        user
    }

    pub async fn post(&self, author_id: &str, slug: &str, publish: bool) -> PostView {
        self.posts
            .create(CreatePost {
                author_id: author_id.to_string(),
                title: format!("Title {slug}"),
                slug: slug.to_string(),
                raw_markdown: format!("Body of {slug}"),
                publish,
            })
            .await
            .unwrap()
    }
}
