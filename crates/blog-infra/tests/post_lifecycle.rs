mod common;

use std::sync::Arc;
use std::time::Duration;

use blog_core::DomainError;
use blog_core::domain::DomainEvent;
use blog_core::ports::{Filter, Sort, Store};
use blog_core::services::{CreatePost, PostService, UpdatePost};

use common::{BrokenTagsGenerator, FailingEventBus, Harness, sequential_ids};

fn hello() -> CreatePost {
    CreatePost {
        author_id: "u1".to_string(),
        title: "Hello".to_string(),
        slug: "hello".to_string(),
        raw_markdown: "world".to_string(),
        publish: false,
    }
}

#[tokio::test]
async fn test_create_draft_enriches_and_records_event() {
    let h = Harness::new();

    let post = h.posts.create(hello()).await.unwrap();

    assert!(post.published_at.is_none());
    assert_eq!(post.tags, vec!["a", "b"]);
    assert_eq!(post.summary, "summary of world");
    assert_eq!(h.generator.calls(), 2);

    let stored = h
        .stores
        .posts
        .find_one(None, &Filter::eq("slug", "hello"), &Sort::none())
        .await
        .unwrap();
    assert_eq!(stored.id, post.id);
    assert_eq!(
        h.events.events(),
        vec![DomainEvent::PostCreated { post_id: post.id }]
    );
}

#[tokio::test]
async fn test_create_published_sets_timestamp() {
    let h = Harness::new();

    let post = h
        .posts
        .create(CreatePost {
            publish: true,
            ..hello()
        })
        .await
        .unwrap();

    assert!(post.published_at.is_some());
}

#[tokio::test]
async fn test_create_duplicate_slug_fails() {
    let h = Harness::new();
    h.posts.create(hello()).await.unwrap();

    let result = h.posts.create(hello()).await;

    assert!(matches!(result, Err(DomainError::Storage { .. })));
    let count = h.stores.posts.count(None, &Filter::All).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_create_with_failing_generator_persists_nothing() {
    let h = Harness::new();
    let posts = PostService::new(
        h.stores.posts.clone(),
        Arc::new(BrokenTagsGenerator),
        h.events.clone(),
        sequential_ids(),
    );

    let result = posts.create(hello()).await;

    assert!(matches!(result, Err(DomainError::Generation(_))));
    assert_eq!(h.stores.posts.count(None, &Filter::All).await.unwrap(), 0);
    assert!(h.events.events().is_empty());
}

#[tokio::test]
async fn test_update_publish_sets_published_at_and_dispatches_once() {
    let h = Harness::new();
    let created = h.posts.create(hello()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let updated = h
        .posts
        .update(UpdatePost {
            slug: "hello".to_string(),
            user_id: "u1".to_string(),
            publish: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(updated.published_at.is_some());
    assert!(updated.updated_at > created.updated_at);

    let updates: Vec<_> = h
        .events
        .events()
        .into_iter()
        .filter(|e| matches!(e, DomainEvent::PostUpdated { .. }))
        .collect();
    assert_eq!(
        updates,
        vec![DomainEvent::PostUpdated {
            post_id: created.id
        }]
    );
}

#[tokio::test]
async fn test_update_unpublish_clears_published_at() {
    let h = Harness::new();
    h.posts
        .create(CreatePost {
            publish: true,
            ..hello()
        })
        .await
        .unwrap();

    let updated = h
        .posts
        .update(UpdatePost {
            slug: "hello".to_string(),
            user_id: "u1".to_string(),
            publish: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(updated.published_at.is_none());
}

#[tokio::test]
async fn test_update_by_other_user_is_forbidden_before_generation() {
    let h = Harness::new();
    h.posts.create(hello()).await.unwrap();
    let calls_after_create = h.generator.calls();

    let result = h
        .posts
        .update(UpdatePost {
            slug: "hello".to_string(),
            user_id: "intruder".to_string(),
            title: Some("New".to_string()),
            new_slug: Some("new".to_string()),
            raw_markdown: Some("new body".to_string()),
            publish: None,
        })
        .await;

    assert!(matches!(result, Err(DomainError::Forbidden(_))));
    assert_eq!(h.generator.calls(), calls_after_create);
}

#[tokio::test]
async fn test_update_missing_post_is_not_found() {
    let h = Harness::new();

    let result = h
        .posts
        .update(UpdatePost {
            slug: "nope".to_string(),
            user_id: "u1".to_string(),
            ..Default::default()
        })
        .await;

    assert!(matches!(
        result,
        Err(DomainError::NotFound {
            entity_type: "Post",
            ..
        })
    ));
}

#[tokio::test]
async fn test_update_with_partial_content_only_publishes() {
    let h = Harness::new();
    let created = h.posts.create(hello()).await.unwrap();
    let calls_after_create = h.generator.calls();

    let updated = h
        .posts
        .update(UpdatePost {
            slug: "hello".to_string(),
            user_id: "u1".to_string(),
            title: Some("New title".to_string()),
            new_slug: Some("new-slug".to_string()),
            raw_markdown: None,
            publish: Some(true),
        })
        .await
        .unwrap();

    assert_eq!(updated.title, created.title);
    assert_eq!(updated.slug, "hello");
    assert!(updated.published_at.is_some());
    assert_eq!(h.generator.calls(), calls_after_create);
}

#[tokio::test]
async fn test_update_full_content_regenerates() {
    let h = Harness::new();
    h.posts.create(hello()).await.unwrap();

    let updated = h
        .posts
        .update(UpdatePost {
            slug: "hello".to_string(),
            user_id: "u1".to_string(),
            title: Some("Renamed".to_string()),
            new_slug: Some("renamed".to_string()),
            raw_markdown: Some("fresh body".to_string()),
            publish: None,
        })
        .await
        .unwrap();

    assert_eq!(updated.slug, "renamed");
    assert_eq!(updated.summary, "summary of fresh body");
    assert!(updated.published_at.is_none());
    assert_eq!(h.generator.calls(), 4);
}

#[tokio::test]
async fn test_publish_override_matching_state_leaves_post_untouched() {
    let h = Harness::new();
    let draft = h.posts.create(hello()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let updated = h
        .posts
        .update(UpdatePost {
            slug: "hello".to_string(),
            user_id: "u1".to_string(),
            publish: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(updated.published_at.is_none());
    assert_eq!(updated.updated_at, draft.updated_at);

    h.posts
        .create(CreatePost {
            slug: "live".to_string(),
            publish: true,
            ..hello()
        })
        .await
        .unwrap();
    let live = h
        .stores
        .posts
        .find_one(None, &Filter::eq("slug", "live"), &Sort::none())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let republished = h
        .posts
        .update(UpdatePost {
            slug: "live".to_string(),
            user_id: "u1".to_string(),
            publish: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(republished.published_at, live.published_at);
    assert_eq!(republished.updated_at, live.updated_at);
}

#[tokio::test]
async fn test_create_dispatch_failure_keeps_saved_post() {
    let h = Harness::new();
    let posts = h.posts_with_bus(Arc::new(FailingEventBus));

    let result = posts.create(hello()).await;

    assert!(matches!(result, Err(DomainError::Dispatch { .. })));
    assert_eq!(h.stores.posts.count(None, &Filter::All).await.unwrap(), 1);
}

#[tokio::test]
async fn test_dispatch_failure_after_save_is_reported() {
    let h = Harness::new();
    h.posts.create(hello()).await.unwrap();
    let posts = h.posts_with_bus(Arc::new(FailingEventBus));

    let result = posts
        .update(UpdatePost {
            slug: "hello".to_string(),
            user_id: "u1".to_string(),
            publish: Some(true),
            ..Default::default()
        })
        .await;

    assert!(matches!(result, Err(DomainError::Dispatch { .. })));

    // The row was already written.
    let stored = h
        .stores
        .posts
        .find_one(None, &Filter::eq("slug", "hello"), &Sort::none())
        .await
        .unwrap();
    assert!(stored.published_at.is_some());
}

#[tokio::test]
async fn test_delete_requires_author() {
    let h = Harness::new();
    h.posts.create(hello()).await.unwrap();

    let forbidden = h.posts.delete("hello", "intruder").await;
    assert!(matches!(forbidden, Err(DomainError::Forbidden(_))));

    h.posts.delete("hello", "u1").await.unwrap();
    assert_eq!(h.stores.posts.count(None, &Filter::All).await.unwrap(), 0);
}
