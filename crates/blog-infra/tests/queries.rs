mod common;

use std::time::Duration;

use blog_core::DomainError;
use blog_core::ports::Direction;
use blog_core::services::{ListPostsQuery, PostStatus};

use common::Harness;

fn page(order: Direction) -> ListPostsQuery {
    ListPostsQuery {
        page: 1,
        per_page: 20,
        order,
    }
}

#[tokio::test]
async fn test_list_posts_only_published_with_counts() {
    let h = Harness::new();
    h.user("u1", "alice").await;
    h.user("u2", "bob").await;
    h.post("u1", "first", true).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    h.post("u1", "second", true).await;
    h.post("u1", "draft", false).await;

    h.engagement.toggle_like("first", "u2").await.unwrap();
    h.engagement
        .create_comment("first", "u2", "hi", None)
        .await
        .unwrap();

    let newest = h.queries.list_posts(page(Direction::Desc)).await.unwrap();
    assert_eq!(newest.total, 2);
    let slugs: Vec<_> = newest.items.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["second", "first"]);

    let first = &newest.items[1];
    assert_eq!(first.author, "alice");
    assert_eq!(first.like_count, 1);
    assert_eq!(first.comment_count, 1);

    let oldest = h.queries.list_posts(page(Direction::Asc)).await.unwrap();
    assert_eq!(oldest.items[0].slug, "first");
}

#[tokio::test]
async fn test_list_posts_paginates() {
    let h = Harness::new();
    h.user("u1", "alice").await;
    for slug in ["a", "b", "c"] {
        h.post("u1", slug, true).await;
    }

    let second_page = h
        .queries
        .list_posts(ListPostsQuery {
            page: 2,
            per_page: 2,
            order: Direction::Desc,
        })
        .await
        .unwrap();

    assert_eq!(second_page.total, 3);
    assert_eq!(second_page.items.len(), 1);
}

#[tokio::test]
async fn test_missing_author_fails_listing_but_not_profile() {
    let h = Harness::new();
    h.user("reader", "bob").await;
    // Author row never created.
    h.post("ghost", "orphan", true).await;
    h.engagement.bookmark_post("orphan", "reader").await.unwrap();

    let listing = h.queries.list_posts(page(Direction::Desc)).await;
    assert!(matches!(listing, Err(DomainError::AuthorNotFound { .. })));

    let profile = h.queries.get_profile("reader").await.unwrap();
    assert_eq!(profile.bookmarks.len(), 1);
    assert!(profile.following.is_empty());
}

#[tokio::test]
async fn test_profile_skips_deleted_posts() {
    let h = Harness::new();
    h.user("u1", "alice").await;
    h.user("reader", "bob").await;
    h.post("u1", "kept", true).await;
    h.post("u1", "gone", true).await;
    h.engagement.toggle_like("kept", "reader").await.unwrap();
    h.engagement.toggle_like("gone", "reader").await.unwrap();
    h.engagement.follow_user("u1", "reader").await.unwrap();

    h.posts.delete("gone", "u1").await.unwrap();

    let profile = h.queries.get_profile("reader").await.unwrap();
    let liked: Vec<_> = profile
        .liked_posts
        .iter()
        .map(|p| p.title.as_str())
        .collect();
    assert_eq!(liked, vec!["Title kept"]);
    assert_eq!(profile.following[0].username, "alice");
}

#[tokio::test]
async fn test_get_post_by_slug_with_comment_thread() {
    let h = Harness::new();
    h.user("u1", "alice").await;
    h.user("u2", "bob").await;
    h.post("u1", "hello", false).await;

    let root = h
        .engagement
        .create_comment("hello", "u2", "first", None)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    h.engagement
        .create_comment("hello", "u1", "second", Some(&root.id))
        .await
        .unwrap();
    h.engagement.toggle_like("hello", "u2").await.unwrap();

    let detail = h.queries.get_post_by_slug("hello").await.unwrap();
    assert_eq!(detail.author.name, "alice");
    assert!(detail.published_at.is_none());
    assert_eq!(detail.likes_count, 1);
    let bodies: Vec<_> = detail.comments.iter().map(|c| c.body.as_str()).collect();
    assert_eq!(bodies, vec!["first", "second"]);
    assert_eq!(detail.comments[0].author.name, "bob");
}

#[tokio::test]
async fn test_list_my_posts_includes_drafts() {
    let h = Harness::new();
    h.user("u1", "alice").await;
    h.post("u1", "draft", false).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    h.post("u1", "live", true).await;
    h.post("someone-else", "other", true).await;

    let mine = h
        .queries
        .list_my_posts("u1", page(Direction::Desc))
        .await
        .unwrap();

    assert_eq!(mine.total, 2);
    assert_eq!(mine.items[0].slug, "live");
    assert_eq!(mine.items[0].status, PostStatus::Published);
    assert_eq!(mine.items[1].status, PostStatus::Draft);
}

#[tokio::test]
async fn test_author_info() {
    let h = Harness::new();
    h.user("u1", "alice").await;
    h.user("u2", "bob").await;
    for slug in ["one", "two", "three", "four", "five", "six"] {
        h.post("u1", slug, true).await;
    }
    h.post("u1", "draft", false).await;
    h.engagement.follow_user("u1", "u2").await.unwrap();
    h.engagement.toggle_like("one", "u2").await.unwrap();

    let info = h.queries.get_author_info("u1").await.unwrap();

    assert_eq!(info.name, "alice");
    assert_eq!(info.posts_count, 6);
    assert_eq!(info.followers_count, 1);
    assert_eq!(info.top_posts.len(), 5);

    let missing = h.queries.get_author_info("nobody").await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
}
