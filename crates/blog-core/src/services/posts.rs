//! Post lifecycle - create, update and delete with content enrichment.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{DomainEvent, Post};
use crate::error::DomainError;
use crate::ports::{ContentGenerator, EventBus, Filter, Sort};

use super::{NextId, StoreRef};

/// Input for [`PostService::create`].
#[derive(Debug, Clone)]
pub struct CreatePost {
    pub author_id: String,
    pub title: String,
    pub slug: String,
    pub raw_markdown: String,
    pub publish: bool,
}

/// Input for [`PostService::update`].
///
/// Content is only regenerated when `title`, `new_slug` and `raw_markdown`
/// are all present and non-empty.
#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    pub slug: String,
    pub user_id: String,
    pub title: Option<String>,
    pub new_slug: Option<String>,
    pub raw_markdown: Option<String>,
    pub publish: Option<bool>,
}

impl UpdatePost {
    fn content(&self) -> Option<(&str, &str, &str)> {
        fn present(field: &Option<String>) -> Option<&str> {
            field.as_deref().filter(|v| !v.is_empty())
        }
        Some((
            present(&self.title)?,
            present(&self.new_slug)?,
            present(&self.raw_markdown)?,
        ))
    }
}

/// Full post projection returned by create and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub raw_markdown: String,
    pub summary: String,
    pub author_id: String,
    pub tags: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            slug: post.slug.clone(),
            raw_markdown: post.raw_markdown.clone(),
            summary: post.summary.clone(),
            author_id: post.author_id.clone(),
            tags: post.its_tags(),
            published_at: post.published_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Orchestrates the post entity, its store, the content generator and the event bus.
pub struct PostService<Tx> {
    posts: StoreRef<Post, Tx>,
    generator: Arc<dyn ContentGenerator>,
    events: Arc<dyn EventBus>,
    next_id: NextId,
}

impl<Tx: Send + Sync + 'static> PostService<Tx> {
    pub fn new(
        posts: StoreRef<Post, Tx>,
        generator: Arc<dyn ContentGenerator>,
        events: Arc<dyn EventBus>,
        next_id: NextId,
    ) -> Self {
        Self {
            posts,
            generator,
            events,
            next_id,
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Post, DomainError> {
        self.posts
            .find_one(None, &Filter::eq("slug", slug), &Sort::none())
            .await
            .map_err(DomainError::lookup("Post", slug))
    }

    async fn enrich(&self, raw_markdown: &str) -> Result<(String, Vec<String>), DomainError> {
        let summary = self.generator.generate_summary(raw_markdown).await?;
        let tags = self.generator.generate_tags(raw_markdown).await?;
        Ok((summary, tags))
    }

    async fn dispatch(&self, event: DomainEvent) -> Result<(), DomainError> {
        self.events
            .process_events(std::slice::from_ref(&event))
            .await
            .map_err(|source| DomainError::Dispatch {
                context: "failed to process events",
                source,
            })
    }

    /// Generate summary and tags, then persist a new post.
    ///
    /// `PostCreated` is dispatched after the row is saved, so a failing bus
    /// reports an error for a post that already exists.
    pub async fn create(&self, req: CreatePost) -> Result<PostView, DomainError> {
        let post_id = (self.next_id)();
        let (summary, tags) = self.enrich(&req.raw_markdown).await?;

        let post = if req.publish {
            Post::new_published(
                post_id,
                req.author_id,
                req.title,
                req.slug,
                req.raw_markdown,
                summary,
                tags,
                Utc::now(),
            )?
        } else {
            Post::new(
                post_id,
                req.author_id,
                req.title,
                req.slug,
                req.raw_markdown,
                summary,
                tags,
            )?
        };

        self.posts
            .create(None, &post)
            .await
            .map_err(DomainError::storage("failed to save post"))?;
        tracing::info!(post_id = %post.id, slug = %post.slug, published = post.is_published(), "Post created");

        self.dispatch(DomainEvent::PostCreated {
            post_id: post.id.clone(),
        })
        .await?;

        Ok(PostView::from(&post))
    }

    /// Apply content and publication changes to the post at `req.slug`.
    ///
    /// The `PostUpdated` dispatch happens after the row is saved; a dispatch
    /// failure is reported even though the update is already persisted.
    pub async fn update(&self, req: UpdatePost) -> Result<PostView, DomainError> {
        let mut post = self.find_by_slug(&req.slug).await?;
        if post.author_id != req.user_id {
            return Err(DomainError::Forbidden(
                "you can only update your own posts".to_string(),
            ));
        }

        if let Some((title, new_slug, raw_markdown)) = req.content() {
            let (summary, tags) = self.enrich(raw_markdown).await?;
            post.update(title, new_slug, raw_markdown, summary, tags)?;
        }

        // An override matching the current state leaves the post untouched.
        match req.publish {
            Some(true) if !post.is_published() => post.publish(Utc::now()),
            Some(false) if post.is_published() => post.unpublish(),
            _ => {}
        }

        self.posts
            .update(None, &post)
            .await
            .map_err(DomainError::storage("failed to save post"))?;
        tracing::info!(post_id = %post.id, slug = %post.slug, "Post updated");

        self.dispatch(DomainEvent::PostUpdated {
            post_id: post.id.clone(),
        })
        .await?;

        Ok(PostView::from(&post))
    }

    /// Hard-delete the post at `slug`. Only its author may do this.
    pub async fn delete(&self, slug: &str, user_id: &str) -> Result<(), DomainError> {
        let post = self.find_by_slug(slug).await?;
        if post.author_id != user_id {
            return Err(DomainError::Forbidden(
                "you can only delete your own posts".to_string(),
            ));
        }

        self.posts
            .delete_by_pk(None, &post.id)
            .await
            .map_err(DomainError::storage("failed to delete post"))?;
        tracing::info!(post_id = %post.id, "Post deleted");
        Ok(())
    }
}
