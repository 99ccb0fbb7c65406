use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ports::Record;

/// Post entity - a blog post with its generated summary and tags.
///
/// `published_at == None` means the post is a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub slug: String,
    pub raw_markdown: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub raw_markdown_audio_url: Option<String>,
    pub summary_audio_url: Option<String>,
}

fn require(value: &str, field: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_content(
    title: &str,
    slug: &str,
    raw_markdown: &str,
    summary: &str,
    tags: &[String],
) -> Result<(), DomainError> {
    require(title, "title")?;
    require(slug, "slug")?;
    require(raw_markdown, "raw markdown")?;
    require(summary, "summary")?;
    if tags.is_empty() {
        return Err(DomainError::validation("tags cannot be empty"));
    }
    Ok(())
}

impl Post {
    /// Create a new draft post. Every field is required and `tags` must not be empty.
    pub fn new(
        id: impl Into<String>,
        author_id: impl Into<String>,
        title: impl Into<String>,
        slug: impl Into<String>,
        raw_markdown: impl Into<String>,
        summary: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<Self, DomainError> {
        let (id, author_id) = (id.into(), author_id.into());
        let (title, slug) = (title.into(), slug.into());
        let (raw_markdown, summary) = (raw_markdown.into(), summary.into());

        require(&id, "id")?;
        require(&author_id, "author ID")?;
        require_content(&title, &slug, &raw_markdown, &summary, &tags)?;

        let now = Utc::now();
        Ok(Self {
            id,
            author_id,
            title,
            slug,
            raw_markdown,
            summary,
            tags,
            published_at: None,
            created_at: now,
            updated_at: now,
            raw_markdown_audio_url: None,
            summary_audio_url: None,
        })
    }

    /// Create a post that is already published at `published_at`.
    #[allow(clippy::too_many_arguments)]
    pub fn new_published(
        id: impl Into<String>,
        author_id: impl Into<String>,
        title: impl Into<String>,
        slug: impl Into<String>,
        raw_markdown: impl Into<String>,
        summary: impl Into<String>,
        tags: Vec<String>,
        published_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let mut post = Self::new(id, author_id, title, slug, raw_markdown, summary, tags)?;
        post.published_at = Some(published_at);
        Ok(post)
    }

    /// Set the publication time. Calling it again overwrites the timestamp.
    pub fn publish(&mut self, at: DateTime<Utc>) {
        self.published_at = Some(at);
        self.updated_at = Utc::now();
    }

    /// Move the post back to draft.
    pub fn unpublish(&mut self) {
        self.published_at = None;
        self.updated_at = Utc::now();
    }

    /// Replace the content fields. Leaves `published_at` untouched.
    pub fn update(
        &mut self,
        title: impl Into<String>,
        slug: impl Into<String>,
        raw_markdown: impl Into<String>,
        summary: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<(), DomainError> {
        let (title, slug) = (title.into(), slug.into());
        let (raw_markdown, summary) = (raw_markdown.into(), summary.into());
        require_content(&title, &slug, &raw_markdown, &summary, &tags)?;

        self.title = title;
        self.slug = slug;
        self.raw_markdown = raw_markdown;
        self.summary = summary;
        self.tags = tags;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// The generated tags, in generation order. Empty when none were stored.
    pub fn its_tags(&self) -> Vec<String> {
        self.tags.clone()
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}

impl Record for Post {
    type Key = String;
    const TABLE: &'static str = "posts";
    const UNIQUE: &'static [&'static [&'static str]] = &[&["slug"]];

    fn key(&self) -> String {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tags() -> Vec<String> {
        vec!["rust".to_string(), "async".to_string(), "web".to_string()]
    }

    fn draft() -> Post {
        Post::new("p1", "u1", "Hello", "hello", "world", "S", tags()).unwrap()
    }

    #[test]
    fn test_new_post_is_draft_and_keeps_tag_order() {
        let post = draft();

        assert!(post.published_at.is_none());
        assert_eq!(post.created_at, post.updated_at);
        assert_eq!(post.its_tags(), tags());
    }

    #[test]
    fn test_new_post_rejects_each_empty_field() {
        let cases = [
            ("", "u1", "t", "s", "c", "S"),
            ("p1", "", "t", "s", "c", "S"),
            ("p1", "u1", "", "s", "c", "S"),
            ("p1", "u1", "t", "", "c", "S"),
            ("p1", "u1", "t", "s", "", "S"),
            ("p1", "u1", "t", "s", "c", ""),
        ];

        for (id, author, title, slug, content, summary) in cases {
            let result = Post::new(id, author, title, slug, content, summary, tags());
            assert!(matches!(result, Err(DomainError::Validation(_))));
        }
    }

    #[test]
    fn test_new_post_rejects_empty_tags() {
        let result = Post::new("p1", "u1", "t", "s", "c", "S", vec![]);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_new_published_post() {
        let at = Utc::now() - Duration::hours(1);
        let post = Post::new_published("p1", "u1", "t", "s", "c", "S", tags(), at).unwrap();
        assert_eq!(post.published_at, Some(at));
    }

    #[test]
    fn test_publish_overwrites_timestamp() {
        let mut post = draft();
        let first = Utc::now();
        let second = first + Duration::minutes(5);

        post.publish(first);
        post.publish(second);

        assert_eq!(post.published_at, Some(second));
        assert!(post.updated_at >= post.created_at);
    }

    #[test]
    fn test_unpublish_clears_timestamp() {
        let mut post = draft();
        post.publish(Utc::now());
        post.unpublish();
        assert!(!post.is_published());
    }

    #[test]
    fn test_update_replaces_content_but_not_publication() {
        let mut post = draft();
        let at = Utc::now();
        post.publish(at);

        post.update("New", "new", "body", "S2", vec!["x".to_string()])
            .unwrap();

        assert_eq!(post.title, "New");
        assert_eq!(post.slug, "new");
        assert_eq!(post.summary, "S2");
        assert_eq!(post.its_tags(), vec!["x".to_string()]);
        assert_eq!(post.published_at, Some(at));
    }

    #[test]
    fn test_update_validates_fields() {
        let mut post = draft();
        let result = post.update("New", "", "body", "S2", vec!["x".to_string()]);

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(post.slug, "hello");
    }

    #[test]
    fn test_its_tags_empty_when_none_stored() {
        let mut post = draft();
        post.tags.clear();
        assert!(post.its_tags().is_empty());
    }
}
