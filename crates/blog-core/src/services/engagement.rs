//! Reader interactions: comments, likes, bookmarks and follows.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Bookmark, Comment, Follow, Post, PostLike};
use crate::error::{DomainError, RepoError};
use crate::ports::{Filter, Record, Sort};

use super::{AuthorRef, NextId, Stores};

#[derive(Debug, Clone, Serialize)]
pub struct CommentCreated {
    pub id: String,
    pub post_slug: String,
    pub author: AuthorRef,
    pub parent_id: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookmarkState {
    pub bookmarked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowState {
    pub following: bool,
    pub followers_count: u64,
}

/// A duplicate insert rejected by the store's uniqueness rules.
fn conflict(msg: &'static str) -> impl FnOnce(RepoError) -> DomainError {
    move |e| match e {
        RepoError::Constraint(_) => DomainError::Conflict(msg.to_string()),
        e => DomainError::Storage {
            context: "failed to save",
            source: e,
        },
    }
}

pub struct EngagementService<Tx> {
    stores: Stores<Tx>,
    next_id: NextId,
}

impl<Tx: Send + Sync + 'static> EngagementService<Tx> {
    pub fn new(stores: Stores<Tx>, next_id: NextId) -> Self {
        Self { stores, next_id }
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Post, DomainError> {
        self.stores
            .posts
            .find_one(None, &Filter::eq("slug", slug), &Sort::none())
            .await
            .map_err(DomainError::lookup("Post", slug))
    }

    fn pair(user_id: &str, post_id: &str) -> Filter {
        Filter::eq("user_id", user_id).and(Filter::eq("post_id", post_id))
    }

    /// Add a root comment, or a reply when `parent_id` is given.
    pub async fn create_comment(
        &self,
        slug: &str,
        user_id: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<CommentCreated, DomainError> {
        let post = self.post_by_slug(slug).await?;
        let author = self
            .stores
            .users
            .find_by_pk(None, &user_id.to_string())
            .await
            .map_err(DomainError::lookup("User", user_id))?;

        let id = (self.next_id)();
        let comment = match parent_id {
            Some(parent_id) => Comment::new_reply(id, &post.id, user_id, parent_id, body)?,
            None => Comment::new(id, &post.id, user_id, body)?,
        };
        self.stores
            .comments
            .create(None, &comment)
            .await
            .map_err(DomainError::storage("failed to save comment"))?;
        tracing::debug!(comment_id = %comment.id, post_id = %post.id, "Comment created");

        Ok(CommentCreated {
            id: comment.id,
            post_slug: slug.to_string(),
            author: AuthorRef::from(&author),
            parent_id: comment.parent_id,
            body: comment.body,
            created_at: comment.created_at,
        })
    }

    /// Like the post if the user has not yet, otherwise remove the like.
    ///
    /// The check and the write are separate calls. A concurrent duplicate
    /// insert is stopped by the `(user_id, post_id)` uniqueness rule and
    /// surfaces as `Conflict`.
    pub async fn toggle_like(&self, slug: &str, user_id: &str) -> Result<LikeState, DomainError> {
        let post = self.post_by_slug(slug).await?;

        let existing = match self
            .stores
            .likes
            .find_one(None, &Self::pair(user_id, &post.id), &Sort::none())
            .await
        {
            Ok(like) => Some(like),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(DomainError::storage("failed to look up like")(e)),
        };

        let liked = match existing {
            Some(like) => {
                self.stores
                    .likes
                    .delete_by_pk(None, &like.id)
                    .await
                    .map_err(DomainError::storage("failed to remove like"))?;
                false
            }
            None => {
                let like = PostLike::new((self.next_id)(), user_id, &post.id)?;
                self.stores
                    .likes
                    .create(None, &like)
                    .await
                    .map_err(conflict("post is already liked"))?;
                true
            }
        };

        let likes_count = self
            .stores
            .likes
            .count(None, &Filter::eq("post_id", &post.id))
            .await
            .map_err(DomainError::storage("failed to count likes"))?;
        Ok(LikeState { liked, likes_count })
    }

    pub async fn bookmark_post(
        &self,
        slug: &str,
        user_id: &str,
    ) -> Result<BookmarkState, DomainError> {
        let post = self.post_by_slug(slug).await?;

        let existing = self
            .stores
            .bookmarks
            .count(None, &Self::pair(user_id, &post.id))
            .await
            .map_err(DomainError::storage("failed to look up bookmark"))?;
        if existing > 0 {
            return Err(DomainError::Conflict(
                "post is already bookmarked".to_string(),
            ));
        }

        let bookmark = Bookmark::new((self.next_id)(), user_id, &post.id)?;
        self.stores
            .bookmarks
            .create(None, &bookmark)
            .await
            .map_err(conflict("post is already bookmarked"))?;

        Ok(BookmarkState {
            bookmarked: true,
            bookmark_id: Some(bookmark.id),
            post_slug: Some(slug.to_string()),
            created_at: Some(bookmark.created_at),
        })
    }

    pub async fn unbookmark_post(
        &self,
        slug: &str,
        user_id: &str,
    ) -> Result<BookmarkState, DomainError> {
        let post = self.post_by_slug(slug).await?;

        let bookmark = self
            .stores
            .bookmarks
            .find_one(None, &Self::pair(user_id, &post.id), &Sort::none())
            .await
            .map_err(DomainError::lookup("Bookmark", slug))?;
        self.stores
            .bookmarks
            .delete_by_pk(None, &bookmark.id)
            .await
            .map_err(DomainError::storage("failed to delete bookmark"))?;

        Ok(BookmarkState {
            bookmarked: false,
            bookmark_id: None,
            post_slug: None,
            created_at: None,
        })
    }

    async fn followers_count(&self, author_id: &str) -> Result<u64, DomainError> {
        self.stores
            .follows
            .count(None, &Filter::eq("followee_id", author_id))
            .await
            .map_err(DomainError::storage("failed to count followers"))
    }

    /// `user_id` starts following `author_id`. Both users must exist.
    pub async fn follow_user(
        &self,
        author_id: &str,
        user_id: &str,
    ) -> Result<FollowState, DomainError> {
        for id in [author_id, user_id] {
            self.stores
                .users
                .find_by_pk(None, &id.to_string())
                .await
                .map_err(DomainError::lookup("User", id))?;
        }

        let follow = Follow::new(user_id, author_id)?;
        match self.stores.follows.find_by_pk(None, &follow.key()).await {
            Ok(_) => {
                return Err(DomainError::Conflict(
                    "user is already following this author".to_string(),
                ));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(DomainError::storage("failed to look up follow")(e)),
        }

        self.stores
            .follows
            .create(None, &follow)
            .await
            .map_err(conflict("user is already following this author"))?;
        tracing::debug!(follower_id = %user_id, followee_id = %author_id, "Follow created");

        Ok(FollowState {
            following: true,
            followers_count: self.followers_count(author_id).await?,
        })
    }

    pub async fn unfollow_user(
        &self,
        author_id: &str,
        user_id: &str,
    ) -> Result<FollowState, DomainError> {
        self.stores
            .users
            .find_by_pk(None, &author_id.to_string())
            .await
            .map_err(DomainError::lookup("User", author_id))?;

        let key = (user_id.to_string(), author_id.to_string());
        self.stores
            .follows
            .delete_by_pk(None, &key)
            .await
            .map_err(DomainError::lookup("Follow", format!("{user_id} -> {author_id}")))?;

        Ok(FollowState {
            following: false,
            followers_count: self.followers_count(author_id).await?,
        })
    }
}
