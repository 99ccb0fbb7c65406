//! Read-side aggregation. Joins happen here, one batched lookup per related table.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Post, User};
use crate::error::DomainError;
use crate::ports::{Direction, Filter, Page, Sort};

use super::Stores;

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub items: Vec<T>,
}

/// Already-normalised listing parameters.
#[derive(Debug, Clone, Copy)]
pub struct ListPostsQuery {
    pub page: u64,
    pub per_page: u64,
    pub order: Direction,
}

impl ListPostsQuery {
    fn window(&self) -> Page {
        Page::from_page(self.page, self.per_page)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishedPostItem {
    pub title: String,
    pub author: String,
    pub author_id: String,
    pub published_at: Option<DateTime<Utc>>,
    pub slug: String,
    pub like_count: u64,
    pub comment_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRef {
    pub id: String,
    pub name: String,
}

impl From<&User> for AuthorRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: String,
    pub author: AuthorRef,
    pub parent_id: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub slug: String,
    pub raw_markdown: String,
    pub author: AuthorRef,
    pub published_at: Option<DateTime<Utc>>,
    pub likes_count: u64,
    pub comments: Vec<CommentView>,
    pub raw_markdown_audio_url: Option<String>,
    pub summary_audio_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

#[derive(Debug, Clone, Serialize)]
pub struct MyPostItem {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: PostStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub likes_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorInfo {
    pub id: String,
    pub name: String,
    pub posts_count: u64,
    pub followers_count: u64,
    pub top_posts: Vec<TopPost>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUser {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfilePost {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub following: Vec<ProfileUser>,
    pub bookmarks: Vec<ProfilePost>,
    pub liked_posts: Vec<ProfilePost>,
}

const TOP_POSTS: u64 = 5;

fn published() -> Filter {
    Filter::is_not_null("published_at")
}

/// Distinct values in first-seen order.
fn distinct<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

fn tally<'a>(keys: impl IntoIterator<Item = &'a str>) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for key in keys {
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Listing and detail views over posts, users and engagement records.
pub struct PostQueries<Tx> {
    stores: Stores<Tx>,
}

impl<Tx: Send + Sync + 'static> PostQueries<Tx> {
    pub fn new(stores: Stores<Tx>) -> Self {
        Self { stores }
    }

    async fn users_by_id(&self, ids: Vec<String>) -> Result<HashMap<String, User>, DomainError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = self
            .stores
            .users
            .find_all(None, &Filter::is_in("id", ids), &Sort::none())
            .await
            .map_err(DomainError::storage("failed to load authors"))?;
        Ok(users.into_iter().map(|u| (u.id.clone(), u)).collect())
    }

    /// Published posts, newest or oldest first, with author and engagement counts.
    ///
    /// A post whose author row is missing fails the whole listing.
    pub async fn list_posts(
        &self,
        query: ListPostsQuery,
    ) -> Result<Paged<PublishedPostItem>, DomainError> {
        let filter = published();
        let posts = self
            .stores
            .posts
            .find_paginated(
                None,
                query.window(),
                &filter,
                &Sort::by("published_at", query.order),
            )
            .await
            .map_err(DomainError::storage("failed to list posts"))?;
        let total = self
            .stores
            .posts
            .count(None, &filter)
            .await
            .map_err(DomainError::storage("failed to count posts"))?;

        let mut page = Paged {
            page: query.page,
            per_page: query.per_page,
            total,
            items: Vec::with_capacity(posts.len()),
        };
        if posts.is_empty() {
            return Ok(page);
        }

        let authors = self
            .users_by_id(distinct(posts.iter().map(|p| p.author_id.as_str())))
            .await?;

        let post_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        let by_post = Filter::is_in("post_id", post_ids);
        let likes = self
            .stores
            .likes
            .find_all(None, &by_post, &Sort::none())
            .await
            .map_err(DomainError::storage("failed to count likes"))?;
        let comments = self
            .stores
            .comments
            .find_all(None, &by_post, &Sort::none())
            .await
            .map_err(DomainError::storage("failed to count comments"))?;
        let like_counts = tally(likes.iter().map(|l| l.post_id.as_str()));
        let comment_counts = tally(comments.iter().map(|c| c.post_id.as_str()));

        for post in posts {
            let author =
                authors
                    .get(&post.author_id)
                    .ok_or_else(|| DomainError::AuthorNotFound {
                        post_id: post.id.clone(),
                        author_id: post.author_id.clone(),
                    })?;
            page.items.push(PublishedPostItem {
                like_count: like_counts.get(&post.id).copied().unwrap_or(0),
                comment_count: comment_counts.get(&post.id).copied().unwrap_or(0),
                title: post.title,
                author: author.username.clone(),
                author_id: author.id.clone(),
                published_at: post.published_at,
                slug: post.slug,
            });
        }
        Ok(page)
    }

    /// Single post with its author, like count and comment thread (oldest first).
    pub async fn get_post_by_slug(&self, slug: &str) -> Result<PostDetail, DomainError> {
        let post = self
            .stores
            .posts
            .find_one(None, &Filter::eq("slug", slug), &Sort::none())
            .await
            .map_err(DomainError::lookup("Post", slug))?;
        let author = self
            .stores
            .users
            .find_by_pk(None, &post.author_id)
            .await
            .map_err(DomainError::lookup("User", post.author_id.as_str()))?;

        let comments = self
            .stores
            .comments
            .find_all(None, &Filter::eq("post_id", &post.id), &Sort::asc("created_at"))
            .await
            .map_err(DomainError::storage("failed to load comments"))?;
        let commenters = self
            .users_by_id(distinct(comments.iter().map(|c| c.author_id.as_str())))
            .await?;

        let likes_count = self
            .stores
            .likes
            .count(None, &Filter::eq("post_id", &post.id))
            .await
            .map_err(DomainError::storage("failed to count likes"))?;

        let comments = comments
            .into_iter()
            .map(|comment| {
                let commenter = commenters.get(&comment.author_id).ok_or_else(|| {
                    DomainError::NotFound {
                        entity_type: "User",
                        key: comment.author_id.clone(),
                    }
                })?;
                Ok(CommentView {
                    id: comment.id,
                    author: AuthorRef::from(commenter),
                    parent_id: comment.parent_id,
                    body: comment.body,
                    created_at: comment.created_at,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(PostDetail {
            tags: post.its_tags(),
            author: AuthorRef::from(&author),
            id: post.id,
            title: post.title,
            summary: post.summary,
            slug: post.slug,
            raw_markdown: post.raw_markdown,
            published_at: post.published_at,
            likes_count,
            comments,
            raw_markdown_audio_url: post.raw_markdown_audio_url,
            summary_audio_url: post.summary_audio_url,
        })
    }

    /// Every post of `user_id`, drafts included, ordered by creation time.
    pub async fn list_my_posts(
        &self,
        user_id: &str,
        query: ListPostsQuery,
    ) -> Result<Paged<MyPostItem>, DomainError> {
        let filter = Filter::eq("author_id", user_id);
        let posts = self
            .stores
            .posts
            .find_paginated(
                None,
                query.window(),
                &filter,
                &Sort::by("created_at", query.order),
            )
            .await
            .map_err(DomainError::storage("failed to list posts"))?;
        let total = self
            .stores
            .posts
            .count(None, &filter)
            .await
            .map_err(DomainError::storage("failed to count posts"))?;

        let items = posts
            .into_iter()
            .map(|post| MyPostItem {
                status: if post.is_published() {
                    PostStatus::Published
                } else {
                    PostStatus::Draft
                },
                id: post.id,
                title: post.title,
                slug: post.slug,
                published_at: post.published_at,
                created_at: post.created_at,
                updated_at: post.updated_at,
            })
            .collect();

        Ok(Paged {
            page: query.page,
            per_page: query.per_page,
            total,
            items,
        })
    }

    pub async fn get_author_info(&self, author_id: &str) -> Result<AuthorInfo, DomainError> {
        let author = self
            .stores
            .users
            .find_by_pk(None, &author_id.to_string())
            .await
            .map_err(DomainError::lookup("User", author_id))?;

        let by_author = Filter::eq("author_id", author_id).and(published());
        let posts_count = self
            .stores
            .posts
            .count(None, &by_author)
            .await
            .map_err(DomainError::storage("failed to count author posts"))?;
        let followers_count = self
            .stores
            .follows
            .count(None, &Filter::eq("followee_id", author_id))
            .await
            .map_err(DomainError::storage("failed to count followers"))?;

        let latest = self
            .stores
            .posts
            .find_paginated(
                None,
                Page::new(TOP_POSTS, 0),
                &by_author,
                &Sort::desc("published_at"),
            )
            .await
            .map_err(DomainError::storage("failed to fetch top posts"))?;

        let mut top_posts = Vec::with_capacity(latest.len());
        for post in latest {
            let likes_count = self
                .stores
                .likes
                .count(None, &Filter::eq("post_id", &post.id))
                .await
                .map_err(DomainError::storage("failed to count likes"))?;
            top_posts.push(TopPost {
                id: post.id,
                title: post.title,
                slug: post.slug,
                likes_count,
            });
        }

        Ok(AuthorInfo {
            id: author.id,
            name: author.username,
            posts_count,
            followers_count,
            top_posts,
        })
    }

    /// Followed users, bookmarks and liked posts of `user_id`, newest first.
    ///
    /// Unlike the listings, dangling references are skipped rather than reported.
    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, DomainError> {
        let newest = Sort::desc("created_at");

        let follows = self
            .stores
            .follows
            .find_all(None, &Filter::eq("follower_id", user_id), &newest)
            .await
            .map_err(DomainError::storage("failed to get follows"))?;
        let mut following = Vec::with_capacity(follows.len());
        for follow in follows {
            match self.stores.users.find_by_pk(None, &follow.followee_id).await {
                Ok(user) => following.push(ProfileUser {
                    id: user.id,
                    username: user.username,
                }),
                Err(e) => {
                    tracing::debug!(followee_id = %follow.followee_id, error = %e, "Skipping followed user");
                }
            }
        }

        let by_user = Filter::eq("user_id", user_id);
        let bookmarked = self
            .stores
            .bookmarks
            .find_all(None, &by_user, &newest)
            .await
            .map_err(DomainError::storage("failed to get bookmarks"))?;
        let bookmarks = self
            .posts_lenient(bookmarked.iter().map(|b| b.post_id.as_str()))
            .await;

        let liked = self
            .stores
            .likes
            .find_all(None, &by_user, &newest)
            .await
            .map_err(DomainError::storage("failed to get likes"))?;
        let liked_posts = self
            .posts_lenient(liked.iter().map(|l| l.post_id.as_str()))
            .await;

        Ok(Profile {
            following,
            bookmarks,
            liked_posts,
        })
    }

    async fn posts_lenient<'a>(&self, ids: impl Iterator<Item = &'a str>) -> Vec<ProfilePost> {
        let mut out = Vec::new();
        for id in ids {
            match self.stores.posts.find_by_pk(None, &id.to_string()).await {
                Ok(Post { id, title, .. }) => out.push(ProfilePost { id, title }),
                Err(e) => tracing::debug!(post_id = %id, error = %e, "Skipping post"),
            }
        }
        out
    }
}
