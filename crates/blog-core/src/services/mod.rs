//! Application services - orchestrate entities, stores, the generator and the event bus.
//!
//! Services are generic over the backend's transaction handle so one set of
//! stores (all sharing a backend) can be handed around as a [`Stores`] bundle.

mod engagement;
mod posts;
mod queries;

pub use engagement::{BookmarkState, CommentCreated, EngagementService, FollowState, LikeState};
pub use posts::{CreatePost, PostService, PostView, UpdatePost};
pub use queries::{
    AuthorInfo, AuthorRef, CommentView, ListPostsQuery, MyPostItem, Paged, PostDetail,
    PostQueries, PostStatus, Profile, ProfilePost, ProfileUser, PublishedPostItem, TopPost,
};

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Bookmark, Comment, Follow, Post, PostLike, User};
use crate::ports::Store;

/// Produces a fresh unique record ID.
pub type NextId = Arc<dyn Fn() -> String + Send + Sync>;

/// Random v4 UUIDs rendered as strings.
pub fn uuid_ids() -> NextId {
    Arc::new(|| Uuid::new_v4().to_string())
}

pub type StoreRef<T, Tx> = Arc<dyn Store<T, Tx = Tx>>;

/// Every record store of one backend.
pub struct Stores<Tx> {
    pub posts: StoreRef<Post, Tx>,
    pub users: StoreRef<User, Tx>,
    pub comments: StoreRef<Comment, Tx>,
    pub likes: StoreRef<PostLike, Tx>,
    pub bookmarks: StoreRef<Bookmark, Tx>,
    pub follows: StoreRef<Follow, Tx>,
}

// Manual impl: `Tx` itself need not be `Clone`.
impl<Tx> Clone for Stores<Tx> {
    fn clone(&self) -> Self {
        Self {
            posts: Arc::clone(&self.posts),
            users: Arc::clone(&self.users),
            comments: Arc::clone(&self.comments),
            likes: Arc::clone(&self.likes),
            bookmarks: Arc::clone(&self.bookmarks),
            follows: Arc::clone(&self.follows),
        }
    }
}
