//! Domain entities - the core business objects.

mod bookmark;
mod comment;
mod event;
mod follow;
mod post;
mod post_like;
mod user;

pub use bookmark::Bookmark;
pub use comment::Comment;
pub use event::DomainEvent;
pub use follow::Follow;
pub use post::Post;
pub use post_like::PostLike;
pub use user::User;

use crate::error::DomainError;

/// Shared validation for the (user, post) pair entities.
fn require_pair(id: &str, user_id: &str, post_id: &str) -> Result<(), DomainError> {
    if id.is_empty() {
        return Err(DomainError::validation("id cannot be empty"));
    }
    if user_id.is_empty() {
        return Err(DomainError::validation("user ID cannot be empty"));
    }
    if post_id.is_empty() {
        return Err(DomainError::validation("post ID cannot be empty"));
    }
    Ok(())
}
