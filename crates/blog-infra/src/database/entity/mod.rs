//! SeaORM entity definitions.

pub mod bookmark;
pub mod comment;
pub mod follow;
pub mod post;
pub mod post_like;
pub mod user;
