//! Bookmark entity for SeaORM. `(user_id, post_id)` carries a unique index.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bookmarks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for blog_core::domain::Bookmark {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            post_id: model.post_id,
            created_at: model.created_at.into(),
        }
    }
}

impl From<blog_core::domain::Bookmark> for ActiveModel {
    fn from(bookmark: blog_core::domain::Bookmark) -> Self {
        Self {
            id: Set(bookmark.id),
            user_id: Set(bookmark.user_id),
            post_id: Set(bookmark.post_id),
            created_at: Set(bookmark.created_at.into()),
        }
    }
}
