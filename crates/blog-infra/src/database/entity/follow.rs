//! Follow entity for SeaORM, keyed by the (follower, followee) pair.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "follows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub follower_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub followee_id: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for blog_core::domain::Follow {
    fn from(model: Model) -> Self {
        Self {
            follower_id: model.follower_id,
            followee_id: model.followee_id,
            created_at: model.created_at.into(),
        }
    }
}

impl From<blog_core::domain::Follow> for ActiveModel {
    fn from(follow: blog_core::domain::Follow) -> Self {
        Self {
            follower_id: Set(follow.follower_id),
            followee_id: Set(follow.followee_id),
            created_at: Set(follow.created_at.into()),
        }
    }
}
