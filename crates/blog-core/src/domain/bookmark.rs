use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ports::Record;

/// A post saved by a user for later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        post_id: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let (id, user_id, post_id) = (id.into(), user_id.into(), post_id.into());
        super::require_pair(&id, &user_id, &post_id)?;

        Ok(Self {
            id,
            user_id,
            post_id,
            created_at: Utc::now(),
        })
    }
}

impl Record for Bookmark {
    type Key = String;
    const TABLE: &'static str = "bookmarks";
    const UNIQUE: &'static [&'static [&'static str]] = &[&["user_id", "post_id"]];

    fn key(&self) -> String {
        self.id.clone()
    }
}
