use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ports::Record;

/// Comment entity. Replies point at their parent; root comments have none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub parent_id: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Create a root comment.
    pub fn new(
        id: impl Into<String>,
        post_id: impl Into<String>,
        author_id: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let (id, post_id) = (id.into(), post_id.into());
        let (author_id, body) = (author_id.into(), body.into());

        if id.is_empty() {
            return Err(DomainError::validation("id cannot be empty"));
        }
        if post_id.is_empty() {
            return Err(DomainError::validation("post ID cannot be empty"));
        }
        if author_id.is_empty() {
            return Err(DomainError::validation("author ID cannot be empty"));
        }
        if body.is_empty() {
            return Err(DomainError::validation("body cannot be empty"));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            post_id,
            author_id,
            parent_id: None,
            body,
            created_at: now,
            updated_at: now,
        })
    }

    /// Create a reply to `parent_id`.
    pub fn new_reply(
        id: impl Into<String>,
        post_id: impl Into<String>,
        author_id: impl Into<String>,
        parent_id: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let mut comment = Self::new(id, post_id, author_id, body)?;
        let parent_id = parent_id.into();
        if parent_id.is_empty() {
            return Err(DomainError::validation(
                "parent ID cannot be empty for reply comment",
            ));
        }
        comment.parent_id = Some(parent_id);
        Ok(comment)
    }

    pub fn update_body(&mut self, body: impl Into<String>) -> Result<(), DomainError> {
        let body = body.into();
        if body.is_empty() {
            return Err(DomainError::validation("body cannot be empty"));
        }
        self.body = body;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

impl Record for Comment {
    type Key = String;
    const TABLE: &'static str = "comments";

    fn key(&self) -> String {
        self.id.clone()
    }
}
