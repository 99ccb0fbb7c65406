use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ports::Record;

/// User entity - authors and readers alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with timestamps set to now.
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let (id, username) = (id.into(), username.into());
        if id.is_empty() {
            return Err(DomainError::validation("id cannot be empty"));
        }
        if username.is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            username,
            email: email.into(),
            created_at: now,
            updated_at: now,
        })
    }
}

impl Record for User {
    type Key = String;
    const TABLE: &'static str = "users";

    fn key(&self) -> String {
        self.id.clone()
    }
}
