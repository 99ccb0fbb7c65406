use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ports::Record;

/// Follower -> followee relationship, keyed by the pair itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Follow {
    pub follower_id: String,
    pub followee_id: String,
    pub created_at: DateTime<Utc>,
}

impl Follow {
    pub fn new(
        follower_id: impl Into<String>,
        followee_id: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let (follower_id, followee_id) = (follower_id.into(), followee_id.into());

        if follower_id.is_empty() {
            return Err(DomainError::validation("follower ID cannot be empty"));
        }
        if followee_id.is_empty() {
            return Err(DomainError::validation("followee ID cannot be empty"));
        }
        if follower_id == followee_id {
            return Err(DomainError::validation("cannot follow yourself"));
        }

        Ok(Self {
            follower_id,
            followee_id,
            created_at: Utc::now(),
        })
    }
}

impl Record for Follow {
    type Key = (String, String);
    const TABLE: &'static str = "follows";

    fn key(&self) -> (String, String) {
        (self.follower_id.clone(), self.followee_id.clone())
    }
}
