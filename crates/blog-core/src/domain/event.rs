use serde::{Deserialize, Serialize};

/// Events raised by the post lifecycle for downstream processors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    PostCreated { post_id: String },
    PostUpdated { post_id: String },
}

impl DomainEvent {
    pub fn post_id(&self) -> &str {
        match self {
            Self::PostCreated { post_id } | Self::PostUpdated { post_id } => post_id,
        }
    }
}
