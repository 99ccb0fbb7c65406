//! Content generator port - summary and tag extraction from post bodies.

use async_trait::async_trait;

/// Derives a summary and a tag list from raw post content.
///
/// Both calls are independent; a failure in one says nothing about the other.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Non-empty concise summary of `content`.
    async fn generate_summary(&self, content: &str) -> Result<String, GenerationError>;

    /// Ordered, non-empty tag list for `content`.
    async fn generate_tags(&self, content: &str) -> Result<Vec<String>, GenerationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("content is empty")]
    EmptyContent,

    #[error("request to generator failed: {0}")]
    Request(String),

    #[error("generator returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("generator returned an empty response")]
    EmptyResponse,

    #[error("could not parse tags from generator output: {0}")]
    MalformedTags(String),
}
