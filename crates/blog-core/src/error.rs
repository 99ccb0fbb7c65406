//! Domain-level error types.

use thiserror::Error;

use crate::ports::{DispatchError, GenerationError};

/// Domain errors - business logic failures, each carrying the operation context.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity_type} not found: {key}")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Content generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("{context}: {source}")]
    Dispatch {
        context: &'static str,
        source: DispatchError,
    },

    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        source: RepoError,
    },

    #[error("Author {author_id} for post {post_id} not found")]
    AuthorNotFound { post_id: String, author_id: String },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Wrap a storage failure with the operation that was running.
    pub fn storage(context: &'static str) -> impl FnOnce(RepoError) -> Self {
        move |source| Self::Storage { context, source }
    }

    /// Like [`DomainError::storage`], but a missing row becomes `NotFound`.
    pub fn lookup(
        entity_type: &'static str,
        key: impl Into<String>,
    ) -> impl FnOnce(RepoError) -> Self {
        let key = key.into();
        move |source| match source {
            RepoError::NotFound { .. } => Self::NotFound { entity_type, key },
            source => Self::Storage {
                context: "lookup failed",
                source,
            },
        }
    }
}

impl From<RepoError> for DomainError {
    fn from(source: RepoError) -> Self {
        Self::Storage {
            context: "storage operation failed",
            source,
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("No {table} row matched")]
    NotFound { table: &'static str },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Transaction failed: {original}; rollback also failed: {rollback}")]
    Rollback { original: String, rollback: String },
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
