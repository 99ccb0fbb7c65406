//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`:
//! record stores, the content generator, event buses and token validation.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No database driver, in-memory store only
//! - `postgres` - PostgreSQL record stores via SeaORM
//! - `auth` - JWT bearer token validation

pub mod database;
pub mod events;
pub mod generator;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use database::{InMemoryDatabase, InMemoryStore, InMemoryTx, memory_stores};
pub use events::InMemoryEventBus;

// Re-exports - External services
pub use events::{TriggerDevClient, TriggerDevConfig, TriggerDevEventBus};
pub use generator::{OpenAiConfig, OpenAiGenerator};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresStore, connect, postgres_stores};
