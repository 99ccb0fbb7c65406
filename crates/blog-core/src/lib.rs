//! # Blog Core
//!
//! The domain layer of the blog backend.
//! Entities, the ports infrastructure must implement, and the application
//! services that orchestrate them. No infrastructure dependencies live here.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
