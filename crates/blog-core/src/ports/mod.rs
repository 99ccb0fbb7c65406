//! Ports - traits that infrastructure adapters implement.

pub mod auth;
pub mod content_generator;
pub mod event_bus;
pub mod store;

pub use auth::{AuthError, TokenClaims, TokenService};
pub use content_generator::{ContentGenerator, GenerationError};
pub use event_bus::{DispatchError, EventBus};
pub use store::{Direction, Filter, Page, Record, Sort, SortTerm, Store, TxFuture, Value};
