//! Record store backends.

mod memory;

#[cfg(feature = "postgres")]
mod connections;
#[cfg(feature = "postgres")]
mod filter;
#[cfg(feature = "postgres")]
mod postgres_store;

#[cfg(feature = "postgres")]
pub mod entity;

use std::sync::Arc;

use blog_core::services::Stores;

pub use memory::{InMemoryDatabase, InMemoryStore, InMemoryTx};

#[cfg(feature = "postgres")]
pub use connections::{DatabaseConfig, connect};
#[cfg(feature = "postgres")]
pub use postgres_store::PostgresStore;
#[cfg(feature = "postgres")]
pub use sea_orm::{DatabaseTransaction, DbConn};

/// Every store backed by one in-memory database.
pub fn memory_stores(db: &InMemoryDatabase) -> Stores<InMemoryTx> {
    Stores {
        posts: Arc::new(db.store()),
        users: Arc::new(db.store()),
        comments: Arc::new(db.store()),
        likes: Arc::new(db.store()),
        bookmarks: Arc::new(db.store()),
        follows: Arc::new(db.store()),
    }
}

/// Every store backed by one PostgreSQL pool.
#[cfg(feature = "postgres")]
pub fn postgres_stores(db: DbConn) -> Stores<DatabaseTransaction> {
    let db = Arc::new(db);
    Stores {
        posts: Arc::new(PostgresStore::<entity::post::Entity>::new(Arc::clone(&db))),
        users: Arc::new(PostgresStore::<entity::user::Entity>::new(Arc::clone(&db))),
        comments: Arc::new(PostgresStore::<entity::comment::Entity>::new(Arc::clone(&db))),
        likes: Arc::new(PostgresStore::<entity::post_like::Entity>::new(Arc::clone(&db))),
        bookmarks: Arc::new(PostgresStore::<entity::bookmark::Entity>::new(Arc::clone(&db))),
        follows: Arc::new(PostgresStore::<entity::follow::Entity>::new(db)),
    }
}

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
