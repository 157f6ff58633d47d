//! Data-access layer for idfuse.
//!
//! Owns the connection pool, the embedded migrations, and the entity models.
//! Model functions are generic over [`sqlx::PgExecutor`] so the same query
//! runs against the pool or inside a transaction.

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use migrations::run_migrations;
pub use pool::DbPool;
