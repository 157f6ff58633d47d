//! Database connection pool.

use crate::error::DbError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Wrapper around a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct DbPool {
    inner: PgPool,
}

impl DbPool {
    /// Connect to the database with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ConnectionFailed` if the connection cannot be
    /// established.
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        Self::connect_with_options(database_url, 10).await
    }

    /// Connect to the database with an explicit pool size.
    pub async fn connect_with_options(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, DbError> {
        let inner = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(DbError::ConnectionFailed)?;

        Ok(Self { inner })
    }

    /// Access the underlying [`PgPool`].
    #[must_use]
    pub fn inner(&self) -> &PgPool {
        &self.inner
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.inner.close().await;
    }
}
