//! Identity binding model: one credential bound to one universal identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// A persisted mapping from one `(auth_type, auth_value)` credential to one
/// universal identity.
///
/// Rows are never rewritten in place. When a credential changes hands during
/// a merge, the old row is deleted and a fresh row is inserted under the
/// surviving identity, so `created_at` always refers to the current
/// ownership period.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct IdentityBinding {
    pub id: Uuid,
    pub universal_id: Uuid,
    pub auth_type: String,
    pub auth_value: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new identity binding.
#[derive(Debug, Clone)]
pub struct CreateIdentityBinding {
    pub universal_id: Uuid,
    pub auth_type: String,
    pub auth_value: String,
}

impl IdentityBinding {
    /// Insert a new binding.
    ///
    /// The `(auth_type, auth_value)` unique constraint makes a concurrent
    /// duplicate insert fail with a unique violation rather than corrupt the
    /// store; callers translate that into their own conflict error.
    pub async fn create<'e, E>(
        executor: E,
        input: CreateIdentityBinding,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            INSERT INTO identity_bindings (universal_id, auth_type, auth_value)
            VALUES ($1, $2, $3)
            RETURNING *
            ",
        )
        .bind(input.universal_id)
        .bind(&input.auth_type)
        .bind(&input.auth_value)
        .fetch_one(executor)
        .await
    }

    /// Find the binding holding a credential, regardless of owner.
    pub async fn find_by_auth<'e, E>(
        executor: E,
        auth_type: &str,
        auth_value: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM identity_bindings
            WHERE auth_type = $1 AND auth_value = $2
            ",
        )
        .bind(auth_type)
        .bind(auth_value)
        .fetch_optional(executor)
        .await
    }

    /// All bindings owned by a universal identity.
    pub async fn find_by_universal_id<'e, E>(
        executor: E,
        universal_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            SELECT * FROM identity_bindings
            WHERE universal_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(universal_id)
        .fetch_all(executor)
        .await
    }

    /// Whether an identity already holds an equal credential.
    pub async fn exists_under_identity<'e, E>(
        executor: E,
        universal_id: Uuid,
        auth_type: &str,
        auth_value: &str,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            r"
            SELECT EXISTS(
                SELECT 1 FROM identity_bindings
                WHERE universal_id = $1 AND auth_type = $2 AND auth_value = $3
            )
            ",
        )
        .bind(universal_id)
        .bind(auth_type)
        .bind(auth_value)
        .fetch_one(executor)
        .await
    }

    /// Count bindings owned by an identity (for unbind validation).
    pub async fn count_by_universal_id<'e, E>(
        executor: E,
        universal_id: Uuid,
    ) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM identity_bindings WHERE universal_id = $1",
        )
        .bind(universal_id)
        .fetch_one(executor)
        .await?;
        Ok(result.0)
    }

    /// Delete a single binding row.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM identity_bindings WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every binding owned by an identity.
    pub async fn delete_by_universal_id<'e, E>(
        executor: E,
        universal_id: Uuid,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM identity_bindings WHERE universal_id = $1")
            .bind(universal_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
