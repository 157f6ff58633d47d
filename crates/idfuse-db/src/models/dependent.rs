//! Account-scoped records owned by other subsystems.
//!
//! The identity engine never reads these tables; it only deletes from them
//! when an account is removed during a merge. Each type exposes the
//! delete-by-account-reference its owning subsystem keys on, plus a minimal
//! insert used by test fixtures.

use sqlx::PgExecutor;
use uuid::Uuid;

/// Issued authentication tokens, keyed by account name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthToken {
    pub id: Uuid,
    pub account_name: String,
}

impl AuthToken {
    pub async fn insert<'e, E>(executor: E, account_name: &str) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("INSERT INTO auth_tokens (account_name) VALUES ($1)")
            .bind(account_name)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete_by_account_name<'e, E>(
        executor: E,
        account_name: &str,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE account_name = $1")
            .bind(account_name)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Login sessions, keyed by the `(owner, name)` pair.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRecord {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
}

impl SessionRecord {
    pub async fn insert<'e, E>(executor: E, owner: &str, name: &str) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("INSERT INTO sessions (owner, name) VALUES ($1, $2)")
            .bind(owner)
            .bind(name)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete_by_owner_name<'e, E>(
        executor: E,
        owner: &str,
        name: &str,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM sessions WHERE owner = $1 AND name = $2")
            .bind(owner)
            .bind(name)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Verification codes sent to an account, keyed by `owner/name`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VerificationRecord {
    pub id: Uuid,
    pub account: String,
}

impl VerificationRecord {
    pub async fn insert<'e, E>(executor: E, account: &str) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("INSERT INTO verification_records (account) VALUES ($1)")
            .bind(account)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete_by_account<'e, E>(executor: E, account: &str) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM verification_records WHERE account = $1")
            .bind(account)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Uploaded resources, keyed by account name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Resource {
    pub id: Uuid,
    pub account_name: String,
}

impl Resource {
    pub async fn insert<'e, E>(executor: E, account_name: &str) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("INSERT INTO resources (account_name) VALUES ($1)")
            .bind(account_name)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete_by_account_name<'e, E>(
        executor: E,
        account_name: &str,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM resources WHERE account_name = $1")
            .bind(account_name)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Payment records, keyed by account name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub account_name: String,
}

impl Payment {
    pub async fn insert<'e, E>(executor: E, account_name: &str) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("INSERT INTO payments (account_name) VALUES ($1)")
            .bind(account_name)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete_by_account_name<'e, E>(
        executor: E,
        account_name: &str,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM payments WHERE account_name = $1")
            .bind(account_name)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Transaction records, keyed by account name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub account_name: String,
}

impl TransactionRecord {
    pub async fn insert<'e, E>(executor: E, account_name: &str) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("INSERT INTO transactions (account_name) VALUES ($1)")
            .bind(account_name)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete_by_account_name<'e, E>(
        executor: E,
        account_name: &str,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM transactions WHERE account_name = $1")
            .bind(account_name)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Subscription records, keyed by account name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub account_name: String,
}

impl Subscription {
    pub async fn insert<'e, E>(executor: E, account_name: &str) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("INSERT INTO subscriptions (account_name) VALUES ($1)")
            .bind(account_name)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete_by_account_name<'e, E>(
        executor: E,
        account_name: &str,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM subscriptions WHERE account_name = $1")
            .bind(account_name)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
