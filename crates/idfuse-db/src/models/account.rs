//! Account entity model.
//!
//! Accounts are owned by the account subsystem; the identity engine reads
//! them, derives credentials from their provider fields, and deletes the
//! losing row during a merge.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// An account row.
///
/// One nullable column per supported sign-in method; `properties` carries
/// provider identifiers for types without a dedicated column
/// (keyed `oauth_<Provider>_id`).
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub owner: String,
    pub name: String,

    /// The universal identity all of this account's bindings share.
    pub universal_id: Uuid,

    /// Soft-deletion flag; flagged accounts cannot participate in merges.
    pub is_deleted: bool,

    /// Argon2id password hash, when the account has a password.
    pub password_hash: Option<String>,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub github: Option<String>,
    pub google: Option<String>,
    pub wechat: Option<String>,
    pub qq: Option<String>,
    pub facebook: Option<String>,
    pub dingtalk: Option<String>,
    pub weibo: Option<String>,
    pub ldap: Option<String>,
    pub custom: Option<String>,

    pub properties: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a new account (used by signup flows and test fixtures).
#[derive(Debug, Clone, Default)]
pub struct CreateAccount {
    pub owner: String,
    pub name: String,
    pub universal_id: Uuid,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub github: Option<String>,
    pub google: Option<String>,
    pub wechat: Option<String>,
    pub qq: Option<String>,
    pub facebook: Option<String>,
    pub dingtalk: Option<String>,
    pub weibo: Option<String>,
    pub ldap: Option<String>,
    pub custom: Option<String>,
    pub properties: Option<serde_json::Value>,
}

impl Account {
    /// The `owner/name` composite that addresses this account in password
    /// credentials and purge references.
    #[must_use]
    pub fn owner_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Create a new account.
    pub async fn create<'e, E>(executor: E, input: CreateAccount) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r"
            INSERT INTO accounts (
                owner, name, universal_id, password_hash, email, phone,
                github, google, wechat, qq, facebook, dingtalk, weibo, ldap,
                custom, properties
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            ",
        )
        .bind(&input.owner)
        .bind(&input.name)
        .bind(input.universal_id)
        .bind(&input.password_hash)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.github)
        .bind(&input.google)
        .bind(&input.wechat)
        .bind(&input.qq)
        .bind(&input.facebook)
        .bind(&input.dingtalk)
        .bind(&input.weibo)
        .bind(&input.ldap)
        .bind(&input.custom)
        .bind(&input.properties)
        .fetch_one(executor)
        .await
    }

    /// Find an account by its universal identity.
    pub async fn find_by_universal_id<'e, E>(
        executor: E,
        universal_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as("SELECT * FROM accounts WHERE universal_id = $1")
            .bind(universal_id)
            .fetch_optional(executor)
            .await
    }

    /// Find an account by its `(owner, name)` pair.
    pub async fn find_by_owner_name<'e, E>(
        executor: E,
        owner: &str,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as("SELECT * FROM accounts WHERE owner = $1 AND name = $2")
            .bind(owner)
            .bind(name)
            .fetch_optional(executor)
            .await
    }

    /// Delete an account row.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
