//! Purge collaborators: per-subsystem cleanup of account-scoped records.
//!
//! Every subsystem that keeps rows referencing an account registers one
//! [`AccountPurge`] here. The merge transaction runs the whole registry
//! against the account being deleted, so adding a new account-scoped record
//! type elsewhere in the system is a one-line registration in
//! [`default_purges`] - and forgetting it means merge leaks that subsystem's
//! data for a deleted identity.

use async_trait::async_trait;
use sqlx::PgConnection;
use std::sync::Arc;

use idfuse_db::models::{
    AuthToken, Payment, Resource, SessionRecord, Subscription, TransactionRecord,
    VerificationRecord,
};

/// The account reference purge collaborators key on.
#[derive(Debug, Clone)]
pub struct AccountRef {
    pub owner: String,
    pub name: String,
}

impl AccountRef {
    /// The `owner/name` composite used by subsystems that store it as one
    /// column.
    #[must_use]
    pub fn owner_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl From<&idfuse_db::models::Account> for AccountRef {
    fn from(account: &idfuse_db::models::Account) -> Self {
        Self {
            owner: account.owner.clone(),
            name: account.name.clone(),
        }
    }
}

/// One subsystem's delete-all-records-for-this-account hook.
///
/// Runs on the merge transaction's connection so every purge commits or
/// rolls back with the rest of the protocol. Deleting zero rows is a
/// success.
#[async_trait]
pub trait AccountPurge: Send + Sync {
    /// Name of the record type, for logging.
    fn name(&self) -> &'static str;

    /// Delete all records referencing the account; returns the row count.
    async fn delete_by_account(
        &self,
        conn: &mut PgConnection,
        account: &AccountRef,
    ) -> Result<u64, sqlx::Error>;
}

/// Authentication tokens issued to the account.
pub struct TokenPurge;

#[async_trait]
impl AccountPurge for TokenPurge {
    fn name(&self) -> &'static str {
        "auth_tokens"
    }

    async fn delete_by_account(
        &self,
        conn: &mut PgConnection,
        account: &AccountRef,
    ) -> Result<u64, sqlx::Error> {
        AuthToken::delete_by_account_name(conn, &account.name).await
    }
}

/// Login sessions held by the account.
pub struct SessionPurge;

#[async_trait]
impl AccountPurge for SessionPurge {
    fn name(&self) -> &'static str {
        "sessions"
    }

    async fn delete_by_account(
        &self,
        conn: &mut PgConnection,
        account: &AccountRef,
    ) -> Result<u64, sqlx::Error> {
        SessionRecord::delete_by_owner_name(conn, &account.owner, &account.name).await
    }
}

/// Verification codes sent to the account.
pub struct VerificationPurge;

#[async_trait]
impl AccountPurge for VerificationPurge {
    fn name(&self) -> &'static str {
        "verification_records"
    }

    async fn delete_by_account(
        &self,
        conn: &mut PgConnection,
        account: &AccountRef,
    ) -> Result<u64, sqlx::Error> {
        VerificationRecord::delete_by_account(conn, &account.owner_name()).await
    }
}

/// Resources uploaded by the account.
pub struct ResourcePurge;

#[async_trait]
impl AccountPurge for ResourcePurge {
    fn name(&self) -> &'static str {
        "resources"
    }

    async fn delete_by_account(
        &self,
        conn: &mut PgConnection,
        account: &AccountRef,
    ) -> Result<u64, sqlx::Error> {
        Resource::delete_by_account_name(conn, &account.name).await
    }
}

/// Payment records of the account.
pub struct PaymentPurge;

#[async_trait]
impl AccountPurge for PaymentPurge {
    fn name(&self) -> &'static str {
        "payments"
    }

    async fn delete_by_account(
        &self,
        conn: &mut PgConnection,
        account: &AccountRef,
    ) -> Result<u64, sqlx::Error> {
        Payment::delete_by_account_name(conn, &account.name).await
    }
}

/// Transaction records of the account.
pub struct TransactionPurge;

#[async_trait]
impl AccountPurge for TransactionPurge {
    fn name(&self) -> &'static str {
        "transactions"
    }

    async fn delete_by_account(
        &self,
        conn: &mut PgConnection,
        account: &AccountRef,
    ) -> Result<u64, sqlx::Error> {
        TransactionRecord::delete_by_account_name(conn, &account.name).await
    }
}

/// Subscription records of the account.
pub struct SubscriptionPurge;

#[async_trait]
impl AccountPurge for SubscriptionPurge {
    fn name(&self) -> &'static str {
        "subscriptions"
    }

    async fn delete_by_account(
        &self,
        conn: &mut PgConnection,
        account: &AccountRef,
    ) -> Result<u64, sqlx::Error> {
        Subscription::delete_by_account_name(conn, &account.name).await
    }
}

/// The full registry of account-scoped record types, in purge order.
#[must_use]
pub fn default_purges() -> Vec<Arc<dyn AccountPurge>> {
    vec![
        Arc::new(TokenPurge),
        Arc::new(SessionPurge),
        Arc::new(VerificationPurge),
        Arc::new(ResourcePurge),
        Arc::new(PaymentPurge),
        Arc::new(TransactionPurge),
        Arc::new(SubscriptionPurge),
    ]
}
