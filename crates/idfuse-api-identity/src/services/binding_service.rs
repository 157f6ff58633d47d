//! Binding service: bind/unbind/create operations over the binding store.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{is_unique_violation, IdentityError, IdentityResult};
use crate::services::provider_resolver;
use idfuse_db::models::{Account, CreateIdentityBinding, IdentityBinding};

/// Service enforcing the binding invariants: a credential belongs to at most
/// one identity, and an identity never drops below one credential.
#[derive(Clone)]
pub struct BindingService {
    pool: PgPool,
}

impl BindingService {
    /// Create a new binding service.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register the initial binding for a freshly created account.
    ///
    /// When `primary_value` is absent the value is resolved from the
    /// account's fields; when the hinted type has no value (or no hint was
    /// given), auto-detection may settle on a different type.
    pub async fn create_for_account(
        &self,
        account: &Account,
        universal_id: Uuid,
        primary_type: Option<&str>,
        primary_value: Option<&str>,
    ) -> IdentityResult<IdentityBinding> {
        let no_credential = || IdentityError::NoCredentialAvailable {
            hint: primary_type.unwrap_or("any").to_string(),
        };

        let (auth_type, auth_value) = match (primary_type, primary_value.filter(|v| !v.is_empty()))
        {
            (Some(auth_type), Some(value)) => (auth_type.to_lowercase(), value.to_string()),
            // A bare value with no type cannot be classified.
            (None, Some(_)) => return Err(no_credential()),
            (_, None) => {
                provider_resolver::resolve(account, primary_type).ok_or_else(no_credential)?
            }
        };

        let binding = self.insert(universal_id, &auth_type, &auth_value).await?;

        info!(
            universal_id = %universal_id,
            auth_type = %binding.auth_type,
            "Created initial identity binding"
        );

        Ok(binding)
    }

    /// Bind an additional login method to an identity.
    ///
    /// Binding a credential the identity already holds is an idempotent
    /// success; a credential held by a different identity is a conflict.
    pub async fn bind(
        &self,
        universal_id: Uuid,
        auth_type: &str,
        auth_value: &str,
    ) -> IdentityResult<IdentityBinding> {
        if let Some(existing) =
            IdentityBinding::find_by_auth(&self.pool, auth_type, auth_value).await?
        {
            if existing.universal_id == universal_id {
                return Ok(existing);
            }
            return Err(IdentityError::CredentialAlreadyBound {
                auth_type: auth_type.to_string(),
            });
        }

        let binding = self.insert(universal_id, auth_type, auth_value).await?;

        info!(
            universal_id = %universal_id,
            auth_type = %auth_type,
            "Bound additional login method"
        );

        Ok(binding)
    }

    /// Remove a login method from an identity.
    ///
    /// Refuses to remove the last remaining method.
    pub async fn unbind(&self, universal_id: Uuid, auth_type: &str) -> IdentityResult<()> {
        let mut tx = self.pool.begin().await?;

        let bindings = IdentityBinding::find_by_universal_id(&mut *tx, universal_id).await?;

        if bindings.len() <= 1 {
            return Err(IdentityError::LastCredential);
        }

        let target = bindings
            .iter()
            .find(|b| b.auth_type == auth_type)
            .ok_or_else(|| IdentityError::BindingNotFound {
                auth_type: auth_type.to_string(),
            })?;

        IdentityBinding::delete(&mut *tx, target.id).await?;
        tx.commit().await?;

        info!(
            universal_id = %universal_id,
            auth_type = %auth_type,
            "Unbound login method"
        );

        Ok(())
    }

    /// All bindings owned by an identity.
    pub async fn list(&self, universal_id: Uuid) -> IdentityResult<Vec<IdentityBinding>> {
        Ok(IdentityBinding::find_by_universal_id(&self.pool, universal_id).await?)
    }

    /// Insert a binding, translating a lost race on the unique index into
    /// the same conflict error the pre-check produces.
    async fn insert(
        &self,
        universal_id: Uuid,
        auth_type: &str,
        auth_value: &str,
    ) -> IdentityResult<IdentityBinding> {
        let input = CreateIdentityBinding {
            universal_id,
            auth_type: auth_type.to_string(),
            auth_value: auth_value.to_string(),
        };

        match IdentityBinding::create(&self.pool, input).await {
            Ok(binding) => Ok(binding),
            Err(e) if is_unique_violation(&e) => Err(IdentityError::CredentialAlreadyBound {
                auth_type: auth_type.to_string(),
            }),
            Err(e) => Err(IdentityError::Database(e)),
        }
    }
}
