//! Unified login resolution: credential -> owning account.

use sqlx::PgPool;
use tracing::debug;

use crate::error::{IdentityError, IdentityResult};
use crate::services::provider_resolver::AUTH_TYPE_PASSWORD;
use idfuse_auth::PasswordHasher;
use idfuse_db::models::{Account, IdentityBinding};

/// Service resolving a credential to the account that owns it.
///
/// The binding store is authoritative: once bindings exist, a provider's
/// account identifier is never compared against account columns directly.
#[derive(Clone)]
pub struct LoginService {
    pool: PgPool,
    hasher: PasswordHasher,
}

impl LoginService {
    /// Create a new login service.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            hasher: PasswordHasher::new(),
        }
    }

    /// Resolve a credential to its owning account.
    ///
    /// Password credentials address the account as `owner/name` and require
    /// `secret` to verify against the stored hash before the binding lookup.
    /// Every other type resolves directly through the binding store.
    pub async fn resolve(
        &self,
        auth_type: &str,
        auth_value: &str,
        secret: Option<&str>,
    ) -> IdentityResult<Account> {
        if auth_type == AUTH_TYPE_PASSWORD {
            self.check_password(auth_value, secret).await?;
        }

        let binding = IdentityBinding::find_by_auth(&self.pool, auth_type, auth_value)
            .await?
            .ok_or(IdentityError::AuthenticationFailed)?;

        debug!(
            universal_id = %binding.universal_id,
            auth_type = %auth_type,
            "Resolved credential to identity"
        );

        Account::find_by_universal_id(&self.pool, binding.universal_id)
            .await?
            .ok_or(IdentityError::AccountNotFound {
                universal_id: binding.universal_id,
            })
    }

    /// Verify a password secret against the account addressed by an
    /// `owner/name` composite.
    async fn check_password(&self, owner_name: &str, secret: Option<&str>) -> IdentityResult<()> {
        let (owner, name) = owner_name
            .split_once('/')
            .filter(|(owner, name)| !owner.is_empty() && !name.is_empty())
            .ok_or(IdentityError::AuthenticationFailed)?;

        let secret = secret.ok_or(IdentityError::AuthenticationFailed)?;

        let account = Account::find_by_owner_name(&self.pool, owner, name)
            .await?
            .ok_or(IdentityError::AuthenticationFailed)?;

        let hash = account
            .password_hash
            .as_deref()
            .ok_or(IdentityError::AuthenticationFailed)?;

        let verified = self
            .hasher
            .verify_password(secret, hash)
            .map_err(|_| IdentityError::AuthenticationFailed)?;

        if !verified {
            return Err(IdentityError::AuthenticationFailed);
        }

        Ok(())
    }
}
