//! Merge service: consolidating two accounts under one universal identity.

use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{IdentityError, IdentityResult};
use crate::models::AuthMethod;
use crate::services::purge::{AccountPurge, AccountRef};
use crate::token::TokenVerifier;
use idfuse_db::models::{Account, CreateIdentityBinding, IdentityBinding};

/// Outcome of a successful merge. Returned once, never stored.
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// The surviving universal identity.
    pub universal_id: Uuid,
    /// The universal identity whose account was deleted.
    pub deleted_user_id: Uuid,
    /// Credentials that moved to the surviving identity (credentials the
    /// survivor already held are not repeated here).
    pub merged_auth_methods: Vec<AuthMethod>,
}

/// Service running the merge protocol.
///
/// Both parties are authenticated by token, the losing identity's
/// credentials are transferred, its dependent records are purged across
/// every registered subsystem, and its account row is deleted - all inside
/// one transaction. Any failure rolls the whole protocol back.
#[derive(Clone)]
pub struct MergeService {
    pool: PgPool,
    verifier: Arc<dyn TokenVerifier>,
    purges: Vec<Arc<dyn AccountPurge>>,
}

impl MergeService {
    /// Create a new merge service with a purge registry.
    #[must_use]
    pub fn new(
        pool: PgPool,
        verifier: Arc<dyn TokenVerifier>,
        purges: Vec<Arc<dyn AccountPurge>>,
    ) -> Self {
        Self {
            pool,
            verifier,
            purges,
        }
    }

    /// Merge the deleted-token account into the reserved-token account.
    ///
    /// `caller` is the universal identity of whoever initiated the request;
    /// it must be one of the two participants. The boundary layer already
    /// checks this, but the service is callable on its own and re-validates.
    pub async fn merge(
        &self,
        caller: Uuid,
        reserved_token: &str,
        deleted_token: &str,
    ) -> IdentityResult<MergeResult> {
        let reserved_claims = self.verifier.verify(reserved_token)?;
        let deleted_claims = self.verifier.verify(deleted_token)?;

        let reserved_uid = claims_universal_id(&reserved_claims)?;
        let deleted_uid = claims_universal_id(&deleted_claims)?;

        let reserved = Account::find_by_universal_id(&self.pool, reserved_uid)
            .await?
            .ok_or(IdentityError::AccountNotFound {
                universal_id: reserved_uid,
            })?;
        let deleted = Account::find_by_universal_id(&self.pool, deleted_uid)
            .await?
            .ok_or(IdentityError::AccountNotFound {
                universal_id: deleted_uid,
            })?;

        if reserved.is_deleted {
            return Err(IdentityError::AccountAlreadyDeleted {
                account: reserved.owner_name(),
            });
        }
        if deleted.is_deleted {
            return Err(IdentityError::AccountAlreadyDeleted {
                account: deleted.owner_name(),
            });
        }

        if reserved.universal_id == deleted.universal_id {
            return Err(IdentityError::SameAccount);
        }

        if caller != reserved.universal_id && caller != deleted.universal_id {
            return Err(IdentityError::NotParticipant);
        }

        info!(
            reserved = %reserved.universal_id,
            deleted = %deleted.universal_id,
            "Merging accounts"
        );

        let mut tx = self.pool.begin().await?;

        let deleted_bindings =
            IdentityBinding::find_by_universal_id(&mut *tx, deleted.universal_id).await?;

        // The originals come out before the copies go in: the credentials
        // being transferred would otherwise collide with their own old rows
        // on the unique index. The transaction keeps the swap invisible to
        // other readers, and the losing identity ends it with zero bindings
        // either way.
        IdentityBinding::delete_by_universal_id(&mut *tx, deleted.universal_id).await?;

        // Transfer credentials. A credential the survivor already holds is
        // skipped, not duplicated - the normal convergence case when both
        // accounts were reachable through the same credential in datasets
        // predating the unique index.
        let mut merged_auth_methods = Vec::new();
        for binding in &deleted_bindings {
            let exists = IdentityBinding::exists_under_identity(
                &mut *tx,
                reserved.universal_id,
                &binding.auth_type,
                &binding.auth_value,
            )
            .await?;

            if !exists {
                IdentityBinding::create(
                    &mut *tx,
                    CreateIdentityBinding {
                        universal_id: reserved.universal_id,
                        auth_type: binding.auth_type.clone(),
                        auth_value: binding.auth_value.clone(),
                    },
                )
                .await?;

                merged_auth_methods.push(AuthMethod {
                    auth_type: binding.auth_type.clone(),
                    auth_value: binding.auth_value.clone(),
                });
            }
        }

        let account_ref = AccountRef::from(&deleted);
        for purge in &self.purges {
            let count = purge.delete_by_account(&mut *tx, &account_ref).await?;
            debug!(
                record_type = purge.name(),
                count, "Purged dependent records"
            );
        }

        Account::delete(&mut *tx, deleted.id).await?;

        tx.commit().await.map_err(IdentityError::MergeFailed)?;

        info!(
            universal_id = %reserved.universal_id,
            deleted_user_id = %deleted.universal_id,
            transferred = merged_auth_methods.len(),
            "Merge completed"
        );

        Ok(MergeResult {
            universal_id: reserved.universal_id,
            deleted_user_id: deleted.universal_id,
            merged_auth_methods,
        })
    }
}

fn claims_universal_id(claims: &idfuse_auth::IdentityClaims) -> IdentityResult<Uuid> {
    claims
        .universal_id()
        .map(|uid| *uid.as_uuid())
        .ok_or_else(|| IdentityError::InvalidToken {
            reason: "token carries no universal identity".to_string(),
        })
}
