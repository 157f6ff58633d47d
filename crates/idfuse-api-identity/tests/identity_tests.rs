//! Integration tests for the identity engine.
//!
//! These tests require a running PostgreSQL instance.
//! Run with: `cargo test -p idfuse-api-identity --features integration`

#![cfg(feature = "integration")]

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{unique, TestContext};
use sqlx::PgConnection;
use uuid::Uuid;

use idfuse_api_identity::models::AuthMethod;
use idfuse_api_identity::services::{
    default_purges, AccountPurge, AccountRef, BindingService, LoginService, MergeService,
};
use idfuse_api_identity::{IdentityError, JwtTokenVerifier};
use idfuse_auth::{encode_token, IdentityClaims, PasswordHasher};
use idfuse_core::UniversalId;
use idfuse_db::models::{Account, AuthToken, IdentityBinding, Payment};

const SECRET: &[u8] = b"integration-test-secret";

fn token_for(account: &Account) -> String {
    let claims = IdentityClaims::builder()
        .subject(account.owner_name())
        .universal_id(UniversalId::from_uuid(account.universal_id))
        .expires_in_secs(3600)
        .build();
    encode_token(&claims, SECRET).unwrap()
}

fn merge_service(ctx: &TestContext) -> MergeService {
    MergeService::new(
        ctx.pool.clone(),
        JwtTokenVerifier::shared(SECRET),
        default_purges(),
    )
}

async fn binding_count(ctx: &TestContext, universal_id: Uuid) -> i64 {
    IdentityBinding::count_by_universal_id(&ctx.pool, universal_id)
        .await
        .unwrap()
}

// ── Binding manager ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_bind_then_list_round_trip() {
    let ctx = TestContext::new().await;
    let service = BindingService::new(ctx.pool.clone());
    let universal_id = Uuid::new_v4();
    let phone = unique("555");

    service.bind(universal_id, "phone", &phone).await.unwrap();

    let methods: Vec<_> = service
        .list(universal_id)
        .await
        .unwrap()
        .into_iter()
        .filter(|b| b.auth_type == "phone" && b.auth_value == phone)
        .collect();
    assert_eq!(methods.len(), 1);
}

#[tokio::test]
async fn test_rebind_same_identity_is_idempotent() {
    let ctx = TestContext::new().await;
    let service = BindingService::new(ctx.pool.clone());
    let universal_id = Uuid::new_v4();
    let email = unique("a") + "@example.com";

    let first = service.bind(universal_id, "email", &email).await.unwrap();
    let second = service.bind(universal_id, "email", &email).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(binding_count(&ctx, universal_id).await, 1);
}

#[tokio::test]
async fn test_bind_conflict_with_other_identity() {
    let ctx = TestContext::new().await;
    let service = BindingService::new(ctx.pool.clone());
    let email = unique("a") + "@example.com";

    service
        .bind(Uuid::new_v4(), "email", &email)
        .await
        .unwrap();

    let err = service
        .bind(Uuid::new_v4(), "email", &email)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IdentityError::CredentialAlreadyBound { auth_type } if auth_type == "email"
    ));
}

#[tokio::test]
async fn test_unbind_rejects_last_credential() {
    let ctx = TestContext::new().await;
    let service = BindingService::new(ctx.pool.clone());
    let universal_id = Uuid::new_v4();

    service
        .bind(universal_id, "phone", &unique("555"))
        .await
        .unwrap();

    let err = service.unbind(universal_id, "phone").await.unwrap_err();
    assert!(matches!(err, IdentityError::LastCredential));

    // The store is unchanged.
    assert_eq!(binding_count(&ctx, universal_id).await, 1);
}

#[tokio::test]
async fn test_unbind_missing_type() {
    let ctx = TestContext::new().await;
    let service = BindingService::new(ctx.pool.clone());
    let universal_id = Uuid::new_v4();

    service
        .bind(universal_id, "phone", &unique("555"))
        .await
        .unwrap();
    service
        .bind(universal_id, "email", &(unique("a") + "@example.com"))
        .await
        .unwrap();

    let err = service.unbind(universal_id, "github").await.unwrap_err();
    assert!(matches!(
        err,
        IdentityError::BindingNotFound { auth_type } if auth_type == "github"
    ));
}

#[tokio::test]
async fn test_unbind_removes_single_row() {
    let ctx = TestContext::new().await;
    let service = BindingService::new(ctx.pool.clone());
    let universal_id = Uuid::new_v4();

    service
        .bind(universal_id, "phone", &unique("555"))
        .await
        .unwrap();
    service
        .bind(universal_id, "email", &(unique("a") + "@example.com"))
        .await
        .unwrap();

    service.unbind(universal_id, "phone").await.unwrap();

    let remaining = service.list(universal_id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].auth_type, "email");
}

#[tokio::test]
async fn test_create_for_account_uses_hint_then_priority() {
    let ctx = TestContext::new().await;
    let service = BindingService::new(ctx.pool.clone());

    let email = unique("alice") + "@example.com";
    let github = unique("alice-gh");
    let account = ctx
        .create_account(|a| {
            a.email = Some(email.clone());
            a.github = Some(github.clone());
        })
        .await;

    // Hinted type has a value: it wins.
    let binding = service
        .create_for_account(&account, account.universal_id, Some("github"), None)
        .await
        .unwrap();
    assert_eq!(binding.auth_type, "github");
    assert_eq!(binding.auth_value, github);

    // No value for the hint: detection falls back to the highest-priority
    // populated field.
    let other = ctx
        .create_account(|a| {
            a.email = Some(unique("bob") + "@example.com");
        })
        .await;
    let binding = service
        .create_for_account(&other, other.universal_id, Some("wechat"), None)
        .await
        .unwrap();
    assert_eq!(binding.auth_type, "email");
}

#[tokio::test]
async fn test_create_for_account_without_credentials() {
    let ctx = TestContext::new().await;
    let service = BindingService::new(ctx.pool.clone());

    let account = ctx.create_account(|_| {}).await;
    let err = service
        .create_for_account(&account, account.universal_id, Some("email"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::NoCredentialAvailable { .. }));
}

// ── Merge orchestrator ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_merge_transfers_credentials_and_purges_records() {
    let ctx = TestContext::new().await;
    let bindings = BindingService::new(ctx.pool.clone());
    let service = merge_service(&ctx);

    let email = unique("a") + "@example.com";
    let phone = unique("555");

    let reserved = ctx.create_account(|_| {}).await;
    let deleted = ctx.create_account(|_| {}).await;

    bindings
        .bind(reserved.universal_id, "email", &email)
        .await
        .unwrap();
    bindings
        .bind(deleted.universal_id, "phone", &phone)
        .await
        .unwrap();

    // Dependent records on both sides.
    AuthToken::insert(&ctx.pool, &deleted.name).await.unwrap();
    Payment::insert(&ctx.pool, &deleted.name).await.unwrap();
    AuthToken::insert(&ctx.pool, &reserved.name).await.unwrap();

    let result = service
        .merge(
            reserved.universal_id,
            &token_for(&reserved),
            &token_for(&deleted),
        )
        .await
        .unwrap();

    assert_eq!(result.universal_id, reserved.universal_id);
    assert_eq!(result.deleted_user_id, deleted.universal_id);
    assert_eq!(
        result.merged_auth_methods,
        vec![AuthMethod {
            auth_type: "phone".to_string(),
            auth_value: phone.clone(),
        }]
    );

    // The survivor now holds both credentials.
    let survivor_bindings = bindings.list(reserved.universal_id).await.unwrap();
    assert_eq!(survivor_bindings.len(), 2);
    assert!(survivor_bindings.iter().any(|b| b.auth_value == phone));

    // The losing identity is fully gone.
    assert_eq!(binding_count(&ctx, deleted.universal_id).await, 0);
    assert!(
        Account::find_by_universal_id(&ctx.pool, deleted.universal_id)
            .await
            .unwrap()
            .is_none()
    );

    // Its dependent records are purged; the survivor's are untouched.
    let (deleted_tokens,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM auth_tokens WHERE account_name = $1")
            .bind(&deleted.name)
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
    assert_eq!(deleted_tokens, 0);
    let (deleted_payments,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM payments WHERE account_name = $1")
            .bind(&deleted.name)
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
    assert_eq!(deleted_payments, 0);
    let (reserved_tokens,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM auth_tokens WHERE account_name = $1")
            .bind(&reserved.name)
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
    assert_eq!(reserved_tokens, 1);
}

#[tokio::test]
async fn test_merge_skips_credential_shared_with_survivor() {
    let ctx = TestContext::new().await;
    let bindings = BindingService::new(ctx.pool.clone());
    let service = merge_service(&ctx);

    let shared_email = unique("shared") + "@example.com";
    let phone = unique("555");

    let reserved = ctx.create_account(|_| {}).await;
    let deleted = ctx.create_account(|_| {}).await;

    // Both identities holding the same email only happens in datasets that
    // predate the unique index (two signups with one address). Emulate such
    // a legacy dataset: drop the constraint, seed the duplicate, merge, and
    // restore it - the merge itself removes the duplicate row.
    sqlx::query("ALTER TABLE identity_bindings DROP CONSTRAINT identity_bindings_auth_key")
        .execute(&ctx.pool)
        .await
        .unwrap();
    for (universal_id, auth_type, auth_value) in [
        (reserved.universal_id, "email", shared_email.as_str()),
        (deleted.universal_id, "email", shared_email.as_str()),
        (deleted.universal_id, "phone", phone.as_str()),
    ] {
        sqlx::query(
            "INSERT INTO identity_bindings (universal_id, auth_type, auth_value) VALUES ($1, $2, $3)",
        )
        .bind(universal_id)
        .bind(auth_type)
        .bind(auth_value)
        .execute(&ctx.pool)
        .await
        .unwrap();
    }

    let result = service
        .merge(
            reserved.universal_id,
            &token_for(&reserved),
            &token_for(&deleted),
        )
        .await
        .unwrap();

    // Only the phone moved; the shared email was skipped, not duplicated.
    assert_eq!(
        result.merged_auth_methods,
        vec![AuthMethod {
            auth_type: "phone".to_string(),
            auth_value: phone.clone(),
        }]
    );

    let survivor_bindings = bindings.list(reserved.universal_id).await.unwrap();
    assert_eq!(survivor_bindings.len(), 2);
    assert_eq!(
        survivor_bindings
            .iter()
            .filter(|b| b.auth_type == "email" && b.auth_value == shared_email)
            .count(),
        1
    );
    assert_eq!(binding_count(&ctx, deleted.universal_id).await, 0);

    sqlx::query(
        "ALTER TABLE identity_bindings ADD CONSTRAINT identity_bindings_auth_key UNIQUE (auth_type, auth_value)",
    )
    .execute(&ctx.pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_merge_rejects_self() {
    let ctx = TestContext::new().await;
    let bindings = BindingService::new(ctx.pool.clone());
    let service = merge_service(&ctx);

    let account = ctx.create_account(|_| {}).await;
    bindings
        .bind(account.universal_id, "phone", &unique("555"))
        .await
        .unwrap();

    let token = token_for(&account);
    let err = service
        .merge(account.universal_id, &token, &token)
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::SameAccount));

    // Nothing was touched.
    assert_eq!(binding_count(&ctx, account.universal_id).await, 1);
    assert!(
        Account::find_by_universal_id(&ctx.pool, account.universal_id)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_merge_rejects_non_participant() {
    let ctx = TestContext::new().await;
    let service = merge_service(&ctx);

    let reserved = ctx.create_account(|_| {}).await;
    let deleted = ctx.create_account(|_| {}).await;
    let outsider = ctx.create_account(|_| {}).await;

    let err = service
        .merge(
            outsider.universal_id,
            &token_for(&reserved),
            &token_for(&deleted),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::NotParticipant));
}

#[tokio::test]
async fn test_merge_rejects_flagged_account() {
    let ctx = TestContext::new().await;
    let service = merge_service(&ctx);

    let reserved = ctx.create_account(|_| {}).await;
    let deleted = ctx.create_account(|_| {}).await;
    ctx.flag_deleted(&deleted).await;

    let err = service
        .merge(
            reserved.universal_id,
            &token_for(&reserved),
            &token_for(&deleted),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::AccountAlreadyDeleted { .. }));
}

#[tokio::test]
async fn test_merge_rejects_invalid_token() {
    let ctx = TestContext::new().await;
    let service = merge_service(&ctx);

    let reserved = ctx.create_account(|_| {}).await;

    let err = service
        .merge(
            reserved.universal_id,
            &token_for(&reserved),
            "not-a-valid-token",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::InvalidToken { .. }));
}

#[tokio::test]
async fn test_merge_rejects_unknown_account() {
    let ctx = TestContext::new().await;
    let service = merge_service(&ctx);

    let reserved = ctx.create_account(|_| {}).await;
    let ghost = ctx.create_account(|_| {}).await;
    let ghost_token = token_for(&ghost);
    Account::delete(&ctx.pool, ghost.id).await.unwrap();

    let err = service
        .merge(reserved.universal_id, &token_for(&reserved), &ghost_token)
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::AccountNotFound { .. }));
}

/// A purge collaborator whose backing store is down.
struct FailingPurge;

#[async_trait]
impl AccountPurge for FailingPurge {
    fn name(&self) -> &'static str {
        "payments"
    }

    async fn delete_by_account(
        &self,
        _conn: &mut PgConnection,
        _account: &AccountRef,
    ) -> Result<u64, sqlx::Error> {
        Err(sqlx::Error::Protocol("payment store unavailable".into()))
    }
}

#[tokio::test]
async fn test_merge_rolls_back_when_purge_fails() {
    let ctx = TestContext::new().await;
    let bindings = BindingService::new(ctx.pool.clone());
    let service = MergeService::new(
        ctx.pool.clone(),
        JwtTokenVerifier::shared(SECRET),
        vec![Arc::new(FailingPurge)],
    );

    let reserved = ctx.create_account(|_| {}).await;
    let deleted = ctx.create_account(|_| {}).await;
    let phone = unique("555");
    bindings
        .bind(deleted.universal_id, "phone", &phone)
        .await
        .unwrap();

    let err = service
        .merge(
            reserved.universal_id,
            &token_for(&reserved),
            &token_for(&deleted),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::Database(_)));

    // The whole transaction rolled back: no transfer happened, the losing
    // identity's bindings and account row are intact.
    assert_eq!(binding_count(&ctx, reserved.universal_id).await, 0);
    assert_eq!(binding_count(&ctx, deleted.universal_id).await, 1);
    assert!(
        Account::find_by_universal_id(&ctx.pool, deleted.universal_id)
            .await
            .unwrap()
            .is_some()
    );
}

// ── Unified login resolver ─────────────────────────────────────────────────

#[tokio::test]
async fn test_login_resolves_phone_credential() {
    let ctx = TestContext::new().await;
    let bindings = BindingService::new(ctx.pool.clone());
    let login = LoginService::new(ctx.pool.clone());

    let phone = unique("555");
    let account = ctx
        .create_account(|a| {
            a.phone = Some(phone.clone());
        })
        .await;
    bindings
        .bind(account.universal_id, "phone", &phone)
        .await
        .unwrap();

    let resolved = login.resolve("phone", &phone, None).await.unwrap();
    assert_eq!(resolved.id, account.id);
}

#[tokio::test]
async fn test_login_unknown_credential_fails() {
    let ctx = TestContext::new().await;
    let login = LoginService::new(ctx.pool.clone());

    let err = login
        .resolve("phone", &unique("555"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::AuthenticationFailed));
}

#[tokio::test]
async fn test_login_password_flow() {
    let ctx = TestContext::new().await;
    let bindings = BindingService::new(ctx.pool.clone());
    let login = LoginService::new(ctx.pool.clone());

    // Cheap test-only cost parameters; verification reads the cost from the
    // hash itself.
    let hash = PasswordHasher::with_params(1024, 1, 1)
        .unwrap()
        .hash_password("hunter2")
        .unwrap();
    let account = ctx
        .create_account(|a| {
            a.password_hash = Some(hash.clone());
        })
        .await;
    let composite = account.owner_name();
    bindings
        .bind(account.universal_id, "password", &composite)
        .await
        .unwrap();

    let resolved = login
        .resolve("password", &composite, Some("hunter2"))
        .await
        .unwrap();
    assert_eq!(resolved.id, account.id);

    let err = login
        .resolve("password", &composite, Some("wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::AuthenticationFailed));

    let err = login
        .resolve("password", &composite, None)
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::AuthenticationFailed));

    let err = login
        .resolve("password", "malformed-composite", Some("hunter2"))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::AuthenticationFailed));
}
