//! Router configuration for identity endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::handlers;
use crate::services::{default_purges, BindingService, LoginService, MergeService};
use crate::token::TokenVerifier;

/// Shared state for identity handlers.
#[derive(Clone)]
pub struct IdentityState {
    /// Database connection pool.
    pub pool: PgPool,
    /// Binding management service.
    pub binding_service: BindingService,
    /// Merge orchestration service.
    pub merge_service: MergeService,
    /// Unified login resolution service.
    pub login_service: LoginService,
    /// Verifier for the participant tokens inside merge requests.
    pub token_verifier: Arc<dyn TokenVerifier>,
}

/// Configuration for building identity state.
pub struct IdentityConfig {
    pub pool: PgPool,
    pub token_verifier: Arc<dyn TokenVerifier>,
}

impl IdentityState {
    /// Create identity state with the default purge registry.
    #[must_use]
    pub fn new(config: IdentityConfig) -> Self {
        let binding_service = BindingService::new(config.pool.clone());
        let merge_service = MergeService::new(
            config.pool.clone(),
            config.token_verifier.clone(),
            default_purges(),
        );
        let login_service = LoginService::new(config.pool.clone());

        Self {
            pool: config.pool,
            binding_service,
            merge_service,
            login_service,
            token_verifier: config.token_verifier,
        }
    }
}

/// Create the identity router.
///
/// All routes require the JWT middleware to have stored verified claims in
/// request extensions. Typically mounted at the API root, e.g.
/// `/api/identity/...`.
pub fn identity_router() -> Router<IdentityState> {
    Router::new()
        .route("/identity/merge", post(handlers::merge_accounts))
        .route("/identity/info", get(handlers::get_identity_info))
        .route("/identity/bind", post(handlers::bind_auth_method))
        .route("/identity/unbind", post(handlers::unbind_auth_method))
}
