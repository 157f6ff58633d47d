//! Unbind handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use crate::error::IdentityResult;
use crate::extractors::AuthenticatedIdentity;
use crate::models::UnbindRequest;
use crate::IdentityState;

/// Unbind an authentication method from the caller's unified identity.
///
/// Fails when the method is the identity's only remaining one.
#[utoipa::path(
    post,
    path = "/identity/unbind",
    request_body = UnbindRequest,
    responses(
        (status = 204, description = "Method unbound"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Cannot unbind the last remaining method"),
        (status = 404, description = "No binding for this auth type"),
    ),
    security(("bearerAuth" = [])),
    tag = "Identity"
)]
pub async fn unbind_auth_method(
    State(state): State<IdentityState>,
    caller: AuthenticatedIdentity,
    Json(request): Json<UnbindRequest>,
) -> IdentityResult<impl IntoResponse> {
    info!(
        universal_id = %caller.universal_id,
        auth_type = %request.auth_type,
        "Unbinding authentication method"
    );

    state
        .binding_service
        .unbind(caller.universal_id, &request.auth_type)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
