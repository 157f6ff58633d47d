//! Identity info handler.

use axum::{extract::State, Json};

use crate::error::IdentityResult;
use crate::extractors::AuthenticatedIdentity;
use crate::models::{AuthMethod, IdentityInfoResponse};
use crate::IdentityState;

/// Get the caller's unified identity and its bound authentication methods.
#[utoipa::path(
    get,
    path = "/identity/info",
    responses(
        (status = 200, description = "Identity information", body = IdentityInfoResponse),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearerAuth" = [])),
    tag = "Identity"
)]
pub async fn get_identity_info(
    State(state): State<IdentityState>,
    caller: AuthenticatedIdentity,
) -> IdentityResult<Json<IdentityInfoResponse>> {
    let bindings = state.binding_service.list(caller.universal_id).await?;

    let bound_auth_methods = bindings
        .into_iter()
        .map(|b| AuthMethod {
            auth_type: b.auth_type,
            auth_value: b.auth_value,
        })
        .collect();

    Ok(Json(IdentityInfoResponse {
        universal_id: caller.universal_id,
        bound_auth_methods,
    }))
}
