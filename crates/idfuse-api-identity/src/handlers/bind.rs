//! Bind handler.

use axum::{extract::State, Json};
use tracing::info;

use crate::error::{IdentityError, IdentityResult};
use crate::extractors::AuthenticatedIdentity;
use crate::models::{AuthMethod, BindRequest, BindResponse};
use crate::IdentityState;

/// Bind a new authentication method to the caller's unified identity.
#[utoipa::path(
    post,
    path = "/identity/bind",
    request_body = BindRequest,
    responses(
        (status = 200, description = "Method bound", body = BindResponse),
        (status = 400, description = "Missing auth_type or auth_value"),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Credential already bound to another identity"),
    ),
    security(("bearerAuth" = [])),
    tag = "Identity"
)]
pub async fn bind_auth_method(
    State(state): State<IdentityState>,
    caller: AuthenticatedIdentity,
    Json(request): Json<BindRequest>,
) -> IdentityResult<Json<BindResponse>> {
    if request.auth_type.is_empty() || request.auth_value.is_empty() {
        return Err(IdentityError::NoCredentialAvailable {
            hint: request.auth_type,
        });
    }

    info!(
        universal_id = %caller.universal_id,
        auth_type = %request.auth_type,
        "Binding authentication method"
    );

    let binding = state
        .binding_service
        .bind(caller.universal_id, &request.auth_type, &request.auth_value)
        .await?;

    Ok(Json(BindResponse {
        binding: AuthMethod {
            auth_type: binding.auth_type,
            auth_value: binding.auth_value,
        },
    }))
}
