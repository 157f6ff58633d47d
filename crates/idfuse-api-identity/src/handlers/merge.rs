//! Account merge handler.

use axum::{extract::State, Json};
use tracing::info;

use crate::error::IdentityResult;
use crate::extractors::AuthenticatedIdentity;
use crate::models::{MergeRequest, MergeResponse};
use crate::IdentityState;

/// Merge two accounts, deleting one and transferring its identity bindings
/// to the other.
///
/// The caller must be one of the two accounts named by the request tokens.
#[utoipa::path(
    post,
    path = "/identity/merge",
    request_body = MergeRequest,
    responses(
        (status = 200, description = "Accounts merged", body = MergeResponse),
        (status = 400, description = "Cannot merge an account with itself"),
        (status = 401, description = "Not authenticated or invalid participant token"),
        (status = 403, description = "Caller is not a merge participant"),
        (status = 404, description = "Participant account not found"),
    ),
    security(("bearerAuth" = [])),
    tag = "Identity"
)]
pub async fn merge_accounts(
    State(state): State<IdentityState>,
    caller: AuthenticatedIdentity,
    Json(request): Json<MergeRequest>,
) -> IdentityResult<Json<MergeResponse>> {
    info!(caller = %caller.universal_id, "Merge requested");

    let result = state
        .merge_service
        .merge(
            caller.universal_id,
            &request.reserved_user_token,
            &request.deleted_user_token,
        )
        .await?;

    Ok(Json(MergeResponse {
        universal_id: result.universal_id,
        deleted_user_id: result.deleted_user_id,
        merged_auth_methods: result.merged_auth_methods,
    }))
}
