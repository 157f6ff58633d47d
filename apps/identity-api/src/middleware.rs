//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use idfuse_api_identity::{IdentityError, IdentityState};

/// Verify the bearer token and store its claims in request extensions.
///
/// Handlers downstream read the claims through the `AuthenticatedIdentity`
/// extractor; requests without a valid token never reach them.
pub async fn jwt_auth(
    State(state): State<IdentityState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Some(token) => token,
        None => {
            return IdentityError::InvalidToken {
                reason: "missing or malformed Authorization header".to_string(),
            }
            .into_response();
        }
    };

    let claims = match state.token_verifier.verify(token) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(claims);
    next.run(request).await
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
