//! Axum extractors for identity handlers.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::IdentityError;
use idfuse_auth::IdentityClaims;

/// Identity context extracted from an authenticated request.
///
/// The JWT middleware verifies the bearer token and stores its
/// [`IdentityClaims`] in request extensions; this extractor additionally
/// requires the claims to carry a universal identity, since every identity
/// endpoint operates on one.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    /// The account the token was issued to, as `owner/name`.
    pub subject: String,
    /// The caller's universal identity.
    pub universal_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedIdentity
where
    S: Send + Sync,
{
    type Rejection = IdentityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<IdentityClaims>()
            .ok_or_else(|| IdentityError::InvalidToken {
                reason: "missing bearer token".to_string(),
            })?;

        let universal_id =
            claims
                .universal_id()
                .ok_or_else(|| IdentityError::InvalidToken {
                    reason: "account does not have a unified identity".to_string(),
                })?;

        Ok(AuthenticatedIdentity {
            subject: claims.sub.clone(),
            universal_id: *universal_id.as_uuid(),
        })
    }
}
