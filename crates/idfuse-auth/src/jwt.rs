//! JWT encoding and decoding with the HS256 algorithm.
//!
//! Tokens are application-scoped: each deployment signs with one shared
//! secret, and the engine only ever verifies tokens it issued itself.

use crate::claims::IdentityClaims;
use crate::error::AuthError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};

/// Configuration for JWT validation.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Leeway in seconds for exp/iat validation (clock skew tolerance).
    pub leeway: u64,
    /// Expected issuer (if set, tokens with a different issuer are rejected).
    pub issuer: Option<String>,
    /// Whether to validate expiration.
    pub validate_exp: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            leeway: 60,
            issuer: None,
            validate_exp: true,
        }
    }
}

impl ValidationConfig {
    /// Set the expected issuer.
    #[must_use]
    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.issuer = Some(iss.into());
        self
    }

    /// Disable expiration validation (use with caution).
    #[must_use]
    pub fn skip_exp_validation(mut self) -> Self {
        self.validate_exp = false;
        self
    }
}

/// Encode claims into a signed token string.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if encoding fails.
pub fn encode_token(claims: &IdentityClaims, secret: &[u8]) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret);
    let header = Header::new(Algorithm::HS256);

    encode(&header, claims, &key)
        .map_err(|e| AuthError::InvalidToken(format!("Encoding failed: {e}")))
}

/// Decode and validate a token with default validation settings.
///
/// # Errors
///
/// - `AuthError::TokenExpired` - token has expired
/// - `AuthError::InvalidSignature` - signature verification failed
/// - `AuthError::InvalidToken` - token format is invalid
/// - `AuthError::InvalidAlgorithm` - token uses an unsupported algorithm
pub fn decode_token(token: &str, secret: &[u8]) -> Result<IdentityClaims, AuthError> {
    decode_token_with_config(token, secret, &ValidationConfig::default())
}

/// Decode and validate a token with a custom validation config.
pub fn decode_token_with_config(
    token: &str,
    secret: &[u8],
    config: &ValidationConfig,
) -> Result<IdentityClaims, AuthError> {
    let key = DecodingKey::from_secret(secret);

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = config.leeway;
    validation.validate_exp = config.validate_exp;
    validation.algorithms = vec![Algorithm::HS256];
    validation.validate_aud = false;

    if let Some(ref iss) = config.issuer {
        validation.set_issuer(&[iss]);
    }

    let token_data: TokenData<IdentityClaims> =
        decode(token, &key, &validation).map_err(map_jwt_error)?;

    Ok(token_data.claims)
}

/// Map jsonwebtoken errors to [`AuthError`].
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => AuthError::InvalidAlgorithm,
        ErrorKind::InvalidToken => AuthError::InvalidToken("Malformed token".to_string()),
        ErrorKind::Base64(_) => AuthError::InvalidToken("Invalid base64 encoding".to_string()),
        ErrorKind::Json(_) => AuthError::InvalidToken("Invalid JSON in claims".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.to_string()),
        _ => AuthError::InvalidToken(format!("Token validation failed: {err}")),
    }
}
