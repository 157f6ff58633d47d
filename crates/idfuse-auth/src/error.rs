//! Error types for authentication operations.

use thiserror::Error;

/// Authentication error types.
///
/// Each variant maps to a specific failure mode in token or password
/// verification.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // JWT errors
    /// Token has expired (exp claim is in the past).
    #[error("Token has expired")]
    TokenExpired,

    /// Token signature is invalid.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token format is malformed or invalid.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token uses an unsupported algorithm (only HS256 is allowed).
    #[error("Unsupported algorithm: only HS256 is allowed")]
    InvalidAlgorithm,

    /// Required claim is missing from token.
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    // Password errors
    /// Password hashing operation failed.
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Password hash format is invalid.
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

impl AuthError {
    /// Check if this error indicates an expired token.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::TokenExpired)
    }

    /// Check if this error is related to JWT validation.
    #[must_use]
    pub fn is_jwt_error(&self) -> bool {
        matches!(
            self,
            AuthError::TokenExpired
                | AuthError::InvalidSignature
                | AuthError::InvalidToken(_)
                | AuthError::InvalidAlgorithm
                | AuthError::MissingClaim(_)
        )
    }
}
