//! Token verification interface.

use std::sync::Arc;

use crate::error::{IdentityError, IdentityResult};
use idfuse_auth::{decode_token_with_config, IdentityClaims, ValidationConfig};

/// Interface for verifying bearer tokens.
///
/// Lets the identity engine authenticate merge participants without
/// depending on how tokens are issued; tests substitute their own
/// implementation.
pub trait TokenVerifier: Send + Sync {
    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidToken` on tampering, expiry, or
    /// malformed input.
    fn verify(&self, token: &str) -> IdentityResult<IdentityClaims>;
}

/// JWT-backed verifier using the application signing secret.
pub struct JwtTokenVerifier {
    secret: Vec<u8>,
    validation: ValidationConfig,
}

impl JwtTokenVerifier {
    /// Create a verifier for the given signing secret.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            validation: ValidationConfig::default(),
        }
    }

    /// Use a custom validation config (issuer pinning, leeway).
    #[must_use]
    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    /// Convenience constructor returning the trait object the services
    /// expect.
    #[must_use]
    pub fn shared(secret: impl Into<Vec<u8>>) -> Arc<dyn TokenVerifier> {
        Arc::new(Self::new(secret))
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: &str) -> IdentityResult<IdentityClaims> {
        decode_token_with_config(token, &self.secret, &self.validation).map_err(|e| {
            IdentityError::InvalidToken {
                reason: e.to_string(),
            }
        })
    }
}
