//! Password hashing with Argon2id.
//!
//! Provides password hashing and verification using Argon2id with
//! OWASP-recommended parameters.

use crate::error::AuthError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Password hasher configuration.
///
/// Uses OWASP 2024 recommended parameters for Argon2id:
/// - Memory: 19456 KiB (19 MiB)
/// - Iterations: 2
/// - Parallelism: 1
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    /// Create a new password hasher with OWASP-recommended parameters.
    #[must_use]
    pub fn new() -> Self {
        // m=19456 (19 MiB), t=2, p=1. These constants are always valid;
        // failure would indicate a bug in the Argon2 library itself.
        let params = Params::new(19456, 2, 1, None)
            .expect("OWASP 2024 Argon2 parameters are valid constants");

        Self { params }
    }

    /// Create a password hasher with custom parameters.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::HashingFailed` if parameters are invalid.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::HashingFailed(format!("Invalid parameters: {e}")))?;

        Ok(Self { params })
    }

    /// Hash a password using Argon2id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::HashingFailed` if hashing fails.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Returns `Ok(true)` when the password matches, `Ok(false)` when it
    /// does not.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidHashFormat` if the stored hash cannot be
    /// parsed.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::InvalidHashFormat)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        match argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::InvalidHashFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reduced-cost hasher so the suite stays fast.
    fn hasher() -> PasswordHasher {
        PasswordHasher::with_params(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let h = hasher();
        let hash = h.hash_password("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(h.verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!h.verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let h = hasher();
        let a = h.hash_password("same password").unwrap();
        let b = h.hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_hash_format() {
        let h = hasher();
        let result = h.verify_password("anything", "not-a-phc-string");
        assert!(matches!(result.unwrap_err(), AuthError::InvalidHashFormat));
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(PasswordHasher::with_params(0, 0, 0).is_err());
    }
}
