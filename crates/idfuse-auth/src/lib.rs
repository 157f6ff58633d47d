//! Authentication collaborators for idfuse.
//!
//! This crate provides the two cryptographic services the identity engine
//! consumes but does not own:
//!
//! - JWT claim verification ([`decode_token`]) producing [`IdentityClaims`]
//!   with the subject and its universal identity
//! - Argon2id password verification ([`PasswordHasher`])
//!
//! Both are deliberately free of storage access.

pub mod claims;
pub mod error;
pub mod jwt;
pub mod password;

pub use claims::IdentityClaims;
pub use error::AuthError;
pub use jwt::{decode_token, decode_token_with_config, encode_token, ValidationConfig};
pub use password::PasswordHasher;
