//! JWT claims structure with standard and custom claims.
//!
//! Provides the [`IdentityClaims`] struct containing RFC 7519 standard claims
//! plus the idfuse-specific `uid` claim carrying the universal identity.

use chrono::{Duration, Utc};
use idfuse_core::UniversalId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims containing standard and custom claims.
///
/// # Standard Claims (RFC 7519)
///
/// - `sub`: Subject (the account, as `owner/name`)
/// - `iss`: Issuer
/// - `exp`: Expiration time (Unix timestamp)
/// - `iat`: Issued at (Unix timestamp)
/// - `jti`: JWT ID (unique identifier)
///
/// # Custom Claims
///
/// - `uid`: the universal identity the account belongs to. Absent for
///   accounts created before identity bindings existed.
///
/// # Example
///
/// ```rust
/// use idfuse_auth::IdentityClaims;
/// use idfuse_core::UniversalId;
///
/// let claims = IdentityClaims::builder()
///     .subject("built-in/alice")
///     .universal_id(UniversalId::new())
///     .expires_in_secs(3600)
///     .build();
///
/// assert_eq!(claims.sub, "built-in/alice");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentityClaims {
    /// Subject - the account this token was issued to.
    pub sub: String,

    /// Issuer.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub iss: String,

    /// Expiration time as Unix timestamp.
    pub exp: i64,

    /// Issued-at time as Unix timestamp.
    pub iat: i64,

    /// Unique token identifier.
    pub jti: String,

    /// Universal identity of the subject, if it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<UniversalId>,
}

impl IdentityClaims {
    /// Start building a new set of claims.
    #[must_use]
    pub fn builder() -> IdentityClaimsBuilder {
        IdentityClaimsBuilder::default()
    }

    /// The universal identity carried by this token, if any.
    #[must_use]
    pub fn universal_id(&self) -> Option<UniversalId> {
        self.uid
    }
}

/// Builder for [`IdentityClaims`].
#[derive(Debug, Default)]
pub struct IdentityClaimsBuilder {
    sub: String,
    iss: String,
    exp: Option<i64>,
    uid: Option<UniversalId>,
}

impl IdentityClaimsBuilder {
    /// Set the subject (account `owner/name`).
    #[must_use]
    pub fn subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = sub.into();
        self
    }

    /// Set the issuer.
    #[must_use]
    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = iss.into();
        self
    }

    /// Set the universal identity claim.
    #[must_use]
    pub fn universal_id(mut self, uid: UniversalId) -> Self {
        self.uid = Some(uid);
        self
    }

    /// Set an absolute expiration timestamp.
    #[must_use]
    pub fn expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Expire the token `secs` seconds from now.
    #[must_use]
    pub fn expires_in_secs(mut self, secs: i64) -> Self {
        self.exp = Some((Utc::now() + Duration::seconds(secs)).timestamp());
        self
    }

    /// Finish building. `iat` and `jti` are filled in automatically.
    #[must_use]
    pub fn build(self) -> IdentityClaims {
        let now = Utc::now().timestamp();
        IdentityClaims {
            sub: self.sub,
            iss: self.iss,
            exp: self.exp.unwrap_or(now),
            iat: now,
            jti: Uuid::new_v4().to_string(),
            uid: self.uid,
        }
    }
}
