//! Response models for the identity API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One bound authentication method. A projection of a binding row; the
/// binding id and timestamps stay internal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthMethod {
    pub auth_type: String,
    pub auth_value: String,
}

/// Response for a successful merge.
#[derive(Debug, Serialize, ToSchema)]
pub struct MergeResponse {
    /// The surviving universal identity.
    pub universal_id: Uuid,
    /// The universal identity whose account was deleted.
    pub deleted_user_id: Uuid,
    /// Credentials transferred to the surviving identity.
    pub merged_auth_methods: Vec<AuthMethod>,
}

/// Response describing an identity and its bound methods.
#[derive(Debug, Serialize, ToSchema)]
pub struct IdentityInfoResponse {
    pub universal_id: Uuid,
    pub bound_auth_methods: Vec<AuthMethod>,
}

/// Response for a successful bind.
#[derive(Debug, Serialize, ToSchema)]
pub struct BindResponse {
    pub binding: AuthMethod,
}
