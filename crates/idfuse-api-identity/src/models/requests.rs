//! Request models for the identity API.

use serde::Deserialize;
use utoipa::ToSchema;

/// Request to merge two accounts into one.
///
/// Both tokens must verify; the account behind `deleted_user_token` is
/// removed and its credentials move to the reserved account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MergeRequest {
    /// Token of the account to be kept.
    pub reserved_user_token: String,
    /// Token of the account to be deleted.
    pub deleted_user_token: String,
}

/// Request to bind an additional login method.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BindRequest {
    /// Authentication type (email, phone, github, ...).
    pub auth_type: String,
    /// Authentication value (address, number, provider user id, ...).
    pub auth_value: String,
}

/// Request to unbind a login method.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UnbindRequest {
    /// Authentication type to unbind.
    pub auth_type: String,
}
