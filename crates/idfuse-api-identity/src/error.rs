//! Identity engine error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Identity engine errors.
///
/// Every variant is terminal: each one reflects either a failed logic
/// precondition or a storage error, and retrying without caller intervention
/// cannot fix either.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid token: {reason}")]
    InvalidToken { reason: String },

    #[error("Account not found for universal identity {universal_id}")]
    AccountNotFound { universal_id: Uuid },

    #[error("Account '{account}' has been deleted and cannot be merged")]
    AccountAlreadyDeleted { account: String },

    #[error("Cannot merge an account with itself")]
    SameAccount,

    #[error("Caller is not a participant of the requested merge")]
    NotParticipant,

    #[error("This {auth_type} is already bound to another identity")]
    CredentialAlreadyBound { auth_type: String },

    #[error("Cannot remove the only login method; bind another method first")]
    LastCredential,

    #[error("No credential value available for provider type: {hint}")]
    NoCredentialAvailable { hint: String },

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("No binding found for auth type: {auth_type}")]
    BindingNotFound { auth_type: String },

    #[error("Merge failed: {0}")]
    MergeFailed(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Whether a sqlx error is a unique-constraint violation.
///
/// A concurrent bind racing past the pre-check loses against the
/// `(auth_type, auth_value)` unique index and lands here.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Error response structure for API responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IdentityError {
    /// Get the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            IdentityError::InvalidToken { .. } => "invalid_token",
            IdentityError::AccountNotFound { .. } => "account_not_found",
            IdentityError::AccountAlreadyDeleted { .. } => "account_already_deleted",
            IdentityError::SameAccount => "same_account",
            IdentityError::NotParticipant => "not_participant",
            IdentityError::CredentialAlreadyBound { .. } => "credential_already_bound",
            IdentityError::LastCredential => "last_credential",
            IdentityError::NoCredentialAvailable { .. } => "no_credential_available",
            IdentityError::AuthenticationFailed => "authentication_failed",
            IdentityError::BindingNotFound { .. } => "binding_not_found",
            IdentityError::MergeFailed(_) => "merge_failed",
            IdentityError::Database(_) => "database_error",
        }
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
            IdentityError::AccountNotFound { .. } => StatusCode::NOT_FOUND,
            IdentityError::AccountAlreadyDeleted { .. } => StatusCode::GONE,
            IdentityError::SameAccount => StatusCode::BAD_REQUEST,
            IdentityError::NotParticipant => StatusCode::FORBIDDEN,
            IdentityError::CredentialAlreadyBound { .. } => StatusCode::CONFLICT,
            IdentityError::LastCredential => StatusCode::FORBIDDEN,
            IdentityError::NoCredentialAvailable { .. } => StatusCode::BAD_REQUEST,
            IdentityError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            IdentityError::BindingNotFound { .. } => StatusCode::NOT_FOUND,
            IdentityError::MergeFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            IdentityError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal errors are logged and sanitized; everything else is a
        // caller-facing precondition and surfaced verbatim.
        let message = match &self {
            IdentityError::Database(e) => {
                tracing::error!("Identity database error: {:?}", e);
                "A database error occurred".to_string()
            }
            IdentityError::MergeFailed(e) => {
                tracing::error!("Merge transaction failed to commit: {:?}", e);
                "The merge could not be completed".to_string()
            }
            _ => self.to_string(),
        };
        let body = ErrorResponse {
            error: self.error_code().to_string(),
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Result type alias for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;
