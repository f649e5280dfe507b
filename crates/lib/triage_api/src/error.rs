//! API error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::error;

use triage_core::auth::AuthError;
use triage_core::store::StoreError;

/// Convenience alias for handler and service results.
pub type AppResult<T> = Result<T, AppError>;

/// Everything a request can fail with.
///
/// Each variant carries a fixed status code and machine-readable error code;
/// the client-facing message is either fixed or carried in the variant.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Email is already in use")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Authentication required")]
    MissingCredential,
    #[error("Invalid or expired access token")]
    InvalidToken,
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("Refresh token is no longer valid")]
    RefreshTokenInvalidated,
    #[error("You don't have permission to do that")]
    PermissionDenied,
    #[error("{0}")]
    NotFound(String),
    #[error("Something went wrong")]
    Internal(String),
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::EmailTaken => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::MissingCredential | AppError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::InvalidRefreshToken
            | AppError::RefreshTokenInvalidated
            | AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::EmailTaken => "email_taken",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::MissingCredential => "missing_credential",
            AppError::InvalidToken => "invalid_token",
            AppError::InvalidRefreshToken => "invalid_refresh_token",
            AppError::RefreshTokenInvalidated => "refresh_token_invalidated",
            AppError::PermissionDenied => "permission_denied",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            error!(detail = %detail, "internal error");
        }
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            // The only unique constraint reachable from request data is the
            // user email.
            StoreError::Conflict(_) => AppError::EmailTaken,
            StoreError::Corrupt(detail) => AppError::Internal(detail),
            StoreError::Database(e) => AppError::Internal(e.to_string()),
            StoreError::Internal(detail) => AppError::Internal(detail),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal(detail) => AppError::Internal(detail),
            _ => AppError::InvalidToken,
        }
    }
}
