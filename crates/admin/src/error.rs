//! Unified error handling for the admin API.
//!
//! Every error leaves the server as the standard envelope
//! `{"status": false, "message": "..."}` with a matching HTTP status.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use stockroom_core::reconciliation::ReconciliationError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected before any storage was touched.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate or otherwise conflicting record.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// The request deadline elapsed.
    #[error("Request timed out")]
    Timeout,

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Resource not found".to_string()),
            RepositoryError::InvalidReference(message) => Self::NotFound(message),
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Database(other),
        }
    }
}

impl From<ReconciliationError> for AppError {
    fn from(err: ReconciliationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::InvalidToken | AuthError::ExpiredToken | AuthError::UnknownRole(_) => {
                Self::Unauthorized("Invalid or expired token".to_string())
            }
            AuthError::Repository(repo) => repo.into(),
            AuthError::PasswordHash | AuthError::Encoding(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::Timeout
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Message safe to show to clients.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Validation(m)
            | Self::Conflict(m)
            | Self::NotFound(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m) => m.clone(),
            Self::Timeout => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        } else if matches!(self, Self::Timeout) {
            tracing::warn!("Request deadline elapsed");
        }

        let body = serde_json::json!({
            "status": false,
            "message": self.public_message(),
        });

        (self.status_code(), Json(body)).into_response()
    }
}

/// Set the Sentry user context from an admin user ID.
pub fn set_sentry_user(admin_user_id: i32) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("PO-2025-0001".to_string());
        assert_eq!(err.to_string(), "Not found: PO-2025-0001");

        let err = AppError::Validation("quantity must be positive".to_string());
        assert_eq!(err.to_string(), "Validation error: quantity must be positive");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(AppError::Timeout), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_errors_map_to_client_errors() {
        assert!(matches!(
            AppError::from(RepositoryError::Conflict("dup".to_string())),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(RepositoryError::InvalidReference("supplier not found".to_string())),
            AppError::NotFound(m) if m == "supplier not found"
        ));
        assert!(matches!(
            AppError::from(RepositoryError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(RepositoryError::DataCorruption("bad".to_string())),
            AppError::Database(_)
        ));
    }

    #[test]
    fn test_database_details_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "mobile column holds garbage".to_string(),
        ));
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_auth_errors_are_unauthorized() {
        assert!(matches!(
            AppError::from(AuthError::ExpiredToken),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from(AuthError::InvalidCredentials),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from(AuthError::PasswordHash),
            AppError::Internal(_)
        ));
    }
}
