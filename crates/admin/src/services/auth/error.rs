//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password. Deliberately not distinguished.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Token is malformed, tampered with or signed with another key.
    #[error("invalid token")]
    InvalidToken,

    /// Token signature is valid but it has expired.
    #[error("token expired")]
    ExpiredToken,

    /// Token carries a role id this server doesn't know.
    #[error("unknown role id {0}")]
    UnknownRole(i32),

    /// Token could not be signed.
    #[error("token encoding failed: {0}")]
    Encoding(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
