//! Admin authentication service.
//!
//! Username and password login backed by argon2 hashes, with stateless HS256
//! session tokens carrying the actor triple.

mod error;
pub mod password;
pub mod token;

use sqlx::PgPool;

use stockroom_core::{AdminRole, BranchId};

use crate::db::admin_users::AdminUserRepository;
use crate::models::{AdminUser, CurrentAdmin};

pub use error::AuthError;
pub use password::{MIN_PASSWORD_LENGTH, hash_password, verify_password};
pub use token::{Claims, TokenService};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: AdminUser,
    pub token: String,
}

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: AdminUserRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            users: AdminUserRepository::new(pool),
            tokens,
        }
    }

    /// Check a username and password and issue a session token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown username or a
    /// wrong password.
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginSession, AuthError> {
        let login = self
            .users
            .get_login(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &login.password_hash)?;

        let token = self.tokens.issue(&CurrentAdmin {
            id: login.user.id,
            role: login.user.role,
            branch_id: login.user.branch_id,
        })?;

        tracing::info!(admin_id = %login.user.id, "Admin logged in");

        Ok(LoginSession {
            user: login.user,
            token,
        })
    }
}

/// Create an admin account with a hashed password.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
/// Returns `AuthError::Repository` if the username is taken or the branch
/// doesn't exist.
pub async fn create_admin(
    pool: &PgPool,
    username: &str,
    name: &str,
    password: &str,
    role: AdminRole,
    branch_id: BranchId,
) -> Result<AdminUser, AuthError> {
    let password_hash = hash_password(password)?;
    let user = AdminUserRepository::new(pool)
        .create(username.trim(), name.trim(), &password_hash, role, branch_id)
        .await?;
    Ok(user)
}
