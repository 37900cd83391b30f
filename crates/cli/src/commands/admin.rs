//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Password is read from STOCKROOM_ADMIN_PASSWORD unless --password-env names another variable
//! STOCKROOM_ADMIN_PASSWORD='...' stockroom-cli admin create -u priya -n "Priya Raman" -r super_admin -b Main
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for the admin database

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use stockroom_admin::db::{BranchRepository, RepositoryError};
use stockroom_admin::models::CreateBranchInput;
use stockroom_admin::services::auth::{self, AuthError, MIN_PASSWORD_LENGTH};
use stockroom_core::AdminRole;

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Password variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingPassword(String),

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer")]
    InvalidRole(String),

    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Options for `admin create`.
#[derive(Debug)]
pub struct CreateAdmin<'a> {
    pub username: &'a str,
    pub name: &'a str,
    pub role: &'a str,
    pub branch: &'a str,
    pub password_env: &'a str,
}

/// Create a new admin user, creating the branch first if it doesn't exist.
///
/// # Returns
///
/// The ID of the created admin user.
///
/// # Errors
///
/// Returns `AdminError` if input is invalid, the username is taken or the
/// database is unreachable.
pub async fn create_user(opts: &CreateAdmin<'_>) -> Result<i32, AdminError> {
    let role: AdminRole = opts
        .role
        .parse()
        .map_err(|_| AdminError::InvalidRole(opts.role.to_owned()))?;

    if opts.username.trim().is_empty() {
        return Err(AdminError::EmptyUsername);
    }

    let password = std::env::var(opts.password_env)
        .map(SecretString::from)
        .map_err(|_| AdminError::MissingPassword(opts.password_env.to_owned()))?;
    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::WeakPassword);
    }

    let pool = connect().await?;

    let branches = BranchRepository::new(&pool);
    let branch = if let Some(branch) = branches.get_by_name(opts.branch).await? {
        branch
    } else {
        tracing::info!("Creating branch: {}", opts.branch);
        branches
            .create(&CreateBranchInput {
                name: opts.branch.to_owned(),
                address: None,
            })
            .await?
    };

    tracing::info!("Creating admin user: {} ({})", opts.username, role);

    let user = auth::create_admin(
        &pool,
        opts.username,
        opts.name,
        password.expose_secret(),
        role,
        branch.id,
    )
    .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Username: {}, Role: {}, Branch: {}",
        user.id,
        user.username,
        user.role,
        branch.name
    );

    Ok(user.id.as_i32())
}
