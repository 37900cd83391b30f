//! Admin user repository for database operations.
//!
//! Password hashes are read only by [`AdminUserRepository::get_login`]; every
//! other query returns the hash-free [`AdminUser`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use stockroom_core::{AdminUserId, BranchId};

use super::RepositoryError;
use crate::models::admin_user::{AdminRole, AdminUser};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` admin user queries.
#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    username: String,
    name: String,
    role: AdminRole,
    branch_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AdminUserRow> for AdminUser {
    fn from(row: AdminUserRow) -> Self {
        Self {
            id: AdminUserId::new(row.id),
            username: row.username,
            name: row.name,
            role: row.role,
            branch_id: BranchId::new(row.branch_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LoginRow {
    #[sqlx(flatten)]
    user: AdminUserRow,
    password_hash: String,
}

/// An admin user together with the stored argon2 hash, for login only.
pub struct AdminLogin {
    pub user: AdminUser,
    pub password_hash: String,
}

const USER_COLUMNS: &str = "id, username, name, role, branch_id, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin user database operations.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all admin users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM inventory.admin_user ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an admin user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM inventory.admin_user WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get an admin user and their password hash by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_login(&self, username: &str) -> Result<Option<AdminLogin>, RepositoryError> {
        let row = sqlx::query_as::<_, LoginRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM inventory.admin_user WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|row| AdminLogin {
            user: row.user.into(),
            password_hash: row.password_hash,
        }))
    }

    /// Create a new admin user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::InvalidReference` if the branch doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        name: &str,
        password_hash: &str,
        role: AdminRole,
        branch_id: BranchId,
    ) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "INSERT INTO inventory.admin_user (username, name, password_hash, role, branch_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(name)
        .bind(password_hash)
        .bind(role)
        .bind(branch_id.as_i32())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_constraint)?;

        Ok(row.into())
    }
}
