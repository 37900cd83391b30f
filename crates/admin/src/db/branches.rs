//! Branch repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use stockroom_core::BranchId;

use super::RepositoryError;
use crate::models::{Branch, CreateBranchInput};

#[derive(Debug, sqlx::FromRow)]
struct BranchRow {
    id: i32,
    name: String,
    address: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<BranchRow> for Branch {
    fn from(row: BranchRow) -> Self {
        Self {
            id: BranchId::new(row.id),
            name: row.name,
            address: row.address,
            created_at: row.created_at,
        }
    }
}

/// Repository for branch database operations.
pub struct BranchRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BranchRepository<'a> {
    /// Create a new branch repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all branches ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Branch>, RepositoryError> {
        let rows = sqlx::query_as::<_, BranchRow>(
            "SELECT id, name, address, created_at FROM inventory.branch ORDER BY name ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a branch by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Branch>, RepositoryError> {
        let row = sqlx::query_as::<_, BranchRow>(
            "SELECT id, name, address, created_at FROM inventory.branch WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a branch.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &CreateBranchInput) -> Result<Branch, RepositoryError> {
        let row = sqlx::query_as::<_, BranchRow>(
            r"
            INSERT INTO inventory.branch (name, address)
            VALUES ($1, $2)
            RETURNING id, name, address, created_at
            ",
        )
        .bind(input.name.trim())
        .bind(input.address.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_constraint)?;

        Ok(row.into())
    }
}
