//! Category repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use stockroom_core::{AdminUserId, CategoryId};

use super::RepositoryError;
use crate::models::{Category, CategoryInput};

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List live categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, description, created_at, updated_at
            FROM inventory.category
            WHERE NOT is_deleted
            ORDER BY lower(name) ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a live category has the same
    /// name, ignoring case.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        actor: AdminUserId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO inventory.category (name, description, created_by, updated_by)
            VALUES ($1, $2, $3, $3)
            RETURNING id, name, description, created_at, updated_at
            ",
        )
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(actor.as_i32())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_constraint)?;

        Ok(row.into())
    }

    /// Rename a live category or change its description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        actor: AdminUserId,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            UPDATE inventory.category
            SET name = $2, description = $3, updated_at = NOW(), updated_by = $4
            WHERE id = $1 AND NOT is_deleted
            RETURNING id, name, description, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(actor.as_i32())
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_constraint)?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Soft-delete a category.
    ///
    /// # Returns
    ///
    /// Returns `true` if the category was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn soft_delete(
        &self,
        actor: AdminUserId,
        id: CategoryId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE inventory.category
            SET is_deleted = TRUE, updated_at = NOW(), updated_by = $2
            WHERE id = $1 AND NOT is_deleted
            ",
        )
        .bind(id.as_i32())
        .bind(actor.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
