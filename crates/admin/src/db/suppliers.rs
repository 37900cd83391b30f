//! Supplier repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use stockroom_core::{AdminUserId, MobileNumber, SupplierId};

use super::{RepositoryError, contains_pattern};
use crate::models::{Paging, Supplier, SupplierInput};

#[derive(Debug, sqlx::FromRow)]
struct SupplierRow {
    id: i32,
    name: String,
    company: String,
    code: String,
    mobile: String,
    email: Option<String>,
    address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SupplierRow> for Supplier {
    type Error = RepositoryError;

    fn try_from(row: SupplierRow) -> Result<Self, Self::Error> {
        let mobile = MobileNumber::parse(&row.mobile).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid mobile in database: {e}"))
        })?;

        Ok(Self {
            id: SupplierId::new(row.id),
            name: row.name,
            company: row.company,
            code: row.code,
            mobile,
            email: row.email,
            address: row.address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SUPPLIER_COLUMNS: &str =
    "id, name, company, code, mobile, email, address, created_at, updated_at";

const SEARCH_CLAUSE: &str = r"
    WHERE NOT is_deleted
      AND ($1::text IS NULL
           OR name ILIKE $1 OR company ILIKE $1 OR code ILIKE $1 OR mobile ILIKE $1)
";

/// Repository for supplier database operations.
pub struct SupplierRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SupplierRepository<'a> {
    /// Create a new supplier repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count live suppliers matching a search term.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, search: Option<&str>) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM inventory.supplier {SEARCH_CLAUSE}"
        ))
        .bind(search.map(contains_pattern))
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// List live suppliers ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored mobile is invalid.
    pub async fn list(
        &self,
        search: Option<&str>,
        paging: Paging,
    ) -> Result<Vec<Supplier>, RepositoryError> {
        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM inventory.supplier {SEARCH_CLAUSE} \
             ORDER BY name ASC, id ASC LIMIT $2 OFFSET $3"
        ))
        .bind(search.map(contains_pattern))
        .bind(paging.limit())
        .bind(paging.offset())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a live supplier by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored mobile is invalid.
    pub async fn get(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM inventory.supplier WHERE id = $1 AND NOT is_deleted"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a supplier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a live supplier already has the
    /// same name, company and code, or the same mobile number.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        actor: AdminUserId,
        input: &SupplierInput,
    ) -> Result<Supplier, RepositoryError> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "INSERT INTO inventory.supplier \
                (name, company, code, mobile, email, address, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) \
             RETURNING {SUPPLIER_COLUMNS}"
        ))
        .bind(input.name.trim())
        .bind(input.company.trim())
        .bind(input.code.trim())
        .bind(input.mobile.as_str())
        .bind(input.email.as_deref())
        .bind(input.address.as_deref())
        .bind(actor.as_i32())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_constraint)?;

        row.try_into()
    }

    /// Replace a live supplier's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the supplier doesn't exist.
    /// Returns `RepositoryError::Conflict` on a duplicate identity or mobile.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        actor: AdminUserId,
        id: SupplierId,
        input: &SupplierInput,
    ) -> Result<Supplier, RepositoryError> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "UPDATE inventory.supplier \
             SET name = $2, company = $3, code = $4, mobile = $5, email = $6, address = $7, \
                 updated_at = NOW(), updated_by = $8 \
             WHERE id = $1 AND NOT is_deleted \
             RETURNING {SUPPLIER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(input.name.trim())
        .bind(input.company.trim())
        .bind(input.code.trim())
        .bind(input.mobile.as_str())
        .bind(input.email.as_deref())
        .bind(input.address.as_deref())
        .bind(actor.as_i32())
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_constraint)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Soft-delete a supplier. Its name, code and mobile become reusable.
    ///
    /// # Returns
    ///
    /// Returns `true` if the supplier was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn soft_delete(
        &self,
        actor: AdminUserId,
        id: SupplierId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE inventory.supplier
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
