//! Product repository.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use stockroom_core::{AdminUserId, CategoryId, ProductId};

use super::{RepositoryError, counters};
use crate::models::{CreateProductInput, Paging, Product};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    sku: String,
    name: String,
    category_id: i32,
    unit_price: Decimal,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            sku: row.sku,
            name: row.name,
            category_id: CategoryId::new(row.category_id),
            unit_price: row.unit_price,
            created_at: row.created_at,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product, allocating its SKU in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the category doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        actor: AdminUserId,
        input: &CreateProductInput,
        today: NaiveDate,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sku = counters::next_sku(&mut tx, today).await?;

        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO inventory.product (sku, name, category_id, unit_price, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, sku, name, category_id, unit_price, created_at
            ",
        )
        .bind(&sku)
        .bind(input.name.trim())
        .bind(input.category_id.as_i32())
        .bind(input.unit_price)
        .bind(actor.as_i32())
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from_constraint)?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Count live products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM inventory.product WHERE NOT is_deleted")
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }

    /// List live products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, paging: Paging) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, sku, name, category_id, unit_price, created_at
            FROM inventory.product
            WHERE NOT is_deleted
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(paging.limit())
        .bind(paging.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a live product by SKU.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_sku(&self, sku: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, sku, name, category_id, unit_price, created_at
            FROM inventory.product
            WHERE sku = $1 AND NOT is_deleted
            ",
        )
        .bind(sku)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
