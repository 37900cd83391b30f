//! Reference data: suppliers, categories, branches and products.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use stockroom_core::{CategoryId, SupplierId};

use super::{require_positive_id, require_text, with_deadline};
use crate::db::{
    BranchRepository, CategoryRepository, ProductRepository, RepositoryError, SupplierRepository,
};
use crate::error::AppError;
use crate::models::{
    Branch, Category, CategoryInput, CreateBranchInput, CreateProductInput, CurrentAdmin, Page,
    Paging, Product, Supplier, SupplierFilter, SupplierInput,
};

/// Reference data service.
pub struct ReferenceService<'a> {
    pool: &'a PgPool,
    deadline: Duration,
}

impl<'a> ReferenceService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    /// List live suppliers matching an optional search, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Timeout` or `AppError::Database`.
    #[instrument(skip(self, filter))]
    pub async fn list_suppliers(&self, filter: &SupplierFilter) -> Result<Page<Supplier>, AppError> {
        let paging = filter.paging();
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let repo = SupplierRepository::new(self.pool);

        with_deadline(self.deadline, async {
            let total_count = repo.count(search).await?;
            let items = repo.list(search, paging).await?;
            Ok::<_, RepositoryError>(Page::new(items, total_count, paging))
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the supplier doesn't exist or was deleted.
    pub async fn get_supplier(&self, id: SupplierId) -> Result<Supplier, AppError> {
        let repo = SupplierRepository::new(self.pool);
        with_deadline(self.deadline, repo.get(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Supplier {id} not found")))
    }

    /// Create a supplier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for blank fields and `AppError::Conflict`
    /// if a live supplier already has this name, company and code, or this
    /// mobile number.
    #[instrument(skip(self, input), fields(admin_id = %actor.id))]
    pub async fn create_supplier(
        &self,
        actor: &CurrentAdmin,
        input: &SupplierInput,
    ) -> Result<Supplier, AppError> {
        validate_supplier(input)?;
        let repo = SupplierRepository::new(self.pool);
        let supplier = with_deadline(self.deadline, repo.create(actor.id, input)).await?;
        tracing::info!(supplier_id = %supplier.id, "Supplier created");
        Ok(supplier)
    }

    /// Replace a supplier's details.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation`, `AppError::NotFound` or `AppError::Conflict`.
    #[instrument(skip(self, input), fields(admin_id = %actor.id))]
    pub async fn update_supplier(
        &self,
        actor: &CurrentAdmin,
        id: SupplierId,
        input: &SupplierInput,
    ) -> Result<Supplier, AppError> {
        validate_supplier(input)?;
        let repo = SupplierRepository::new(self.pool);
        with_deadline(self.deadline, repo.update(actor.id, id, input))
            .await
            .map_err(|e| not_found_as(e, || format!("Supplier {id} not found")))
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the supplier doesn't exist or was already deleted.
    #[instrument(skip(self), fields(admin_id = %actor.id))]
    pub async fn delete_supplier(&self, actor: &CurrentAdmin, id: SupplierId) -> Result<(), AppError> {
        let repo = SupplierRepository::new(self.pool);
        if with_deadline(self.deadline, repo.soft_delete(actor.id, id)).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Supplier {id} not found")))
        }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns `AppError::Timeout` or `AppError::Database`.
    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        with_deadline(self.deadline, CategoryRepository::new(self.pool).list()).await
    }

    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank name and `AppError::Conflict`
    /// if the name is taken.
    #[instrument(skip(self, input), fields(admin_id = %actor.id))]
    pub async fn create_category(
        &self,
        actor: &CurrentAdmin,
        input: &CategoryInput,
    ) -> Result<Category, AppError> {
        require_text("name", &input.name)?;
        let repo = CategoryRepository::new(self.pool);
        with_deadline(self.deadline, repo.create(actor.id, input)).await
    }

    /// # Errors
    ///
    /// Returns `AppError::Validation`, `AppError::NotFound` or `AppError::Conflict`.
    #[instrument(skip(self, input), fields(admin_id = %actor.id))]
    pub async fn update_category(
        &self,
        actor: &CurrentAdmin,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, AppError> {
        require_text("name", &input.name)?;
        let repo = CategoryRepository::new(self.pool);
        with_deadline(self.deadline, repo.update(actor.id, id, input))
            .await
            .map_err(|e| not_found_as(e, || format!("Category {id} not found")))
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the category doesn't exist or was already deleted.
    #[instrument(skip(self), fields(admin_id = %actor.id))]
    pub async fn delete_category(&self, actor: &CurrentAdmin, id: CategoryId) -> Result<(), AppError> {
        let repo = CategoryRepository::new(self.pool);
        if with_deadline(self.deadline, repo.soft_delete(actor.id, id)).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Category {id} not found")))
        }
    }

    // =========================================================================
    // Branches
    // =========================================================================

    /// # Errors
    ///
    /// Returns `AppError::Timeout` or `AppError::Database`.
    pub async fn list_branches(&self) -> Result<Vec<Branch>, AppError> {
        with_deadline(self.deadline, BranchRepository::new(self.pool).list()).await
    }

    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank name and `AppError::Conflict`
    /// if the name is taken.
    #[instrument(skip(self, input))]
    pub async fn create_branch(&self, input: &CreateBranchInput) -> Result<Branch, AppError> {
        require_text("name", &input.name)?;
        with_deadline(self.deadline, BranchRepository::new(self.pool).create(input)).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List live products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Timeout` or `AppError::Database`.
    pub async fn list_products(&self, paging: Paging) -> Result<Page<Product>, AppError> {
        let repo = ProductRepository::new(self.pool);
        with_deadline(self.deadline, async {
            let total_count = repo.count().await?;
            let items = repo.list(paging).await?;
            Ok::<_, RepositoryError>(Page::new(items, total_count, paging))
        })
        .await
    }

    /// Create a product and allocate its SKU.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for malformed input and
    /// `AppError::NotFound` for an unknown category.
    #[instrument(skip(self, input), fields(admin_id = %actor.id))]
    pub async fn create_product(
        &self,
        actor: &CurrentAdmin,
        input: &CreateProductInput,
    ) -> Result<Product, AppError> {
        require_text("name", &input.name)?;
        require_positive_id("category_id", input.category_id.as_i32())?;
        if input.unit_price.is_sign_negative() && !input.unit_price.is_zero() {
            return Err(AppError::Validation(
                "unit_price cannot be negative".to_string(),
            ));
        }

        let today = Utc::now().date_naive();
        let repo = ProductRepository::new(self.pool);
        let product = with_deadline(self.deadline, repo.create(actor.id, input, today)).await?;
        tracing::info!(sku = %product.sku, "Product created");
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no live product has this SKU.
    pub async fn get_product(&self, sku: &str) -> Result<Product, AppError> {
        let repo = ProductRepository::new(self.pool);
        with_deadline(self.deadline, repo.get_by_sku(sku.trim()))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {sku} not found")))
    }
}

fn validate_supplier(input: &SupplierInput) -> Result<(), AppError> {
    require_text("name", &input.name)?;
    require_text("company", &input.company)?;
    require_text("code", &input.code)?;
    Ok(())
}

/// Give a generic not-found a resource-specific message.
fn not_found_as(err: AppError, message: impl FnOnce() -> String) -> AppError {
    match err {
        AppError::NotFound(_) => AppError::NotFound(message()),
        other => other,
    }
}
