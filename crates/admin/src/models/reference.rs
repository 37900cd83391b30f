//! Reference data: suppliers, categories, branches and products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{BranchId, CategoryId, MobileNumber, ProductId, SupplierId};

use super::Paging;

/// A supplier.
///
/// Unique among live suppliers by `(name, company, code)` and by `mobile`.
#[derive(Debug, Clone, Serialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub company: String,
    pub code: String,
    pub mobile: MobileNumber,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a supplier.
#[derive(Debug, Clone, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub company: String,
    pub code: String,
    pub mobile: MobileNumber,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Query filter for listing suppliers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierFilter {
    /// Matched case-insensitively against name, company, code and mobile.
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl SupplierFilter {
    #[must_use]
    pub fn paging(&self) -> Paging {
        Paging::new(self.page, self.page_size)
    }
}

/// A product category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or renaming a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A store branch receiving deliveries.
#[derive(Debug, Clone, Serialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a branch.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBranchInput {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// A catalogue product identified by its SKU.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    /// `SKU-<dd-mm-yy>-<NNNNN>`, allocated at creation.
    pub sku: String,
    pub name: String,
    pub category_id: CategoryId,
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub category_id: CategoryId,
    pub unit_price: Decimal,
}
