//! Domain models for the admin API.
//!
//! Row types stay private to `db`; everything here is what services accept
//! and routes serialize.

pub mod admin_user;
pub mod history;
pub mod purchase_order;
pub mod receipt;
pub mod reference;
pub mod session;

use serde::Serialize;

pub use admin_user::AdminUser;
pub use history::TransactionHistoryEntry;
pub use purchase_order::{
    BranchSummary, CreatePurchaseOrderInput, CreatedPurchaseOrder, LineItem, LineItemInput,
    OrderFilter, PurchaseOrder, PurchaseOrderView, SupplierSummary,
};
pub use receipt::{
    ProductInstance, Receipt, ReceiptDetail, ReceiptLine, ReceiptLineInput, ReceiptOutcome,
    RecordReceiptInput,
};
pub use reference::{
    Branch, Category, CategoryInput, CreateBranchInput, CreateProductInput, Product, Supplier,
    SupplierFilter, SupplierInput,
};
pub use session::CurrentAdmin;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Upper bound on page size for list endpoints.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Normalized 1-based paging parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub page_size: i64,
}

impl Paging {
    /// Clamp raw query values: page defaults to 1, size to 10 and is capped at 100.
    #[must_use]
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1),
            page_size: page_size
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
        }
    }

    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.page_size
    }

    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, total_count: i64, paging: Paging) -> Self {
        Self {
            items,
            total_count,
            page: paging.page,
            page_size: paging.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_defaults() {
        let paging = Paging::new(None, None);
        assert_eq!(paging, Paging { page: 1, page_size: 10 });
        assert_eq!(paging.offset(), 0);
    }

    #[test]
    fn test_paging_second_page() {
        let paging = Paging::new(Some(2), Some(10));
        assert_eq!(paging.limit(), 10);
        assert_eq!(paging.offset(), 10);
    }

    #[test]
    fn test_paging_clamps_bad_values() {
        assert_eq!(Paging::new(Some(0), Some(500)), Paging { page: 1, page_size: 100 });
        assert_eq!(Paging::new(Some(-3), Some(-1)), Paging { page: 1, page_size: 10 });
    }
}
