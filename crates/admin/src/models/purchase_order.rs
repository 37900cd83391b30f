//! Purchase order aggregate: header, line items and the read projection.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{
    AdminUserId, BranchId, CategoryId, LineItemId, LineItemStatus, MobileNumber, OrderTotals,
    PurchaseOrderId, SupplierId, line_total,
};

use super::Paging;

/// A purchase order header.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    /// `PO-<year>-<NNNN>`, immutable once assigned.
    pub order_number: String,
    pub supplier_id: SupplierId,
    pub branch_id: BranchId,
    pub totals: OrderTotals,
    pub credited_date: NaiveDate,
    /// Set once any receipt has been recorded against the order.
    pub invoice_recorded: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: AdminUserId,
    pub updated_at: DateTime<Utc>,
    pub updated_by: AdminUserId,
}

/// A purchase order line item.
#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub purchase_order_id: PurchaseOrderId,
    pub category_id: CategoryId,
    pub description: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub discount: Decimal,
    pub line_total: Decimal,
    /// Cumulative across all receipts.
    pub accepted_quantity: i32,
    /// Cumulative across all receipts.
    pub rejected_quantity: i32,
    pub accepted_total: Decimal,
    /// `None` until the line has been received.
    pub status: Option<LineItemStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for one line of a new purchase order.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInput {
    pub category_id: CategoryId,
    pub description: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    #[serde(default)]
    pub discount: Decimal,
    /// Computed from price, quantity and discount when omitted.
    #[serde(default)]
    pub line_total: Option<Decimal>,
}

impl LineItemInput {
    /// The line total to store: the caller's figure, or `unit_price * quantity - discount`.
    ///
    /// `None` when the computed figure overflows.
    #[must_use]
    pub fn resolved_line_total(&self) -> Option<Decimal> {
        self.line_total
            .or_else(|| line_total(self.unit_price, self.quantity, self.discount))
    }
}

/// Input for creating a purchase order.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePurchaseOrderInput {
    pub supplier_id: SupplierId,
    pub branch_id: BranchId,
    /// Defaults to today when omitted.
    #[serde(default)]
    pub credited_date: Option<NaiveDate>,
    pub summary: OrderTotals,
    pub line_items: Vec<LineItemInput>,
}

/// Result of a successful create.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedPurchaseOrder {
    pub id: PurchaseOrderId,
    pub order_number: String,
    /// In the same order as the input lines.
    pub line_item_ids: Vec<LineItemId>,
}

/// Query filter for listing purchase orders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    /// Matched case-insensitively against order number, supplier and branch names.
    pub search: Option<String>,
    pub order_id: Option<PurchaseOrderId>,
    pub supplier_id: Option<SupplierId>,
    /// Inclusive lower bound on `credited_date`.
    pub from_date: Option<NaiveDate>,
    /// Inclusive upper bound on `credited_date`.
    pub to_date: Option<NaiveDate>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl OrderFilter {
    #[must_use]
    pub fn paging(&self) -> Paging {
        Paging::new(self.page, self.page_size)
    }

    /// Search text trimmed, with blank treated as absent.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Supplier fields embedded in an order view.
#[derive(Debug, Clone, Serialize)]
pub struct SupplierSummary {
    pub id: SupplierId,
    pub name: String,
    pub company: String,
    pub mobile: MobileNumber,
}

/// Branch fields embedded in an order view.
#[derive(Debug, Clone, Serialize)]
pub struct BranchSummary {
    pub id: BranchId,
    pub name: String,
}

/// Nested read projection of an order with its live line items.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrderView {
    pub id: PurchaseOrderId,
    pub order_number: String,
    pub credited_date: NaiveDate,
    pub invoice_recorded: bool,
    pub supplier: SupplierSummary,
    pub branch: BranchSummary,
    pub summary: OrderTotals,
    pub line_items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_computed_when_omitted() {
        let input: LineItemInput = serde_json::from_value(serde_json::json!({
            "category_id": 3,
            "description": "Steel shelf",
            "unit_price": "50.00",
            "quantity": 5,
            "discount": "25.00"
        }))
        .unwrap();

        assert_eq!(input.resolved_line_total(), Some(Decimal::new(22500, 2)));
    }

    #[test]
    fn test_line_total_kept_when_given() {
        let input: LineItemInput = serde_json::from_value(serde_json::json!({
            "category_id": 3,
            "description": "Steel shelf",
            "unit_price": "50.00",
            "quantity": 5,
            "line_total": "240.00"
        }))
        .unwrap();

        assert_eq!(input.discount, Decimal::ZERO);
        assert_eq!(input.resolved_line_total(), Some(Decimal::new(24000, 2)));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter = OrderFilter {
            search: Some("   ".to_string()),
            ..OrderFilter::default()
        };
        assert_eq!(filter.search_term(), None);

        let filter = OrderFilter {
            search: Some(" acme ".to_string()),
            ..OrderFilter::default()
        };
        assert_eq!(filter.search_term(), Some("acme"));
    }
}
