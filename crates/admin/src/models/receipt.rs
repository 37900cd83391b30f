//! Receiving records: receipt headers, per-line receipts and product instances.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::reconciliation::LineCounts;
use stockroom_core::{
    AdminUserId, BranchId, CategoryId, InstanceStatus, LineItemId, LineItemStatus,
    ProductInstanceId, PurchaseOrderId, ReceiptId, ReceiptLineId, SupplierId,
};

/// Receipt header recorded against a supplier invoice.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub id: ReceiptId,
    pub purchase_order_id: PurchaseOrderId,
    pub supplier_id: SupplierId,
    pub branch_id: BranchId,
    pub invoice_number: String,
    pub total_amount: Decimal,
    pub invoice_recorded: bool,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: AdminUserId,
}

/// One reconciled line of a receipt.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptLine {
    pub id: ReceiptLineId,
    pub receipt_id: ReceiptId,
    pub line_item_id: Option<LineItemId>,
    pub category_id: CategoryId,
    pub description: String,
    pub unit_price: Decimal,
    pub ordered_quantity: i32,
    pub accepted_quantity: i32,
    pub rejected_quantity: i32,
    pub accepted_total: Decimal,
    pub status: LineItemStatus,
}

/// A single physical unit materialized during receiving.
#[derive(Debug, Clone, Serialize)]
pub struct ProductInstance {
    pub id: ProductInstanceId,
    pub receipt_line_id: ReceiptLineId,
    /// 1-based within the receipt line; accepted units come first.
    pub serial_no: i32,
    pub category_id: CategoryId,
    pub description: String,
    pub unit_price: Decimal,
    pub status: InstanceStatus,
    pub created_at: DateTime<Utc>,
}

/// A receipt with its lines and every instance it materialized.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptDetail {
    pub receipt: Receipt,
    pub lines: Vec<ReceiptLine>,
    pub instances: Vec<ProductInstance>,
}

/// Counts reported for one purchase order line.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptLineInput {
    /// Purchase order line being reconciled, if the delivery line maps to one.
    #[serde(default)]
    pub line_item_id: Option<LineItemId>,
    pub category_id: CategoryId,
    pub description: String,
    pub ordered_quantity: i32,
    pub received_quantity: i32,
    pub rejected_quantity: i32,
    pub unit_price: Decimal,
}

impl ReceiptLineInput {
    #[must_use]
    pub const fn counts(&self) -> LineCounts {
        LineCounts {
            ordered: self.ordered_quantity,
            received: self.received_quantity,
            rejected: self.rejected_quantity,
        }
    }
}

/// Input for recording a delivery against a purchase order.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordReceiptInput {
    pub supplier_id: SupplierId,
    pub branch_id: BranchId,
    pub invoice_number: String,
    pub total_amount: Decimal,
    /// Replays carrying the same key return the original receipt.
    #[serde(default)]
    pub idempotency_key: Option<String>,
    pub lines: Vec<ReceiptLineInput>,
}

/// Outcome of recording a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReceiptOutcome {
    /// The receipt was written by this call.
    Recorded {
        receipt_id: ReceiptId,
        line_ids: Vec<ReceiptLineId>,
        instance_count: usize,
    },
    /// An identical submission was already recorded; nothing was written.
    Replayed { receipt_id: ReceiptId },
}

impl ReceiptOutcome {
    #[must_use]
    pub const fn receipt_id(&self) -> ReceiptId {
        match self {
            Self::Recorded { receipt_id, .. } | Self::Replayed { receipt_id } => *receipt_id,
        }
    }

    #[must_use]
    pub const fn is_replay(&self) -> bool {
        matches!(self, Self::Replayed { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = ReceiptOutcome::Replayed {
            receipt_id: ReceiptId::new(9),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "replayed");
        assert_eq!(json["receipt_id"], 9);
        assert!(outcome.is_replay());
        assert_eq!(outcome.receipt_id(), ReceiptId::new(9));
    }

    #[test]
    fn test_line_input_counts() {
        let line: ReceiptLineInput = serde_json::from_value(serde_json::json!({
            "line_item_id": 12,
            "category_id": 3,
            "description": "Desk lamp",
            "ordered_quantity": 5,
            "received_quantity": 3,
            "rejected_quantity": 2,
            "unit_price": "50.00"
        }))
        .unwrap();

        assert_eq!(line.line_item_id, Some(LineItemId::new(12)));
        assert_eq!(
            line.counts(),
            LineCounts {
                ordered: 5,
                received: 3,
                rejected: 2
            }
        );
    }
}
