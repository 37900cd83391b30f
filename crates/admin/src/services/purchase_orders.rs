//! Purchase order intake, receiving reconciliation and order queries.
//!
//! Every operation validates its input before touching storage, runs its
//! storage work under the request deadline, and appends a transaction
//! history entry only after the write has committed. A failed history append
//! is logged and never fails the request.

use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use stockroom_core::reconciliation::{LinePlan, MAX_LINE_QUANTITY, plan_line};
use stockroom_core::{AdminUserId, ReceiptId, TransactionType, amount_in_range};

use super::{require_positive_id, require_text, with_deadline};
use crate::db::{
    PurchaseOrderRepository, ReceiptRepository, RepositoryError, TransactionHistoryRepository,
};
use crate::error::AppError;
use crate::models::{
    CreatePurchaseOrderInput, CreatedPurchaseOrder, CurrentAdmin, OrderFilter, Page,
    PurchaseOrderView, ReceiptDetail, ReceiptOutcome, RecordReceiptInput,
};

/// Highest accepted tax percentage.
const MAX_TAX_PERCENTAGE: Decimal = Decimal::ONE_HUNDRED;

/// Most units (received plus rejected, over all lines) one receipt may carry.
pub const MAX_RECEIPT_UNITS: i64 = 50_000;

/// Purchase order pipeline.
pub struct PurchaseOrderService<'a> {
    pool: &'a PgPool,
    deadline: Duration,
}

impl<'a> PurchaseOrderService<'a> {
    /// Create a new service over a pool, bounding each call by `deadline`.
    #[must_use]
    pub const fn new(pool: &'a PgPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    /// Create a purchase order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for malformed input, `AppError::NotFound`
    /// for an unknown supplier, branch or category, `AppError::Timeout` when
    /// the deadline elapses, and `AppError::Database` for storage failures.
    #[instrument(skip(self, input), fields(admin_id = %actor.id, lines = input.line_items.len()))]
    pub async fn create_purchase_order(
        &self,
        actor: &CurrentAdmin,
        input: &CreatePurchaseOrderInput,
    ) -> Result<CreatedPurchaseOrder, AppError> {
        validate_create(input)?;

        if !input.summary.is_consistent() {
            tracing::warn!(
                total_amount = %input.summary.total_amount,
                expected_total = ?input.summary.expected_total(),
                "Purchase order total does not match its summary; storing as given"
            );
        }

        let today = Utc::now().date_naive();
        let repo = PurchaseOrderRepository::new(self.pool);
        let created = with_deadline(self.deadline, repo.create(actor.id, input, today)).await?;

        tracing::info!(
            order_id = %created.id,
            order_number = %created.order_number,
            "Purchase order created"
        );

        self.record_history(actor.id, TransactionType::PurchaseOrderCreated, &created.order_number)
            .await;

        Ok(created)
    }

    /// Record a delivery against a purchase order.
    ///
    /// A replay of an already recorded submission returns
    /// [`ReceiptOutcome::Replayed`] and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for malformed input or impossible
    /// counts, `AppError::NotFound` for an unknown order or line item,
    /// `AppError::Conflict` for a mismatched supplier or branch, a reused
    /// idempotency key or an over-receipt, `AppError::Timeout` when the
    /// deadline elapses, and `AppError::Database` for storage failures.
    #[instrument(skip(self, input), fields(admin_id = %actor.id, invoice = %input.invoice_number))]
    pub async fn record_receipt(
        &self,
        actor: &CurrentAdmin,
        order_number: &str,
        input: &RecordReceiptInput,
    ) -> Result<ReceiptOutcome, AppError> {
        let plans = validate_receipt(input)?;

        let repo = ReceiptRepository::new(self.pool);
        let outcome =
            with_deadline(self.deadline, repo.record(actor.id, order_number, input, &plans))
                .await?;

        match &outcome {
            ReceiptOutcome::Recorded {
                receipt_id,
                instance_count,
                ..
            } => {
                tracing::info!(
                    receipt_id = %receipt_id,
                    instance_count,
                    "Receipt recorded"
                );
                self.record_history(actor.id, TransactionType::ReceiptRecorded, order_number)
                    .await;
            }
            ReceiptOutcome::Replayed { receipt_id } => {
                tracing::info!(receipt_id = %receipt_id, "Receipt replay; nothing written");
            }
        }

        Ok(outcome)
    }

    /// List live orders matching a filter, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Timeout` or `AppError::Database`.
    #[instrument(skip(self, filter))]
    pub async fn list_orders(
        &self,
        filter: &OrderFilter,
    ) -> Result<Page<PurchaseOrderView>, AppError> {
        let paging = filter.paging();
        let repo = PurchaseOrderRepository::new(self.pool);

        with_deadline(self.deadline, async {
            let total_count = repo.count(filter).await?;
            let items = repo.list_page(filter, paging).await?;
            Ok::<_, RepositoryError>(Page::new(items, total_count, paging))
        })
        .await
    }

    /// Load one order with its live line items.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if there is no live order with this number.
    #[instrument(skip(self))]
    pub async fn get_order_detail(&self, order_number: &str) -> Result<PurchaseOrderView, AppError> {
        let repo = PurchaseOrderRepository::new(self.pool);
        with_deadline(self.deadline, repo.get_view_by_number(order_number))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Purchase order {order_number} not found")))
    }

    /// Soft delete an order and its line items.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if there is no live order with this number.
    #[instrument(skip(self), fields(admin_id = %actor.id))]
    pub async fn soft_delete_order(
        &self,
        actor: &CurrentAdmin,
        order_number: &str,
    ) -> Result<(), AppError> {
        let repo = PurchaseOrderRepository::new(self.pool);
        let order_id = with_deadline(self.deadline, repo.soft_delete(actor.id, order_number))
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => {
                    AppError::NotFound(format!("Purchase order {order_number} not found"))
                }
                other => other,
            })?;

        tracing::info!(order_id = %order_id, "Purchase order deleted");

        self.record_history(actor.id, TransactionType::PurchaseOrderDeleted, order_number)
            .await;

        Ok(())
    }

    /// Load a receipt with its lines and every product instance it created.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the receipt doesn't exist.
    #[instrument(skip(self))]
    pub async fn get_receipt_instances(
        &self,
        receipt_id: ReceiptId,
    ) -> Result<ReceiptDetail, AppError> {
        require_positive_id("receipt_id", receipt_id.as_i32())?;

        let repo = ReceiptRepository::new(self.pool);
        with_deadline(self.deadline, async {
            let Some(receipt) = repo.get(receipt_id).await? else {
                return Err(RepositoryError::NotFound);
            };
            let lines = repo.lines(receipt_id).await?;
            let instances = repo.instances(receipt_id).await?;
            Ok(ReceiptDetail {
                receipt,
                lines,
                instances,
            })
        })
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => AppError::NotFound(format!("Receipt {receipt_id} not found")),
            other => other,
        })
    }

    /// Append a history entry, logging instead of failing.
    async fn record_history(&self, actor: AdminUserId, trans_type: TransactionType, subject: &str) {
        let history = TransactionHistoryRepository::new(self.pool);
        if let Err(e) =
            with_deadline(self.deadline, history.append(actor, trans_type, subject)).await
        {
            tracing::warn!(
                error = %e,
                trans_type = ?trans_type,
                subject,
                "Failed to append transaction history"
            );
        }
    }
}

/// Check a new purchase order without touching storage.
///
/// # Errors
///
/// Returns `AppError::Validation` describing the first problem found.
pub fn validate_create(input: &CreatePurchaseOrderInput) -> Result<(), AppError> {
    require_positive_id("supplier_id", input.supplier_id.as_i32())?;
    require_positive_id("branch_id", input.branch_id.as_i32())?;

    if input.line_items.is_empty() {
        return Err(AppError::Validation(
            "a purchase order needs at least one line item".to_string(),
        ));
    }

    let negative = input.summary.negative_fields();
    if !negative.is_empty() {
        return Err(AppError::Validation(format!(
            "summary amounts cannot be negative: {}",
            negative.join(", ")
        )));
    }
    let oversized = input.summary.out_of_range_fields();
    if !oversized.is_empty() {
        return Err(AppError::Validation(format!(
            "summary amounts are out of range: {}",
            oversized.join(", ")
        )));
    }
    if input.summary.tax_percentage > MAX_TAX_PERCENTAGE {
        return Err(AppError::Validation(
            "tax_percentage must be between 0 and 100".to_string(),
        ));
    }

    for (index, line) in input.line_items.iter().enumerate() {
        let n = index + 1;
        require_positive_id(&format!("line {n} category_id"), line.category_id.as_i32())?;
        require_text(&format!("line {n} description"), &line.description)?;
        if line.quantity <= 0 {
            return Err(AppError::Validation(format!(
                "line {n} quantity must be positive"
            )));
        }
        if line.quantity > MAX_LINE_QUANTITY {
            return Err(AppError::Validation(format!(
                "line {n} quantity cannot exceed {MAX_LINE_QUANTITY}"
            )));
        }
        if is_negative(line.unit_price) || is_negative(line.discount) {
            return Err(AppError::Validation(format!(
                "line {n} unit_price and discount cannot be negative"
            )));
        }
        if !amount_in_range(line.unit_price) || !amount_in_range(line.discount) {
            return Err(AppError::Validation(format!(
                "line {n} unit_price and discount are out of range"
            )));
        }
        match line.resolved_line_total() {
            Some(total) if is_negative(total) => {
                return Err(AppError::Validation(format!(
                    "line {n} total cannot be negative"
                )));
            }
            Some(total) if amount_in_range(total) => {}
            _ => {
                return Err(AppError::Validation(format!(
                    "line {n} total is out of range"
                )));
            }
        }
    }

    Ok(())
}

/// Check a receipt without touching storage and build its line plans.
///
/// The plans are parallel to `input.lines`.
///
/// # Errors
///
/// Returns `AppError::Validation` describing the first problem found.
pub fn validate_receipt(input: &RecordReceiptInput) -> Result<Vec<LinePlan>, AppError> {
    require_positive_id("supplier_id", input.supplier_id.as_i32())?;
    require_positive_id("branch_id", input.branch_id.as_i32())?;
    require_text("invoice_number", &input.invoice_number)?;

    if let Some(key) = &input.idempotency_key {
        require_text("idempotency_key", key)?;
    }
    if is_negative(input.total_amount) {
        return Err(AppError::Validation(
            "total_amount cannot be negative".to_string(),
        ));
    }
    if !amount_in_range(input.total_amount) {
        return Err(AppError::Validation(
            "total_amount is out of range".to_string(),
        ));
    }
    if input.lines.is_empty() {
        return Err(AppError::Validation(
            "a receipt needs at least one line".to_string(),
        ));
    }

    // Summed before any plan is built; each unit becomes an instance in memory.
    let units: i64 = input
        .lines
        .iter()
        .map(|line| {
            i64::from(line.received_quantity.max(0)) + i64::from(line.rejected_quantity.max(0))
        })
        .sum();
    if units > MAX_RECEIPT_UNITS {
        return Err(AppError::Validation(format!(
            "a receipt cannot carry more than {MAX_RECEIPT_UNITS} units (got {units})"
        )));
    }

    input
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let n = index + 1;
            if let Some(line_item_id) = line.line_item_id {
                require_positive_id(&format!("line {n} line_item_id"), line_item_id.as_i32())?;
            }
            require_positive_id(&format!("line {n} category_id"), line.category_id.as_i32())?;
            require_text(&format!("line {n} description"), &line.description)?;

            plan_line(line.counts(), line.unit_price)
                .map_err(|e| AppError::Validation(format!("line {n}: {e}")))
        })
        .collect()
}

fn is_negative(value: Decimal) -> bool {
    value.is_sign_negative() && !value.is_zero()
}
