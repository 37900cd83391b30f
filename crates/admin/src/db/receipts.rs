//! Receipt repository: the receiving write and instance lookups.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use stockroom_core::reconciliation::{LinePlan, derive_line_status};
use stockroom_core::{
    AdminUserId, BranchId, CategoryId, InstanceStatus, LineItemId, LineItemStatus,
    ProductInstanceId, PurchaseOrderId, ReceiptId, ReceiptLineId, SupplierId,
};

use super::RepositoryError;
use crate::models::{ProductInstance, Receipt, ReceiptLine, ReceiptOutcome, RecordReceiptInput};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct LockedOrderRow {
    id: i32,
    supplier_id: i32,
    branch_id: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct ExistingReceiptRow {
    id: i32,
    purchase_order_id: i32,
    invoice_number: String,
}

#[derive(Debug, sqlx::FromRow)]
struct LineProgressRow {
    quantity: i32,
    accepted_quantity: i32,
    rejected_quantity: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct ReceiptRow {
    id: i32,
    purchase_order_id: i32,
    supplier_id: i32,
    branch_id: i32,
    invoice_number: String,
    total_amount: Decimal,
    invoice_recorded: bool,
    idempotency_key: Option<String>,
    created_at: DateTime<Utc>,
    created_by: i32,
}

impl From<ReceiptRow> for Receipt {
    fn from(row: ReceiptRow) -> Self {
        Self {
            id: ReceiptId::new(row.id),
            purchase_order_id: PurchaseOrderId::new(row.purchase_order_id),
            supplier_id: SupplierId::new(row.supplier_id),
            branch_id: BranchId::new(row.branch_id),
            invoice_number: row.invoice_number,
            total_amount: row.total_amount,
            invoice_recorded: row.invoice_recorded,
            idempotency_key: row.idempotency_key,
            created_at: row.created_at,
            created_by: AdminUserId::new(row.created_by),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReceiptLineRow {
    id: i32,
    receipt_id: i32,
    line_item_id: Option<i32>,
    category_id: i32,
    description: String,
    unit_price: Decimal,
    ordered_quantity: i32,
    accepted_quantity: i32,
    rejected_quantity: i32,
    accepted_total: Decimal,
    status: LineItemStatus,
}

impl From<ReceiptLineRow> for ReceiptLine {
    fn from(row: ReceiptLineRow) -> Self {
        Self {
            id: ReceiptLineId::new(row.id),
            receipt_id: ReceiptId::new(row.receipt_id),
            line_item_id: row.line_item_id.map(LineItemId::new),
            category_id: CategoryId::new(row.category_id),
            description: row.description,
            unit_price: row.unit_price,
            ordered_quantity: row.ordered_quantity,
            accepted_quantity: row.accepted_quantity,
            rejected_quantity: row.rejected_quantity,
            accepted_total: row.accepted_total,
            status: row.status,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductInstanceRow {
    id: i32,
    receipt_line_id: i32,
    serial_no: i32,
    category_id: i32,
    description: String,
    unit_price: Decimal,
    status: InstanceStatus,
    created_at: DateTime<Utc>,
}

impl From<ProductInstanceRow> for ProductInstance {
    fn from(row: ProductInstanceRow) -> Self {
        Self {
            id: ProductInstanceId::new(row.id),
            receipt_line_id: ReceiptLineId::new(row.receipt_line_id),
            serial_no: row.serial_no,
            category_id: CategoryId::new(row.category_id),
            description: row.description,
            unit_price: row.unit_price,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for receiving records.
pub struct ReceiptRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReceiptRepository<'a> {
    /// Create a new receipt repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a delivery against a purchase order.
    ///
    /// `plans` must be parallel to `input.lines`. The order row is locked for
    /// the duration, so concurrent receipts for one order apply one at a
    /// time and cumulative line quantities never race.
    ///
    /// A submission whose idempotency key, or order and invoice number,
    /// matches an existing receipt for the same order and invoice is a
    /// replay: nothing is written and the original receipt id is returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live order has this number.
    /// Returns `RepositoryError::Conflict` if the supplier or branch differs
    /// from the order, the idempotency key belongs to a different receipt,
    /// or cumulative quantities would exceed what was ordered.
    /// Returns `RepositoryError::InvalidReference` if a line item or category
    /// does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn record(
        &self,
        actor: AdminUserId,
        order_number: &str,
        input: &RecordReceiptInput,
        plans: &[LinePlan],
    ) -> Result<ReceiptOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, LockedOrderRow>(
            r"
            SELECT id, supplier_id, branch_id
            FROM inventory.purchase_order
            WHERE order_number = $1 AND NOT is_deleted
            FOR UPDATE
            ",
        )
        .bind(order_number)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if order.supplier_id != input.supplier_id.as_i32() {
            return Err(RepositoryError::Conflict(
                "supplier does not match the purchase order".to_string(),
            ));
        }
        if order.branch_id != input.branch_id.as_i32() {
            return Err(RepositoryError::Conflict(
                "branch does not match the purchase order".to_string(),
            ));
        }

        let inserted: Option<i32> = sqlx::query_scalar(
            r"
            INSERT INTO inventory.receipt (
                purchase_order_id, supplier_id, branch_id,
                invoice_number, total_amount, idempotency_key, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT DO NOTHING
            RETURNING id
            ",
        )
        .bind(order.id)
        .bind(order.supplier_id)
        .bind(order.branch_id)
        .bind(input.invoice_number.trim())
        .bind(input.total_amount)
        .bind(input.idempotency_key.as_deref())
        .bind(actor.as_i32())
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::from_constraint)?;

        let Some(receipt_id) = inserted else {
            let existing = find_existing(&mut tx, order.id, input).await?;
            return match existing {
                Some(row)
                    if row.purchase_order_id == order.id
                        && row.invoice_number == input.invoice_number.trim() =>
                {
                    Ok(ReceiptOutcome::Replayed {
                        receipt_id: ReceiptId::new(row.id),
                    })
                }
                _ => Err(RepositoryError::Conflict(
                    "idempotency key was already used for another receipt".to_string(),
                )),
            };
        };

        let mut line_ids = Vec::with_capacity(plans.len());
        let mut instance_count = 0;

        for (line, plan) in input.lines.iter().zip(plans) {
            if let Some(line_item_id) = line.line_item_id {
                apply_to_line_item(&mut tx, actor, order.id, line_item_id, plan).await?;
            }

            let receipt_line_id: i32 = sqlx::query_scalar(
                r"
                INSERT INTO inventory.receipt_line (
                    receipt_id, line_item_id, category_id, description, unit_price,
                    ordered_quantity, accepted_quantity, rejected_quantity,
                    accepted_total, status, created_by
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING id
                ",
            )
            .bind(receipt_id)
            .bind(line.line_item_id.map(|id| id.as_i32()))
            .bind(line.category_id.as_i32())
            .bind(line.description.trim())
            .bind(line.unit_price)
            .bind(line.ordered_quantity)
            .bind(plan.accepted_quantity)
            .bind(plan.rejected_quantity)
            .bind(plan.accepted_total)
            .bind(plan.status)
            .bind(actor.as_i32())
            .fetch_one(&mut *tx)
            .await
            .map_err(RepositoryError::from_constraint)?;

            if !plan.instances.is_empty() {
                let (serials, statuses) = plan.instance_columns();
                let statuses: Vec<String> = statuses.iter().map(ToString::to_string).collect();

                sqlx::query(
                    r"
                    INSERT INTO inventory.product_instance (
                        receipt_line_id, serial_no, category_id, description,
                        unit_price, status, created_by
                    )
                    SELECT $1, planned.serial_no, $4, $5, $6,
                           planned.status::inventory.instance_status, $7
                    FROM UNNEST($2::int4[], $3::text[]) AS planned (serial_no, status)
                    ",
                )
                .bind(receipt_line_id)
                .bind(&serials)
                .bind(&statuses)
                .bind(line.category_id.as_i32())
                .bind(line.description.trim())
                .bind(line.unit_price)
                .bind(actor.as_i32())
                .execute(&mut *tx)
                .await
                .map_err(RepositoryError::from_constraint)?;
            }

            instance_count += plan.instances.len();
            line_ids.push(ReceiptLineId::new(receipt_line_id));
        }

        sqlx::query(
            r"
            UPDATE inventory.purchase_order
            SET invoice_recorded = TRUE, updated_at = NOW(), updated_by = $2
            WHERE id = $1
            ",
        )
        .bind(order.id)
        .bind(actor.as_i32())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ReceiptOutcome::Recorded {
            receipt_id: ReceiptId::new(receipt_id),
            line_ids,
            instance_count,
        })
    }

    /// Get a receipt header by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReceiptId) -> Result<Option<Receipt>, RepositoryError> {
        let row = sqlx::query_as::<_, ReceiptRow>(
            r"
            SELECT id, purchase_order_id, supplier_id, branch_id, invoice_number,
                   total_amount, invoice_recorded, idempotency_key, created_at, created_by
            FROM inventory.receipt
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Lines of a receipt in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, receipt_id: ReceiptId) -> Result<Vec<ReceiptLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReceiptLineRow>(
            r"
            SELECT id, receipt_id, line_item_id, category_id, description, unit_price,
                   ordered_quantity, accepted_quantity, rejected_quantity,
                   accepted_total, status
            FROM inventory.receipt_line
            WHERE receipt_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(receipt_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// All instances materialized by a receipt, by line then serial number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn instances(
        &self,
        receipt_id: ReceiptId,
    ) -> Result<Vec<ProductInstance>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductInstanceRow>(
            r"
            SELECT pi.id, pi.receipt_line_id, pi.serial_no, pi.category_id,
                   pi.description, pi.unit_price, pi.status, pi.created_at
            FROM inventory.product_instance pi
            JOIN inventory.receipt_line rl ON rl.id = pi.receipt_line_id
            WHERE rl.receipt_id = $1
            ORDER BY rl.id ASC, pi.serial_no ASC
            ",
        )
        .bind(receipt_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Look up the receipt that blocked an insert, by key first, then by invoice.
async fn find_existing(
    conn: &mut PgConnection,
    order_id: i32,
    input: &RecordReceiptInput,
) -> Result<Option<ExistingReceiptRow>, RepositoryError> {
    let row = sqlx::query_as::<_, ExistingReceiptRow>(
        r"
        SELECT id, purchase_order_id, invoice_number
        FROM inventory.receipt
        WHERE ($1::text IS NOT NULL AND idempotency_key = $1)
           OR (purchase_order_id = $2 AND invoice_number = $3)
        ORDER BY (idempotency_key IS NOT DISTINCT FROM $1) DESC
        LIMIT 1
        ",
    )
    .bind(input.idempotency_key.as_deref())
    .bind(order_id)
    .bind(input.invoice_number.trim())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Fold one line receipt into the purchase order line's cumulative progress.
async fn apply_to_line_item(
    conn: &mut PgConnection,
    actor: AdminUserId,
    order_id: i32,
    line_item_id: LineItemId,
    plan: &LinePlan,
) -> Result<(), RepositoryError> {
    let progress = sqlx::query_as::<_, LineProgressRow>(
        r"
        SELECT quantity, accepted_quantity, rejected_quantity
        FROM inventory.purchase_order_line_item
        WHERE id = $1 AND purchase_order_id = $2 AND NOT is_deleted
        FOR UPDATE
        ",
    )
    .bind(line_item_id.as_i32())
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| {
        RepositoryError::InvalidReference(format!(
            "line item {line_item_id} does not belong to this purchase order"
        ))
    })?;

    let accepted = i64::from(progress.accepted_quantity) + i64::from(plan.accepted_quantity);
    let rejected = i64::from(progress.rejected_quantity) + i64::from(plan.rejected_quantity);
    if accepted + rejected > i64::from(progress.quantity) {
        return Err(RepositoryError::Conflict(format!(
            "line item {line_item_id} would be over-received ({} of {} already handled)",
            progress.accepted_quantity + progress.rejected_quantity,
            progress.quantity
        )));
    }

    // Both sums are bounded by quantity, which is an i32.
    let (accepted, rejected) = (
        i32::try_from(accepted).unwrap_or(i32::MAX),
        i32::try_from(rejected).unwrap_or(i32::MAX),
    );

    sqlx::query(
        r"
        UPDATE inventory.purchase_order_line_item
        SET accepted_quantity = $2,
            rejected_quantity = $3,
            accepted_total = accepted_total + $4,
            status = $5,
            updated_at = NOW(),
            updated_by = $6
        WHERE id = $1
        ",
    )
    .bind(line_item_id.as_i32())
    .bind(accepted)
    .bind(rejected)
    .bind(plan.accepted_total)
    .bind(derive_line_status(accepted, rejected))
    .bind(actor.as_i32())
    .execute(&mut *conn)
    .await
    .map_err(RepositoryError::from_constraint)?;

    Ok(())
}
