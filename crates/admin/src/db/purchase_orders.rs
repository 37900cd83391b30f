//! Purchase order repository: aggregate writes and the list/detail projection.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use stockroom_core::{
    AdminUserId, BranchId, CategoryId, LineItemId, LineItemStatus, MobileNumber, OrderTotals,
    PurchaseOrderId, SupplierId,
};

use super::{RepositoryError, contains_pattern, counters};
use crate::models::{
    BranchSummary, CreatePurchaseOrderInput, CreatedPurchaseOrder, LineItem, OrderFilter, Paging,
    PurchaseOrder, PurchaseOrderView, SupplierSummary,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct PurchaseOrderRow {
    id: i32,
    order_number: String,
    supplier_id: i32,
    branch_id: i32,
    sub_total: Decimal,
    total_discount: Decimal,
    tax_enabled: bool,
    tax_percentage: Decimal,
    tax_amount: Decimal,
    total_amount: Decimal,
    credited_date: NaiveDate,
    invoice_recorded: bool,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    created_by: i32,
    updated_at: DateTime<Utc>,
    updated_by: i32,
}

impl From<PurchaseOrderRow> for PurchaseOrder {
    fn from(row: PurchaseOrderRow) -> Self {
        Self {
            id: PurchaseOrderId::new(row.id),
            order_number: row.order_number,
            supplier_id: SupplierId::new(row.supplier_id),
            branch_id: BranchId::new(row.branch_id),
            totals: OrderTotals {
                sub_total: row.sub_total,
                total_discount: row.total_discount,
                tax_enabled: row.tax_enabled,
                tax_percentage: row.tax_percentage,
                tax_amount: row.tax_amount,
                total_amount: row.total_amount,
            },
            credited_date: row.credited_date,
            invoice_recorded: row.invoice_recorded,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            created_by: AdminUserId::new(row.created_by),
            updated_at: row.updated_at,
            updated_by: AdminUserId::new(row.updated_by),
        }
    }
}

/// Header joined with the supplier and branch columns the view needs.
#[derive(Debug, sqlx::FromRow)]
struct OrderHeaderRow {
    id: i32,
    order_number: String,
    credited_date: NaiveDate,
    invoice_recorded: bool,
    sub_total: Decimal,
    total_discount: Decimal,
    tax_enabled: bool,
    tax_percentage: Decimal,
    tax_amount: Decimal,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    supplier_id: i32,
    supplier_name: String,
    supplier_company: String,
    supplier_mobile: String,
    branch_id: i32,
    branch_name: String,
}

impl OrderHeaderRow {
    fn into_view(self, line_items: Vec<LineItem>) -> Result<PurchaseOrderView, RepositoryError> {
        let mobile = MobileNumber::parse(&self.supplier_mobile).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid supplier mobile in database: {e}"))
        })?;

        Ok(PurchaseOrderView {
            id: PurchaseOrderId::new(self.id),
            order_number: self.order_number,
            credited_date: self.credited_date,
            invoice_recorded: self.invoice_recorded,
            supplier: SupplierSummary {
                id: SupplierId::new(self.supplier_id),
                name: self.supplier_name,
                company: self.supplier_company,
                mobile,
            },
            branch: BranchSummary {
                id: BranchId::new(self.branch_id),
                name: self.branch_name,
            },
            summary: OrderTotals {
                sub_total: self.sub_total,
                total_discount: self.total_discount,
                tax_enabled: self.tax_enabled,
                tax_percentage: self.tax_percentage,
                tax_amount: self.tax_amount,
                total_amount: self.total_amount,
            },
            line_items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    id: i32,
    purchase_order_id: i32,
    category_id: i32,
    description: String,
    unit_price: Decimal,
    quantity: i32,
    discount: Decimal,
    line_total: Decimal,
    accepted_quantity: i32,
    rejected_quantity: i32,
    accepted_total: Decimal,
    status: Option<LineItemStatus>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LineItemRow> for LineItem {
    fn from(row: LineItemRow) -> Self {
        Self {
            id: LineItemId::new(row.id),
            purchase_order_id: PurchaseOrderId::new(row.purchase_order_id),
            category_id: CategoryId::new(row.category_id),
            description: row.description,
            unit_price: row.unit_price,
            quantity: row.quantity,
            discount: row.discount,
            line_total: row.line_total,
            accepted_quantity: row.accepted_quantity,
            rejected_quantity: row.rejected_quantity,
            accepted_total: row.accepted_total,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const ORDER_COLUMNS: &str = r"
    id, order_number, supplier_id, branch_id,
    sub_total, total_discount, tax_enabled, tax_percentage, tax_amount, total_amount,
    credited_date, invoice_recorded, is_deleted,
    created_at, created_by, updated_at, updated_by
";

const HEADER_SELECT: &str = r"
    SELECT
        po.id, po.order_number, po.credited_date, po.invoice_recorded,
        po.sub_total, po.total_discount, po.tax_enabled, po.tax_percentage,
        po.tax_amount, po.total_amount, po.created_at, po.updated_at,
        s.id AS supplier_id, s.name AS supplier_name,
        s.company AS supplier_company, s.mobile AS supplier_mobile,
        b.id AS branch_id, b.name AS branch_name
    FROM inventory.purchase_order po
    JOIN inventory.supplier s ON s.id = po.supplier_id
    JOIN inventory.branch b ON b.id = po.branch_id
";

const FILTER_CLAUSE: &str = r"
    WHERE NOT po.is_deleted
      AND ($1::text IS NULL
           OR po.order_number ILIKE $1
           OR s.name ILIKE $1
           OR b.name ILIKE $1)
      AND ($2::int4 IS NULL OR po.id = $2)
      AND ($3::int4 IS NULL OR po.supplier_id = $3)
      AND ($4::date IS NULL OR po.credited_date >= $4)
      AND ($5::date IS NULL OR po.credited_date <= $5)
";

// =============================================================================
// Repository
// =============================================================================

/// Repository for purchase order database operations.
pub struct PurchaseOrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PurchaseOrderRepository<'a> {
    /// Create a new purchase order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a purchase order with all of its line items.
    ///
    /// Allocates the order number, inserts the header and inserts every line
    /// in input order inside one transaction. Nothing is visible unless every
    /// statement succeeds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the supplier, branch,
    /// a category or the actor does not exist.
    /// Returns `RepositoryError::Conflict` if a constraint rejects a value.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        actor: AdminUserId,
        input: &CreatePurchaseOrderInput,
        today: NaiveDate,
    ) -> Result<CreatedPurchaseOrder, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_number = counters::next_purchase_order_number(&mut tx, today).await?;
        let totals = &input.summary;

        let order_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO inventory.purchase_order (
                order_number, supplier_id, branch_id,
                sub_total, total_discount, tax_enabled, tax_percentage,
                tax_amount, total_amount, credited_date,
                created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING id
            ",
        )
        .bind(&order_number)
        .bind(input.supplier_id.as_i32())
        .bind(input.branch_id.as_i32())
        .bind(totals.sub_total)
        .bind(totals.total_discount)
        .bind(totals.tax_enabled)
        .bind(totals.tax_percentage)
        .bind(totals.tax_amount)
        .bind(totals.total_amount)
        .bind(input.credited_date.unwrap_or(today))
        .bind(actor.as_i32())
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from_constraint)?;

        let mut line_item_ids = Vec::with_capacity(input.line_items.len());
        for line in &input.line_items {
            let line_id: i32 = sqlx::query_scalar(
                r"
                INSERT INTO inventory.purchase_order_line_item (
                    purchase_order_id, category_id, description,
                    unit_price, quantity, discount, line_total,
                    created_by, updated_by
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
                RETURNING id
                ",
            )
            .bind(order_id)
            .bind(line.category_id.as_i32())
            .bind(line.description.trim())
            .bind(line.unit_price)
            .bind(line.quantity)
            .bind(line.discount)
            .bind(line.resolved_line_total())
            .bind(actor.as_i32())
            .fetch_one(&mut *tx)
            .await
            .map_err(RepositoryError::from_constraint)?;

            line_item_ids.push(LineItemId::new(line_id));
        }

        tx.commit().await?;

        Ok(CreatedPurchaseOrder {
            id: PurchaseOrderId::new(order_id),
            order_number,
            line_item_ids,
        })
    }

    /// Get a live purchase order header by its order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<PurchaseOrder>, RepositoryError> {
        let row = sqlx::query_as::<_, PurchaseOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM inventory.purchase_order \
             WHERE order_number = $1 AND NOT is_deleted"
        ))
        .bind(order_number)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Count live orders matching a filter, ignoring paging.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &OrderFilter) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM inventory.purchase_order po \
             JOIN inventory.supplier s ON s.id = po.supplier_id \
             JOIN inventory.branch b ON b.id = po.branch_id \
             {FILTER_CLAUSE}"
        ))
        .bind(filter.search_term().map(contains_pattern))
        .bind(filter.order_id.map(|id| id.as_i32()))
        .bind(filter.supplier_id.map(|id| id.as_i32()))
        .bind(filter.from_date)
        .bind(filter.to_date)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Fetch one page of order views, ascending by id.
    ///
    /// Line items are loaded with one query per order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored supplier mobile is invalid.
    pub async fn list_page(
        &self,
        filter: &OrderFilter,
        paging: Paging,
    ) -> Result<Vec<PurchaseOrderView>, RepositoryError> {
        let headers = sqlx::query_as::<_, OrderHeaderRow>(&format!(
            "{HEADER_SELECT} {FILTER_CLAUSE} ORDER BY po.id ASC LIMIT $6 OFFSET $7"
        ))
        .bind(filter.search_term().map(contains_pattern))
        .bind(filter.order_id.map(|id| id.as_i32()))
        .bind(filter.supplier_id.map(|id| id.as_i32()))
        .bind(filter.from_date)
        .bind(filter.to_date)
        .bind(paging.limit())
        .bind(paging.offset())
        .fetch_all(self.pool)
        .await?;

        let mut views = Vec::with_capacity(headers.len());
        for header in headers {
            let line_items = self
                .line_items(PurchaseOrderId::new(header.id))
                .await?;
            views.push(header.into_view(line_items)?);
        }

        Ok(views)
    }

    /// Get the full view of a live order by its order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored supplier mobile is invalid.
    pub async fn get_view_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<PurchaseOrderView>, RepositoryError> {
        let header = sqlx::query_as::<_, OrderHeaderRow>(&format!(
            "{HEADER_SELECT} WHERE po.order_number = $1 AND NOT po.is_deleted"
        ))
        .bind(order_number)
        .fetch_optional(self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let line_items = self.line_items(PurchaseOrderId::new(header.id)).await?;
        header.into_view(line_items).map(Some)
    }

    /// Live line items of an order in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn line_items(
        &self,
        order_id: PurchaseOrderId,
    ) -> Result<Vec<LineItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, LineItemRow>(
            r"
            SELECT
                id, purchase_order_id, category_id, description,
                unit_price, quantity, discount, line_total,
                accepted_quantity, rejected_quantity, accepted_total, status,
                created_at, updated_at
            FROM inventory.purchase_order_line_item
            WHERE purchase_order_id = $1 AND NOT is_deleted
            ORDER BY id ASC
            ",
        )
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Soft-delete an order and its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live order has this number.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn soft_delete(
        &self,
        actor: AdminUserId,
        order_number: &str,
    ) -> Result<PurchaseOrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id: i32 = sqlx::query_scalar(
            r"
            UPDATE inventory.purchase_order
            SET is_deleted = TRUE, updated_at = NOW(), updated_by = $2
            WHERE order_number = $1 AND NOT is_deleted
            RETURNING id
            ",
        )
        .bind(order_number)
        .bind(actor.as_i32())
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::from_constraint)?
        .ok_or(RepositoryError::NotFound)?;

        sqlx::query(
            r"
            UPDATE inventory.purchase_order_line_item
            SET is_deleted = TRUE, updated_at = NOW(), updated_by = $2
            WHERE purchase_order_id = $1 AND NOT is_deleted
            ",
        )
        .bind(order_id)
        .bind(actor.as_i32())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PurchaseOrderId::new(order_id))
    }
}
