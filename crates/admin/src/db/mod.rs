//! Database operations for the stockroom `PostgreSQL` schema.
//!
//! # Schema: `inventory`
//!
//! ## Tables
//!
//! - `branch`, `supplier`, `category`, `product` - Reference data
//! - `admin_user` - Admin accounts (argon2 password hashes)
//! - `identifier_counter` - Per-period sequences for order numbers and SKUs
//! - `purchase_order`, `purchase_order_line_item` - Purchase order aggregate
//! - `receipt`, `receipt_line`, `product_instance` - Receiving records
//! - `transaction_history` - Append-only business event log
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p stockroom-cli -- migrate
//! ```

pub mod admin_users;
pub mod branches;
pub mod categories;
pub mod counters;
pub mod products;
pub mod purchase_orders;
pub mod receipts;
pub mod suppliers;
pub mod transaction_history;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use branches::BranchRepository;
pub use categories::CategoryRepository;
pub use products::ProductRepository;
pub use purchase_orders::PurchaseOrderRepository;
pub use receipts::ReceiptRepository;
pub use suppliers::SupplierRepository;
pub use transaction_history::TransactionHistoryRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// A referenced row (supplier, branch, category, ...) does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Constraint violation (e.g., duplicate supplier mobile).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Classify a sqlx error by the constraint it violated.
    ///
    /// Unique and check violations become `Conflict`, foreign-key violations
    /// become `InvalidReference`, everything else stays `Database`.
    pub(crate) fn from_constraint(err: sqlx::Error) -> Self {
        let sqlx::Error::Database(db_err) = &err else {
            return Self::Database(err);
        };

        let constraint = db_err.constraint().unwrap_or_default();
        match db_err.kind() {
            sqlx::error::ErrorKind::UniqueViolation => {
                Self::Conflict(describe_unique_violation(constraint).to_string())
            }
            sqlx::error::ErrorKind::ForeignKeyViolation => {
                Self::InvalidReference(describe_foreign_key(constraint).to_string())
            }
            sqlx::error::ErrorKind::CheckViolation => {
                Self::Conflict(describe_check_violation(constraint).to_string())
            }
            _ => Self::Database(err),
        }
    }
}

fn describe_unique_violation(constraint: &str) -> &'static str {
    match constraint {
        "idx_supplier_identity" => "a supplier with this name, company and code already exists",
        "idx_supplier_mobile" => "a supplier with this mobile number already exists",
        "idx_category_name" => "a category with this name already exists",
        "branch_name_key" => "a branch with this name already exists",
        "admin_user_username_key" => "an admin user with this username already exists",
        "product_sku_key" => "a product with this SKU already exists",
        "purchase_order_number_key" => "order number already allocated",
        "receipt_order_invoice_key" => "this invoice was already recorded against the order",
        "receipt_idempotency_key" => "idempotency key was already used for another receipt",
        _ => "duplicate record",
    }
}

fn describe_foreign_key(constraint: &str) -> &'static str {
    if constraint.contains("supplier_id") {
        "supplier not found"
    } else if constraint.contains("branch_id") {
        "branch not found"
    } else if constraint.contains("category_id") {
        "category not found"
    } else if constraint.contains("line_item_id") {
        "purchase order line item not found"
    } else if constraint.contains("created_by") || constraint.contains("updated_by") {
        "acting admin user not found"
    } else {
        "referenced record not found"
    }
}

fn describe_check_violation(constraint: &str) -> &'static str {
    match constraint {
        "purchase_order_line_item_check" => {
            "accepted plus rejected quantity would exceed the ordered quantity"
        }
        _ => "value out of range",
    }
}

/// Build an `ILIKE` pattern matching `term` anywhere, with wildcards escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Connection pool settings.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// Applied as `statement_timeout` on every connection.
    pub statement_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            statement_timeout: Duration::from_secs(15),
        }
    }
}

/// Create a `PostgreSQL` connection pool.
///
/// Every new connection gets `statement_timeout` set so no single statement
/// can outlive the request deadline.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    settings: PoolSettings,
) -> Result<PgPool, sqlx::Error> {
    let timeout_ms = settings.statement_timeout.as_millis();

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.max_connections.min(2))
        .acquire_timeout(Duration::from_secs(10))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                conn.execute(format!("SET statement_timeout = {timeout_ms}").as_str())
                    .await?;
                Ok(())
            })
        })
        .connect(database_url.expose_secret())
        .await
}
