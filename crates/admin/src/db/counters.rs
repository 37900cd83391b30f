//! Atomic sequence allocation for order numbers and SKUs.
//!
//! Each `(scope, period)` pair owns one row in `inventory.identifier_counter`.
//! Allocation is a single upsert, so concurrent callers serialize on the row
//! lock and always observe distinct values. Call these inside the transaction
//! that consumes the identifier: a rollback also rolls back the bump.

use chrono::NaiveDate;
use sqlx::PgConnection;

use stockroom_core::identifiers::IdentifierScope;

use super::RepositoryError;

/// Allocate the next value for a scope and date, and render it.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the upsert fails.
pub async fn next_identifier(
    conn: &mut PgConnection,
    scope: IdentifierScope,
    date: NaiveDate,
) -> Result<String, RepositoryError> {
    let sequence: i64 = sqlx::query_scalar(
        r"
        INSERT INTO inventory.identifier_counter (scope, period, last_value)
        VALUES ($1, $2, 1)
        ON CONFLICT (scope, period)
        DO UPDATE SET last_value = identifier_counter.last_value + 1
        RETURNING last_value
        ",
    )
    .bind(scope.key())
    .bind(scope.period(date))
    .fetch_one(&mut *conn)
    .await?;

    Ok(scope.render(date, sequence))
}

/// Allocate `PO-<year>-<NNNN>` for the given day.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the upsert fails.
pub async fn next_purchase_order_number(
    conn: &mut PgConnection,
    today: NaiveDate,
) -> Result<String, RepositoryError> {
    next_identifier(conn, IdentifierScope::PurchaseOrder, today).await
}

/// Allocate `SKU-<dd-mm-yy>-<NNNNN>` for the given day.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the upsert fails.
pub async fn next_sku(conn: &mut PgConnection, date: NaiveDate) -> Result<String, RepositoryError> {
    next_identifier(conn, IdentifierScope::Sku, date).await
}
