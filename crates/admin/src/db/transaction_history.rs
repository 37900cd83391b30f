//! Append-only transaction history.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use stockroom_core::{AdminUserId, TransactionHistoryId, TransactionType};

use super::RepositoryError;
use crate::models::TransactionHistoryEntry;

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: i32,
    trans_type: TransactionType,
    data: String,
    actor_id: i32,
    created_at: DateTime<Utc>,
    created_by: i32,
}

impl From<HistoryRow> for TransactionHistoryEntry {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: TransactionHistoryId::new(row.id),
            trans_type: row.trans_type,
            data: row.data,
            actor_id: AdminUserId::new(row.actor_id),
            created_at: row.created_at,
            created_by: AdminUserId::new(row.created_by),
        }
    }
}

/// Repository for the transaction history log.
pub struct TransactionHistoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransactionHistoryRepository<'a> {
    /// Create a new transaction history repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry such as `PO Created: PO-2025-0001`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn append(
        &self,
        actor: AdminUserId,
        trans_type: TransactionType,
        subject: &str,
    ) -> Result<TransactionHistoryId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO inventory.transaction_history (trans_type, data, actor_id, created_by)
            VALUES ($1, $2, $3, $3)
            RETURNING id
            ",
        )
        .bind(trans_type)
        .bind(trans_type.describe(subject))
        .bind(actor.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(TransactionHistoryId::new(id))
    }

    /// Entries whose text mentions a subject, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_subject(
        &self,
        subject: &str,
    ) -> Result<Vec<TransactionHistoryEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r"
            SELECT id, trans_type, data, actor_id, created_at, created_by
            FROM inventory.transaction_history
            WHERE data LIKE '%: ' || $1
            ORDER BY id ASC
            ",
        )
        .bind(subject)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
