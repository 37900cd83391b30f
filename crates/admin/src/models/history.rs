//! Append-only business event log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stockroom_core::{AdminUserId, TransactionHistoryId, TransactionType};

/// One history entry, e.g. `PO Created: PO-2025-0001`.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionHistoryEntry {
    pub id: TransactionHistoryId,
    pub trans_type: TransactionType,
    pub data: String,
    pub actor_id: AdminUserId,
    pub created_at: DateTime<Utc>,
    pub created_by: AdminUserId,
}
