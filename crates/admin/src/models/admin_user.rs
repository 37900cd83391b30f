//! Admin user domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stockroom_core::{AdminUserId, BranchId};

// Re-export AdminRole from core for convenience
pub use stockroom_core::AdminRole;

/// An admin user (domain type). The password hash never leaves `db`.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// Login name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Permission level.
    pub role: AdminRole,
    /// Branch the admin works from.
    pub branch_id: BranchId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
