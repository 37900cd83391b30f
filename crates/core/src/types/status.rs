//! Status enums for the purchase-order pipeline.

use serde::{Deserialize, Serialize};

/// Receiving status of a purchase-order line.
///
/// Derived from received/rejected counts by
/// [`crate::reconciliation::derive_line_status`]. `Rejected` exists in the
/// stored enum but is never produced by derivation today; a line with any
/// rejected units is `Partial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "inventory.line_item_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum LineItemStatus {
    /// Every unit that arrived was accepted.
    Accepted,
    /// At least one unit was rejected.
    Partial,
    /// The whole line was rejected.
    Rejected,
}

impl LineItemStatus {
    /// Human-readable label used in API responses.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::Partial => "Partial",
            Self::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for LineItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Status of a single physical unit materialized during receiving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "inventory.instance_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Accepted,
    Rejected,
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Business event recorded in the transaction history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "inventory.transaction_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    PurchaseOrderCreated,
    ReceiptRecorded,
    PurchaseOrderDeleted,
}

impl TransactionType {
    /// Prefix used for the history entry's free-text data.
    #[must_use]
    pub const fn description_prefix(&self) -> &'static str {
        match self {
            Self::PurchaseOrderCreated => "PO Created",
            Self::ReceiptRecorded => "PO Received",
            Self::PurchaseOrderDeleted => "PO Deleted",
        }
    }

    /// Build the history entry text for a subject (usually an order number).
    #[must_use]
    pub fn describe(&self, subject: &str) -> String {
        format!("{}: {subject}", self.description_prefix())
    }
}

/// Admin role with different permission levels.
///
/// Tokens carry the numeric [`AdminRole::role_id`] rather than the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "inventory.admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access including admin user management.
    SuperAdmin,
    /// Can create and receive purchase orders and manage reference data.
    Admin,
    /// Read-only access.
    Viewer,
}

impl AdminRole {
    /// Numeric role identifier embedded in session tokens.
    #[must_use]
    pub const fn role_id(&self) -> i32 {
        match self {
            Self::SuperAdmin => 1,
            Self::Admin => 2,
            Self::Viewer => 3,
        }
    }

    /// Look up a role from its numeric identifier.
    #[must_use]
    pub const fn from_role_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::SuperAdmin),
            2 => Some(Self::Admin),
            3 => Some(Self::Viewer),
            _ => None,
        }
    }

    /// Whether this role may mutate purchase orders and reference data.
    #[must_use]
    pub const fn can_write(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_id_round_trip() {
        for role in [AdminRole::SuperAdmin, AdminRole::Admin, AdminRole::Viewer] {
            assert_eq!(AdminRole::from_role_id(role.role_id()), Some(role));
        }
        assert_eq!(AdminRole::from_role_id(0), None);
    }

    #[test]
    fn test_viewer_is_read_only() {
        assert!(!AdminRole::Viewer.can_write());
        assert!(AdminRole::Admin.can_write());
        assert!(AdminRole::SuperAdmin.can_write());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<AdminRole>(), Ok(AdminRole::Admin));
        assert!("owner".parse::<AdminRole>().is_err());
    }

    #[test]
    fn test_transaction_description() {
        assert_eq!(
            TransactionType::PurchaseOrderCreated.describe("PO-2025-0001"),
            "PO Created: PO-2025-0001"
        );
    }

    #[test]
    fn test_line_status_label() {
        assert_eq!(LineItemStatus::Partial.to_string(), "Partial");
        assert_eq!(InstanceStatus::Rejected.to_string(), "rejected");
    }
}
