//! The authenticated actor behind a request.

use serde::{Deserialize, Serialize};

use stockroom_core::{AdminUserId, BranchId};

use super::admin_user::AdminRole;

/// Identity carried by a validated session token.
///
/// Services trust this triple as-is; it is only ever built from a token the
/// server signed itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's database ID.
    pub id: AdminUserId,
    /// Admin's role/permission level.
    pub role: AdminRole,
    /// Branch the admin belongs to.
    pub branch_id: BranchId,
}

impl CurrentAdmin {
    /// Whether this admin may create, receive or delete records.
    #[must_use]
    pub const fn can_write(&self) -> bool {
        self.role.can_write()
    }
}
