//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Username/password login and session tokens
//! - `purchase_orders` - Purchase order intake, receiving and queries
//! - `reference` - Suppliers, categories, branches and products

pub mod auth;
pub mod purchase_orders;
pub mod reference;

use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

pub use auth::{AdminAuthService, AuthError, LoginSession, TokenService};
pub use purchase_orders::PurchaseOrderService;
pub use reference::ReferenceService;

/// Run a storage call under the request deadline.
///
/// An elapsed deadline drops the future, which rolls back any open
/// transaction, and surfaces as [`AppError::Timeout`].
pub(crate) async fn with_deadline<T, E, F>(deadline: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, E>>,
    AppError: From<E>,
{
    Ok(tokio::time::timeout(deadline, fut).await??)
}

/// Reject blank required text.
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Reject non-positive references. IDs are database serials and start at 1.
pub(crate) fn require_positive_id(field: &str, value: i32) -> Result<(), AppError> {
    if value <= 0 {
        return Err(AppError::Validation(format!(
            "{field} must be a positive id (got {value})"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::RepositoryError;

    #[tokio::test]
    async fn test_deadline_elapses() {
        let result: Result<(), AppError> = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, RepositoryError>(())
        })
        .await;
        assert!(matches!(result, Err(AppError::Timeout)));
    }

    #[tokio::test]
    async fn test_deadline_passes_inner_error_through() {
        let result: Result<(), AppError> = with_deadline(Duration::from_secs(5), async {
            Err::<(), _>(RepositoryError::NotFound)
        })
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_required_text() {
        assert!(require_text("description", "Desk lamp").is_ok());
        assert!(matches!(
            require_text("description", "   "),
            Err(AppError::Validation(m)) if m == "description is required"
        ));
    }

    #[test]
    fn test_positive_ids() {
        assert!(require_positive_id("supplier_id", 7).is_ok());
        assert!(require_positive_id("supplier_id", 0).is_err());
        assert!(require_positive_id("supplier_id", -2).is_err());
    }
}
