//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /api/auth/login                               - Username/password login
//!
//! # Purchase orders
//! GET    /api/purchase-orders                          - Filtered, paged listing
//! POST   /api/purchase-orders                          - Create order with line items
//! GET    /api/purchase-orders/{order_number}           - Order detail
//! DELETE /api/purchase-orders/{order_number}           - Soft delete
//! POST   /api/purchase-orders/{order_number}/receipts  - Record a delivery
//! GET    /api/receipts/{id}/instances                  - Receipt with its instances
//!
//! # Reference data
//! GET    /api/suppliers                                - Search + paging
//! POST   /api/suppliers                                - Create
//! GET    /api/suppliers/{id}                           - Detail
//! PUT    /api/suppliers/{id}                           - Replace
//! DELETE /api/suppliers/{id}                           - Soft delete
//! GET    /api/categories                               - List
//! POST   /api/categories                               - Create
//! PUT    /api/categories/{id}                          - Rename
//! DELETE /api/categories/{id}                          - Soft delete
//! GET    /api/branches                                 - List
//! POST   /api/branches                                 - Create
//! GET    /api/products                                 - Paged listing
//! POST   /api/products                                 - Create (allocates SKU)
//! GET    /api/products/{sku}                           - Detail
//! ```
//!
//! Every response uses the envelope
//! `{"status": bool, "message": string, "data"?: any, "token"?: string}`.
//! Authenticated successes carry a freshly issued token.

pub mod auth;
pub mod branches;
pub mod categories;
pub mod products;
pub mod purchase_orders;
pub mod receipts;
pub mod suppliers;

use axum::extract::{FromRequest, FromRequestParts};
use axum::{Json, Router};
use serde::Serialize;

use crate::error::AppError;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Build the complete API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(purchase_orders::router())
        .merge(receipts::router())
        .merge(suppliers::router())
        .merge(categories::router())
        .merge(branches::router())
        .merge(products::router())
}

/// Standard response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying data.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: Some(data),
            token: None,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }
}

impl ApiResponse<()> {
    /// Successful response without data.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: None,
            token: None,
        }
    }
}

/// JSON body extractor whose rejections leave as the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections leave as the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// JSON result of an authenticated handler.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Wrap data for an authenticated caller, reissuing their token.
///
/// # Errors
///
/// Returns `AppError::Internal` if the token cannot be signed.
pub fn respond<T>(
    state: &AppState,
    admin: &CurrentAdmin,
    response: ApiResponse<T>,
) -> ApiResult<T> {
    let token = state.tokens().issue(admin)?;
    Ok(Json(response.with_token(token)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::message("Deleted")).unwrap();
        assert_eq!(json, serde_json::json!({"status": true, "message": "Deleted"}));
    }

    #[test]
    fn test_envelope_with_data_and_token() {
        let json = serde_json::to_value(
            ApiResponse::ok("Fetched", vec![1, 2]).with_token("t0k".to_string()),
        )
        .unwrap();
        assert_eq!(json["status"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["token"], "t0k");
    }
}
