//! Receipt inspection routes.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};

use stockroom_core::ReceiptId;

use super::{ApiResponse, ApiResult, respond};
use crate::middleware::RequireAdminAuth;
use crate::models::ReceiptDetail;
use crate::state::AppState;

/// Build the receipts router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/receipts/{id}/instances", get(instances))
}

/// Show a receipt with its lines and materialized product instances.
pub async fn instances(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<ReceiptDetail> {
    let detail = state
        .purchase_orders()
        .get_receipt_instances(ReceiptId::new(id))
        .await?;
    respond(&state, &admin, ApiResponse::ok("Receipt fetched", detail))
}
