//! Purchase order routes: create, list, detail, delete and receiving.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use super::{ApiJson, ApiQuery, ApiResponse, ApiResult, respond};
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::models::{
    CreatePurchaseOrderInput, CreatedPurchaseOrder, OrderFilter, Page, PurchaseOrderView,
    ReceiptOutcome, RecordReceiptInput,
};
use crate::state::AppState;

/// Build the purchase order router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/purchase-orders", get(list).post(create))
        .route(
            "/api/purchase-orders/{order_number}",
            get(detail).delete(delete),
        )
        .route(
            "/api/purchase-orders/{order_number}/receipts",
            post(record_receipt),
        )
}

/// Create a purchase order.
#[instrument(skip(state, admin, input))]
pub async fn create(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreatePurchaseOrderInput>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedPurchaseOrder>>), AppError> {
    let created = state
        .purchase_orders()
        .create_purchase_order(&admin, &input)
        .await?;

    let message = format!("Purchase order {} created", created.order_number);
    let body = respond(&state, &admin, ApiResponse::ok(message, created))?;
    Ok((StatusCode::CREATED, body))
}

/// List purchase orders.
#[instrument(skip(state, admin))]
pub async fn list(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<OrderFilter>,
) -> ApiResult<Page<PurchaseOrderView>> {
    let page = state.purchase_orders().list_orders(&filter).await?;
    respond(&state, &admin, ApiResponse::ok("Purchase orders fetched", page))
}

/// Show one purchase order with its line items.
#[instrument(skip(state, admin))]
pub async fn detail(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> ApiResult<PurchaseOrderView> {
    let order = state
        .purchase_orders()
        .get_order_detail(&order_number)
        .await?;
    respond(&state, &admin, ApiResponse::ok("Purchase order fetched", order))
}

/// Soft delete a purchase order.
#[instrument(skip(state, admin))]
pub async fn delete(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> ApiResult<()> {
    state
        .purchase_orders()
        .soft_delete_order(&admin, &order_number)
        .await?;
    respond(
        &state,
        &admin,
        ApiResponse::message(format!("Purchase order {order_number} deleted")),
    )
}

/// Record a delivery against a purchase order.
///
/// Answers 201 when the receipt was written and 200 for a replay.
#[instrument(skip(state, admin, input))]
pub async fn record_receipt(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(order_number): Path<String>,
    ApiJson(input): ApiJson<RecordReceiptInput>,
) -> Result<(StatusCode, Json<ApiResponse<ReceiptOutcome>>), AppError> {
    let outcome = state
        .purchase_orders()
        .record_receipt(&admin, &order_number, &input)
        .await?;

    let (status, message) = if outcome.is_replay() {
        (StatusCode::OK, "Receipt already recorded")
    } else {
        (StatusCode::CREATED, "Receipt recorded")
    };
    let body = respond(&state, &admin, ApiResponse::ok(message, outcome))?;
    Ok((status, body))
}
