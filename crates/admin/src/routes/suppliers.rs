//! Supplier routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use stockroom_core::SupplierId;

use super::{ApiJson, ApiQuery, ApiResponse, ApiResult, respond};
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::models::{Page, Supplier, SupplierFilter, SupplierInput};
use crate::state::AppState;

/// Build the suppliers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/suppliers", get(list).post(create))
        .route("/api/suppliers/{id}", get(show).put(update).delete(delete))
}

pub async fn list(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<SupplierFilter>,
) -> ApiResult<Page<Supplier>> {
    let page = state.reference().list_suppliers(&filter).await?;
    respond(&state, &admin, ApiResponse::ok("Suppliers fetched", page))
}

pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Supplier> {
    let supplier = state.reference().get_supplier(SupplierId::new(id)).await?;
    respond(&state, &admin, ApiResponse::ok("Supplier fetched", supplier))
}

pub async fn create(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SupplierInput>,
) -> Result<(StatusCode, Json<ApiResponse<Supplier>>), AppError> {
    let supplier = state.reference().create_supplier(&admin, &input).await?;
    let body = respond(&state, &admin, ApiResponse::ok("Supplier created", supplier))?;
    Ok((StatusCode::CREATED, body))
}

pub async fn update(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(input): ApiJson<SupplierInput>,
) -> ApiResult<Supplier> {
    let supplier = state
        .reference()
        .update_supplier(&admin, SupplierId::new(id), &input)
        .await?;
    respond(&state, &admin, ApiResponse::ok("Supplier updated", supplier))
}

pub async fn delete(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state
        .reference()
        .delete_supplier(&admin, SupplierId::new(id))
        .await?;
    respond(&state, &admin, ApiResponse::message("Supplier deleted"))
}
