//! Product routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use super::{ApiJson, ApiQuery, ApiResponse, ApiResult, respond};
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::models::{CreateProductInput, Page, Paging, Product};
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/{sku}", get(show))
}

/// Paging query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

pub async fn list(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Page<Product>> {
    let paging = Paging::new(query.page, query.page_size);
    let page = state.reference().list_products(paging).await?;
    respond(&state, &admin, ApiResponse::ok("Products fetched", page))
}

pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> ApiResult<Product> {
    let product = state.reference().get_product(&sku).await?;
    respond(&state, &admin, ApiResponse::ok("Product fetched", product))
}

pub async fn create(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateProductInput>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), AppError> {
    let product = state.reference().create_product(&admin, &input).await?;
    let message = format!("Product {} created", product.sku);
    let body = respond(&state, &admin, ApiResponse::ok(message, product))?;
    Ok((StatusCode::CREATED, body))
}
