//! Category routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};

use stockroom_core::CategoryId;

use super::{ApiJson, ApiResponse, ApiResult, respond};
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::models::{Category, CategoryInput};
use crate::state::AppState;

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list).post(create))
        .route("/api/categories/{id}", put(update).delete(delete))
}

pub async fn list(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> ApiResult<Vec<Category>> {
    let categories = state.reference().list_categories().await?;
    respond(&state, &admin, ApiResponse::ok("Categories fetched", categories))
}

pub async fn create(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), AppError> {
    let category = state.reference().create_category(&admin, &input).await?;
    let body = respond(&state, &admin, ApiResponse::ok("Category created", category))?;
    Ok((StatusCode::CREATED, body))
}

pub async fn update(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> ApiResult<Category> {
    let category = state
        .reference()
        .update_category(&admin, CategoryId::new(id), &input)
        .await?;
    respond(&state, &admin, ApiResponse::ok("Category updated", category))
}

pub async fn delete(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state
        .reference()
        .delete_category(&admin, CategoryId::new(id))
        .await?;
    respond(&state, &admin, ApiResponse::message("Category deleted"))
}
