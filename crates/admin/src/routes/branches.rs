//! Branch routes.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use super::{ApiJson, ApiResponse, ApiResult, respond};
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::models::{Branch, CreateBranchInput};
use crate::state::AppState;

/// Build the branches router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/branches", get(list).post(create))
}

pub async fn list(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> ApiResult<Vec<Branch>> {
    let branches = state.reference().list_branches().await?;
    respond(&state, &admin, ApiResponse::ok("Branches fetched", branches))
}

pub async fn create(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateBranchInput>,
) -> Result<(StatusCode, Json<ApiResponse<Branch>>), AppError> {
    let branch = state.reference().create_branch(&input).await?;
    let body = respond(&state, &admin, ApiResponse::ok("Branch created", branch))?;
    Ok((StatusCode::CREATED, body))
}
