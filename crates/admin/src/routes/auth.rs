//! Login route.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiJson, ApiResponse};
use crate::error::AppError;
use crate::models::AdminUser;
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub user: AdminUser,
}

/// Exchange a username and password for a session token.
///
/// # Errors
///
/// Returns 400 for blank fields and 401 for unknown users or wrong passwords.
#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginData>>, AppError> {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "username and password are required".to_string(),
        ));
    }

    let service = AdminAuthService::new(state.pool(), state.tokens());
    let session = tokio::time::timeout(
        state.request_timeout(),
        service.login(&body.username, &body.password),
    )
    .await??;

    Ok(Json(
        ApiResponse::ok("Logged in", LoginData { user: session.user }).with_token(session.token),
    ))
}
