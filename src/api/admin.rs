//! Admin user-management endpoints, proxied to the upstream.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use super::ApiResponse;
use super::error::ApiError;
use crate::auth::RequireAdmin;
use crate::db::Database;
use crate::gateway::{CreateUserRequest, GatewayClient};
use crate::impl_has_auth_backend;

#[derive(Clone)]
pub struct AdminRoutesState {
    pub gateway: GatewayClient,
    pub db: Database,
}

impl_has_auth_backend!(AdminRoutesState);

pub fn router(state: AdminRoutesState) -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .with_state(state)
}

async fn list_users(
    State(state): State<AdminRoutesState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.gateway.list_users().await?;
    Ok(Json(ApiResponse::ok("OK", users)))
}

async fn create_user(
    State(state): State<AdminRoutesState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.trim().is_empty() {
        return Err(ApiError::bad_request("Email cannot be empty"));
    }

    let user = state.gateway.create_user(&req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("User created", user))))
}
