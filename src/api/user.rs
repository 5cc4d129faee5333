//! Account settings endpoints.
//!
//! Both mutations require an identity backed by the caller's own bearer
//! token: demo and claims-based identities have nothing upstream to
//! mutate.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::patch,
};

use super::ApiResponse;
use super::error::ApiError;
use crate::auth::RequireAuth;
use crate::db::Database;
use crate::gateway::{ChangePasswordRequest, GatewayClient, UpdateProfileRequest};
use crate::impl_has_auth_backend;

#[derive(Clone)]
pub struct UserRoutesState {
    pub gateway: GatewayClient,
    pub db: Database,
}

impl_has_auth_backend!(UserRoutesState);

pub fn router(state: UserRoutesState) -> Router {
    Router::new()
        .route("/profile", patch(update_profile))
        .route("/password", patch(change_password))
        .with_state(state)
}

async fn update_profile(
    State(state): State<UserRoutesState>,
    RequireAuth(identity): RequireAuth,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !identity.can_mutate_upstream() {
        return Err(ApiError::forbidden(
            "Demo accounts cannot modify account settings",
        ));
    }

    // The resolver left the caller's bearer on the gateway for this
    // request path.
    let profile = state.gateway.update_profile(&req).await?;
    Ok(Json(ApiResponse::ok("Profile updated", profile)))
}

async fn change_password(
    State(state): State<UserRoutesState>,
    RequireAuth(identity): RequireAuth,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !identity.can_mutate_upstream() {
        return Err(ApiError::forbidden(
            "Demo accounts cannot modify account settings",
        ));
    }

    state.gateway.change_password(&req).await?;
    Ok(Json(ApiResponse::message("Password changed")))
}
