mod admin;
mod auth_routes;
mod error;
mod user;

use std::sync::Arc;

use axum::Router;
use serde::Serialize;

pub use error::{ApiError, ResultExt};

use crate::db::Database;
use crate::gateway::GatewayClient;
use crate::rate_limit::RateLimitConfig;

/// Success envelope mirroring the upstream response shape.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success with no data payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Create the API router.
pub fn create_api_router(
    gateway: GatewayClient,
    db: Database,
    secure_cookies: bool,
    demo_session_ttl_minutes: i64,
) -> Router {
    let rate_limits = Arc::new(RateLimitConfig::new());

    let auth_state = auth_routes::AuthRoutesState {
        gateway: gateway.clone(),
        db: db.clone(),
        secure_cookies,
        demo_session_ttl_minutes,
    };

    let user_state = user::UserRoutesState {
        gateway: gateway.clone(),
        db: db.clone(),
    };

    let admin_state = admin::AdminRoutesState { gateway, db };

    Router::new()
        .nest("/auth", auth_routes::router(auth_state, rate_limits))
        .nest("/user", user::router(user_state))
        .nest("/users", admin::router(admin_state))
}
