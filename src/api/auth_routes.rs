//! Authentication proxy endpoints.
//!
//! - POST `/login`, `/register` - proxy to the upstream, return tokens + profile
//! - POST `/logout` - best-effort upstream invalidation, always succeeds
//! - POST `/refresh` - exchange a refresh token for a fresh pair
//! - GET `/me` - the resolved identity's profile
//! - POST `/forgot-password` - proxy a reset request
//! - POST `/demo` - mint a server-side demo session

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::{ApiError, ResultExt};
use super::ApiResponse;
use crate::auth::{DEMO_COOKIE_NAME, RequireAuth, bearer_token, get_cookie};
use crate::db::Database;
use crate::gateway::{
    ForgotPasswordRequest, GatewayClient, LoginRequest, RefreshRequest, RegisterRequest,
    UserProfile,
};
use crate::impl_has_auth_backend;
use crate::names;
use crate::rate_limit::{RateLimitConfig, rate_limit_demo, rate_limit_login, rate_limit_register};

#[derive(Clone)]
pub struct AuthRoutesState {
    pub gateway: GatewayClient,
    pub db: Database,
    pub secure_cookies: bool,
    pub demo_session_ttl_minutes: i64,
}

impl_has_auth_backend!(AuthRoutesState);

pub fn router(state: AuthRoutesState, rate_limits: Arc<RateLimitConfig>) -> Router {
    let login_router = Router::new()
        .route("/login", post(login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            rate_limits.clone(),
            rate_limit_login,
        ));

    let register_router = Router::new()
        .route("/register", post(register))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            rate_limits.clone(),
            rate_limit_register,
        ));

    let demo_router = Router::new()
        .route("/demo", post(create_demo_session))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(rate_limits, rate_limit_demo));

    let open_router = Router::new()
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .route("/me", get(me))
        .route("/forgot-password", post(forgot_password))
        .with_state(state);

    Router::new()
        .merge(login_router)
        .merge(register_router)
        .merge(demo_router)
        .merge(open_router)
}

/// Tokens + profile returned by login and register.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    access_token: String,
    refresh_token: String,
    user: UserProfile,
}

async fn login(
    State(state): State<AuthRoutesState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = state.gateway.login(&req).await?;
    Ok(Json(ApiResponse::ok(
        "Login successful",
        AuthResponse {
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
            user: payload.user,
        },
    )))
}

async fn register(
    State(state): State<AuthRoutesState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = state.gateway.register(&req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Account created",
            AuthResponse {
                access_token: payload.access_token,
                refresh_token: payload.refresh_token,
                user: payload.user,
            },
        )),
    ))
}

/// Logout always succeeds for the caller: the upstream call is
/// best-effort and local demo state is cleared regardless.
async fn logout(State(state): State<AuthRoutesState>, request: Request) -> impl IntoResponse {
    let (parts, _body) = request.into_parts();

    if let Some(token) = bearer_token(&parts.headers) {
        state.gateway.set_access_token(Some(token.to_string()));
        if let Err(e) = state.gateway.logout().await {
            debug!(error = %e, "Upstream logout failed");
        }
        state.gateway.set_access_token(None);
    }

    if let Some(token) = get_cookie(&parts.headers, DEMO_COOKIE_NAME) {
        if let Err(e) = state.db.demo_sessions().delete(token).await {
            warn!(error = %e, "Failed to delete demo session");
        }
    }

    let clear_cookie = format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{}",
        DEMO_COOKIE_NAME,
        secure_suffix(state.secure_cookies)
    );

    (
        [(SET_COOKIE, clear_cookie)],
        Json(ApiResponse::message("Logged out")),
    )
}

async fn refresh(
    State(state): State<AuthRoutesState>,
    Json(req): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pair = state.gateway.refresh_tokens(&req.refresh_token).await?;
    Ok(Json(ApiResponse::ok("Token refreshed", pair)))
}

async fn me(RequireAuth(identity): RequireAuth) -> impl IntoResponse {
    Json(ApiResponse::ok("OK", identity.user))
}

async fn forgot_password(
    State(state): State<AuthRoutesState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.gateway.request_password_reset(&req).await?;
    Ok(Json(ApiResponse::message(
        "Password reset instructions sent",
    )))
}

/// Mint a demo session: a TTL-bounded server-side identity with a
/// generated display name and an empty wallet.
async fn create_demo_session(
    State(state): State<AuthRoutesState>,
) -> Result<impl IntoResponse, ApiError> {
    let token = Uuid::new_v4().to_string();
    let short = &token[..8];

    let profile = UserProfile {
        id: format!("demo-{}", short),
        fullname: names::generate_name(),
        email: format!("demo-{}@toolgate.local", short),
        phone: None,
        balance: 0,
        is_admin: false,
        created_at: None,
        updated_at: None,
    };

    let identity_json = serde_json::to_string(&profile)
        .map_err(|e| ApiError::db_error("Failed to encode demo identity", e))?;

    state
        .db
        .demo_sessions()
        .create(&token, &identity_json, state.demo_session_ttl_minutes)
        .await
        .db_err("Failed to create demo session")?;

    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        DEMO_COOKIE_NAME,
        token,
        state.demo_session_ttl_minutes * 60,
        secure_suffix(state.secure_cookies)
    );

    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::ok("Demo session created", profile)),
    ))
}

fn secure_suffix(secure: bool) -> &'static str {
    if secure { "; Secure" } else { "" }
}
