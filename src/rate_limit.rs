//! Rate limiting for authentication endpoints.
//!
//! Token bucket per client IP, applied to the endpoints that take
//! credentials or mint demo sessions.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use std::{num::NonZeroU32, sync::Arc};

use crate::auth::extract_client_ip;

/// Per-IP keyed limiter.
pub type IpLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Limiters for the credential-taking endpoints.
#[derive(Clone)]
pub struct RateLimitConfig {
    /// Login attempts: 10 per minute per IP.
    pub login: Arc<IpLimiter>,
    /// Registrations: 5 per minute per IP.
    pub register: Arc<IpLimiter>,
    /// Demo session creation: 5 per minute per IP.
    pub demo: Arc<IpLimiter>,
}

impl RateLimitConfig {
    pub fn new() -> Self {
        const LOGIN_PER_MIN: u32 = 10;
        const REGISTER_PER_MIN: u32 = 5;
        const DEMO_PER_MIN: u32 = 5;

        Self {
            login: Arc::new(RateLimiter::keyed(Quota::per_minute(
                NonZeroU32::new(LOGIN_PER_MIN).unwrap(),
            ))),
            register: Arc::new(RateLimiter::keyed(Quota::per_minute(
                NonZeroU32::new(REGISTER_PER_MIN).unwrap(),
            ))),
            demo: Arc::new(RateLimiter::keyed(Quota::per_minute(
                NonZeroU32::new(DEMO_PER_MIN).unwrap(),
            ))),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware for rate limiting login attempts.
pub async fn rate_limit_login(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    check(&config.login, request, next).await
}

/// Middleware for rate limiting registrations.
pub async fn rate_limit_register(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    check(&config.register, request, next).await
}

/// Middleware for rate limiting demo session creation.
pub async fn rate_limit_demo(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    check(&config.demo, request, next).await
}

async fn check(limiter: &IpLimiter, request: Request, next: Next) -> Response {
    let Some(ip) = extract_client_ip(request.headers(), request.extensions()) else {
        return envelope(StatusCode::FORBIDDEN, "Unable to determine client IP");
    };

    match limiter.check_key(&ip) {
        Ok(_) => next.run(request).await,
        Err(_) => envelope(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many attempts. Please wait before trying again",
        ),
    }
}

fn envelope(status: StatusCode, message: &'static str) -> Response {
    (
        status,
        Json(serde_json::json!({ "success": false, "message": message })),
    )
        .into_response()
}
