//! Guard rejection responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Rejection from the authentication guards. Answers with the same
/// `{success, message}` envelope the proxied API uses.
#[derive(Debug)]
pub enum AuthError {
    AuthenticationRequired,
    AdminRequired,
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AuthError::AdminRequired => StatusCode::FORBIDDEN,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AuthError::AuthenticationRequired => "Authentication required",
            AuthError::AdminRequired => "Admin access required",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorEnvelope {
            success: bool,
            message: &'static str,
        }

        (
            self.status_code(),
            Json(ErrorEnvelope {
                success: false,
                message: self.message(),
            }),
        )
            .into_response()
    }
}
