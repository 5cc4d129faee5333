//! Axum extractors for the route guards.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::errors::AuthError;
use super::resolver::resolve_identity;
use super::state::HasAuthBackend;
use super::types::Identity;

/// Guard for protected routes. Rejects with an authentication-required
/// failure when no strategy resolves an identity.
pub struct RequireAuth(pub Identity);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        resolve_identity(parts, state)
            .await
            .map(RequireAuth)
            .ok_or(AuthError::AuthenticationRequired)
    }
}

/// Optional identity - never fails, for routes that work both ways.
pub struct MaybeAuth(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeAuth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuth(resolve_identity(parts, state).await))
    }
}

/// Guard for admin routes: a resolved identity whose profile carries the
/// admin flag.
pub struct RequireAdmin(pub Identity);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(identity) = RequireAuth::from_request_parts(parts, state).await?;
        if !identity.user.is_admin {
            return Err(AuthError::AdminRequired);
        }
        Ok(RequireAdmin(identity))
    }
}
