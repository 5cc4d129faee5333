//! The ordered identity resolution chain.

use axum::http::{header, request::Parts};
use tracing::{debug, warn};

use super::cookie::{DEMO_COOKIE_NAME, get_cookie};
use super::state::HasAuthBackend;
use super::types::{Identity, IdentitySource, OauthClaims};
use crate::gateway::UserProfile;

/// Resolve the caller's identity for this request.
///
/// Strategies run in order and short-circuit on the first hit:
/// bearer token, demo session, OAuth claims. Returns `None` when none of
/// them produce an identity.
pub async fn resolve_identity<S>(parts: &Parts, state: &S) -> Option<Identity>
where
    S: HasAuthBackend + Send + Sync,
{
    if let Some(identity) = resolve_bearer(parts, state).await {
        return Some(identity);
    }
    if let Some(identity) = resolve_demo_session(parts, state).await {
        return Some(identity);
    }
    resolve_oauth_claims(parts)
}

/// Strategy 1: verify an Authorization bearer token against the upstream.
///
/// On success the token is left set on the gateway so handler code in the
/// same request path can issue upstream calls as the caller. On failure
/// the gateway's slot is cleared and the request degrades silently to the
/// next strategy.
async fn resolve_bearer<S>(parts: &Parts, state: &S) -> Option<Identity>
where
    S: HasAuthBackend + Send + Sync,
{
    let token = bearer_token(&parts.headers)?;

    let gateway = state.gateway();
    gateway.set_access_token(Some(token.to_string()));

    match gateway.fetch_profile().await {
        Ok(user) => Some(Identity {
            user,
            source: IdentitySource::BearerToken,
            bearer: Some(token.to_string()),
        }),
        Err(e) => {
            debug!(error = %e, "Bearer token rejected; trying weaker strategies");
            // An unauthorized response already cleared the slot; clear it
            // here too for transport-level failures.
            gateway.set_access_token(None);
            None
        }
    }
}

/// Strategy 2: look up a demo session record from its cookie.
async fn resolve_demo_session<S>(parts: &Parts, state: &S) -> Option<Identity>
where
    S: HasAuthBackend + Send + Sync,
{
    let token = get_cookie(&parts.headers, DEMO_COOKIE_NAME)?;

    let session = match state.db().demo_sessions().get_active(token).await {
        Ok(session) => session?,
        Err(e) => {
            warn!(error = %e, "Failed to look up demo session");
            return None;
        }
    };

    let user: UserProfile = match serde_json::from_str(&session.identity_json) {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "Demo session holds an unreadable identity");
            return None;
        }
    };

    Some(Identity {
        user,
        source: IdentitySource::DemoSession,
        bearer: None,
    })
}

/// Strategy 3: claims attached to the request by outer middleware.
fn resolve_oauth_claims(parts: &Parts) -> Option<Identity> {
    let claims = parts.extensions.get::<OauthClaims>()?;
    Some(Identity {
        user: claims.to_profile(),
        source: IdentitySource::OauthClaims,
        bearer: None,
    })
}

/// Pull the token out of an `Authorization: Bearer` header.
pub(crate) fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def"),
        );
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[test]
    fn test_non_bearer_scheme_ignored() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(bearer_token(&headers), None);
    }
}
