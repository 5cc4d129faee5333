//! Identity types produced by the resolver chain.

use serde::{Deserialize, Serialize};

use crate::gateway::UserProfile;

/// Which strategy produced the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Bearer token verified against the upstream API.
    BearerToken,
    /// Server-side demo session record.
    DemoSession,
    /// OAuth-style claims attached by outer middleware.
    OauthClaims,
}

/// The caller's identity for one request. Never persisted across requests.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: UserProfile,
    pub source: IdentitySource,
    /// The bearer token the identity was resolved from, when there was one.
    /// Handlers forward it for upstream mutations on the caller's behalf.
    pub bearer: Option<String>,
}

impl Identity {
    /// True when this identity can mutate upstream account state, i.e. it
    /// carries the caller's own bearer token.
    pub fn can_mutate_upstream(&self) -> bool {
        self.bearer.is_some()
    }
}

/// Claims attached to the request by upstream session middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OauthClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl OauthClaims {
    /// Synthesize a minimal profile from the claims. Wallet and admin
    /// fields default to the least-privileged values.
    pub fn to_profile(&self) -> UserProfile {
        let email = self.email.clone().unwrap_or_default();
        UserProfile {
            id: self.sub.clone(),
            fullname: self.name.clone().unwrap_or_else(|| email.clone()),
            email,
            phone: None,
            balance: 0,
            is_admin: false,
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_claims_synthesize_least_privilege() {
        let claims = OauthClaims {
            sub: "oauth-1".into(),
            email: Some("x@y.vn".into()),
            name: None,
        };

        let profile = claims.to_profile();
        assert_eq!(profile.id, "oauth-1");
        assert_eq!(profile.fullname, "x@y.vn");
        assert!(!profile.is_admin);
        assert_eq!(profile.balance, 0);
    }
}
