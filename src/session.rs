//! Session bootstrap: the authentication state machine.
//!
//! A [`SessionManager`] composes the gateway client with the durable
//! session cache. It is constructed explicitly and passed to whoever
//! needs it; there is no global instance. `is_authenticated` is derived,
//! never stored: the credential pair and the profile are set and cleared
//! together, and a tokens-only state (mid-refresh) is never reported as
//! authenticated.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::db::SessionCacheStore;
use crate::gateway::{
    ChangePasswordRequest, CredentialPair, ForgotPasswordRequest, GatewayClient, GatewayError,
    LoginRequest, RegisterRequest, Result, UpdateProfileRequest, UserProfile,
};

/// Snapshot of the session state.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub tokens: Option<CredentialPair>,
    pub user: Option<UserProfile>,
    /// True until the startup sequence has run to completion.
    pub is_loading: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_some() && self.user.is_some()
    }
}

/// Process-wide authentication state built on the gateway client and the
/// session cache.
pub struct SessionManager {
    gateway: GatewayClient,
    cache: SessionCacheStore,
    state: RwLock<SessionState>,
    initialized: AtomicBool,
}

impl SessionManager {
    pub fn new(gateway: GatewayClient, cache: SessionCacheStore) -> Self {
        Self {
            gateway,
            cache,
            state: RwLock::new(SessionState {
                tokens: None,
                user: None,
                is_loading: true,
            }),
            initialized: AtomicBool::new(false),
        }
    }

    /// Snapshot the current state.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.state.read().await.user.clone()
    }

    /// Startup sequence. Runs at most once per manager; the terminal
    /// `is_loading = false` transition always happens, whichever branch
    /// was taken.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        // Optimistic hydration from durable storage.
        let tokens = self.cache.load_credentials().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read stored credentials");
            None
        });
        let user = self.cache.load_profile().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read stored profile");
            None
        });

        {
            let mut state = self.state.write().await;
            state.tokens = tokens.clone();
            state.user = user.clone();
        }

        match (tokens, user) {
            (Some(pair), Some(_)) => {
                // Validate the stored access token by fetching the profile.
                self.gateway
                    .set_access_token(Some(pair.access_token.clone()));

                match self.gateway.fetch_profile().await {
                    Ok(profile) => self.store_profile(profile).await,
                    Err(e) if e.is_unauthorized() && !pair.refresh_token.is_empty() => {
                        // Refresh failure already cascades into logout.
                        if self.refresh_tokens().await.is_ok()
                            && self.refresh_profile().await.is_err()
                        {
                            self.logout().await;
                        }
                    }
                    Err(e) => {
                        debug!(error = %e, "Stored session rejected on startup");
                        self.logout().await;
                    }
                }
            }
            (None, None) => {}
            _ => {
                // One without the other means the cache is damaged.
                self.clear_local().await;
            }
        }

        self.state.write().await.is_loading = false;
    }

    /// Authenticate and persist the returned pair + profile. On failure
    /// the state is left untouched and the error surfaces to the caller.
    pub async fn login(&self, req: &LoginRequest) -> Result<UserProfile> {
        let payload = self.gateway.login(req).await?;
        self.store_auth(payload.credentials(), payload.user.clone())
            .await;
        Ok(payload.user)
    }

    /// Same contract as [`login`](Self::login), against the registration
    /// endpoint.
    pub async fn register(&self, req: &RegisterRequest) -> Result<UserProfile> {
        let payload = self.gateway.register(req).await?;
        self.store_auth(payload.credentials(), payload.user.clone())
            .await;
        Ok(payload.user)
    }

    /// End the session. The server-side call is best-effort; local state
    /// is cleared unconditionally and this never fails.
    pub async fn logout(&self) {
        if let Err(e) = self.gateway.logout().await {
            debug!(error = %e, "Server-side logout failed; clearing locally anyway");
        }
        self.clear_local().await;
    }

    /// Exchange the held refresh token for a fresh credential pair.
    ///
    /// Fails immediately, without any network call, when no refresh token
    /// is held. On upstream failure the whole session is torn down via
    /// [`logout`](Self::logout) before the error is returned. The profile
    /// is not touched here; call [`refresh_profile`](Self::refresh_profile)
    /// afterwards.
    pub async fn refresh_tokens(&self) -> Result<()> {
        let refresh_token = self
            .state
            .read()
            .await
            .tokens
            .as_ref()
            .map(|pair| pair.refresh_token.clone())
            .filter(|token| !token.is_empty());

        let Some(refresh_token) = refresh_token else {
            return Err(GatewayError::Validation("No refresh token held".into()));
        };

        match self.gateway.refresh_tokens(&refresh_token).await {
            Ok(pair) => {
                if let Err(e) = self.cache.save_credentials(&pair).await {
                    warn!(error = %e, "Failed to persist refreshed credentials");
                }
                self.state.write().await.tokens = Some(pair);
                Ok(())
            }
            Err(e) => {
                self.logout().await;
                Err(e)
            }
        }
    }

    /// Re-fetch the profile with the current access token and replace the
    /// cached copy.
    pub async fn refresh_profile(&self) -> Result<UserProfile> {
        let profile = self.gateway.fetch_profile().await?;
        self.store_profile(profile.clone()).await;
        Ok(profile)
    }

    /// Update the profile upstream and replace the cached copy on success.
    pub async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<UserProfile> {
        let profile = self.gateway.update_profile(req).await?;
        self.store_profile(profile.clone()).await;
        Ok(profile)
    }

    pub async fn change_password(&self, req: &ChangePasswordRequest) -> Result<()> {
        self.gateway.change_password(req).await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        self.gateway
            .request_password_reset(&ForgotPasswordRequest {
                email: email.to_string(),
            })
            .await
    }

    async fn store_auth(&self, pair: CredentialPair, user: UserProfile) {
        if let Err(e) = self.cache.save_credentials(&pair).await {
            warn!(error = %e, "Failed to persist credentials");
        }
        if let Err(e) = self.cache.save_profile(&user).await {
            warn!(error = %e, "Failed to persist profile");
        }

        let mut state = self.state.write().await;
        state.tokens = Some(pair);
        state.user = Some(user);
    }

    async fn store_profile(&self, user: UserProfile) {
        if let Err(e) = self.cache.save_profile(&user).await {
            warn!(error = %e, "Failed to persist profile");
        }
        self.state.write().await.user = Some(user);
    }

    async fn clear_local(&self) {
        self.gateway.set_access_token(None);
        if let Err(e) = self.cache.clear().await {
            warn!(error = %e, "Failed to clear session cache");
        }

        let mut state = self.state.write().await;
        state.tokens = None;
        state.user = None;
    }
}
