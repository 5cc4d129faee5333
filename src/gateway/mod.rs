//! Typed HTTP client for the upstream accounts API.
//!
//! One client instance is shared by everything in the process. It owns the
//! single bearer slot: outgoing requests inject `Authorization: Bearer`
//! when a token is set, and any unauthorized response clears the slot
//! before the error propagates. The client never refreshes or retries on
//! its own; that policy lives in the session layer.

mod error;
mod types;

pub use error::{GENERIC_FAILURE, GatewayError, Result};
pub use types::{
    AuthPayload, ChangePasswordRequest, CreateUserRequest, CredentialPair, Envelope,
    ForgotPasswordRequest, LoginRequest, RefreshRequest, RegisterRequest, UpdateProfileRequest,
    UserProfile,
};

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Default timeout for upstream requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the upstream accounts API.
///
/// Cheap to clone; clones share the HTTP connection pool and the bearer
/// slot.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    /// Process-wide bearer slot. Writes are last-wins and unfenced against
    /// in-flight requests, which may complete with a superseded token.
    bearer: RwLock<Option<String>>,
}

impl GatewayClient {
    /// Create a new client builder.
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// The upstream base origin.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Replace the shared bearer credential used by all subsequent
    /// requests from this client (and its clones).
    pub fn set_access_token(&self, token: Option<String>) {
        *self
            .inner
            .bearer
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }

    /// The currently held bearer credential, if any.
    pub fn access_token(&self) -> Option<String> {
        self.inner
            .bearer
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Typed operations (one HTTP call each)
    // ─────────────────────────────────────────────────────────────────────

    /// POST /auth/login. On success the shared bearer is updated to the
    /// fresh access token.
    pub async fn login(&self, req: &LoginRequest) -> Result<AuthPayload> {
        if req.email.trim().is_empty() || req.password.is_empty() {
            return Err(GatewayError::Validation(
                "Email and password are required".into(),
            ));
        }

        let payload: AuthPayload = self.post("auth/login", req).await?;
        self.set_access_token(Some(payload.access_token.clone()));
        Ok(payload)
    }

    /// POST /auth/register. Same contract as [`login`](Self::login).
    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthPayload> {
        if req.fullname.trim().is_empty() || req.email.trim().is_empty() {
            return Err(GatewayError::Validation(
                "Name and email are required".into(),
            ));
        }
        if req.password.len() < 6 {
            return Err(GatewayError::Validation(
                "Password must be at least 6 characters".into(),
            ));
        }

        let payload: AuthPayload = self.post("auth/register", req).await?;
        self.set_access_token(Some(payload.access_token.clone()));
        Ok(payload)
    }

    /// GET /auth/me using the currently held bearer.
    pub async fn fetch_profile(&self) -> Result<UserProfile> {
        self.get("auth/me").await
    }

    /// PUT /auth/me.
    pub async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<UserProfile> {
        self.put("auth/me", req).await
    }

    /// PUT /auth/change-password.
    pub async fn change_password(&self, req: &ChangePasswordRequest) -> Result<()> {
        if req.new_password.len() < 6 {
            return Err(GatewayError::Validation(
                "Password must be at least 6 characters".into(),
            ));
        }
        self.send_empty(Method::PUT, "auth/change-password", Some(req))
            .await
    }

    /// POST /auth/forgot-password.
    pub async fn request_password_reset(&self, req: &ForgotPasswordRequest) -> Result<()> {
        if req.email.trim().is_empty() {
            return Err(GatewayError::Validation("Email is required".into()));
        }
        self.send_empty(Method::POST, "auth/forgot-password", Some(req))
            .await
    }

    /// POST /auth/refresh-tokens. On success the shared bearer is updated
    /// to the fresh access token; the caller owns persisting the pair.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<CredentialPair> {
        if refresh_token.is_empty() {
            return Err(GatewayError::Validation("No refresh token held".into()));
        }

        let req = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let pair: CredentialPair = self.post("auth/refresh-tokens", &req).await?;
        self.set_access_token(Some(pair.access_token.clone()));
        Ok(pair)
    }

    /// POST /auth/logout. Best-effort server-side invalidation; callers
    /// treat failure as non-fatal.
    pub async fn logout(&self) -> Result<()> {
        self.send_empty::<serde_json::Value>(Method::POST, "auth/logout", None)
            .await
    }

    /// GET /users (admin).
    pub async fn list_users(&self) -> Result<Vec<UserProfile>> {
        self.get("users").await
    }

    /// POST /users (admin).
    pub async fn create_user(&self, req: &CreateUserRequest) -> Result<UserProfile> {
        self.post("users", req).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // HTTP plumbing
    // ─────────────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| GatewayError::Validation(format!("Invalid request path: {}", e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send::<T, serde_json::Value>(Method::GET, path, None)
            .await
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, Some(body)).await
    }

    /// Issue a request and return the envelope's data field.
    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let envelope = self.dispatch::<T, B>(method, path, body).await?;
        envelope.data.ok_or_else(|| {
            GatewayError::Decode("Upstream response is missing its data field".into())
        })
    }

    /// Issue a request where the envelope carries no meaningful data.
    async fn send_empty<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.dispatch::<serde_json::Value, B>(method, path, body)
            .await
            .map(|_| ())
    }

    async fn dispatch<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let mut request = self
            .inner
            .http
            .request(method, url)
            .timeout(self.inner.timeout);

        // Outgoing hook: attach the bearer when one is held.
        if let Some(token) = self.access_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(classify_transport)?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<Envelope<T>> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            // Incoming hook: drop the locally held bearer. Refreshing is
            // the caller's responsibility.
            self.set_access_token(None);
            return Err(GatewayError::Unauthorized(extract_message(response).await));
        }

        if !status.is_success() {
            return Err(GatewayError::Upstream {
                status: Some(status.as_u16()),
                message: extract_message(response).await,
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(format!("Invalid upstream response: {}", e)))?;

        if !envelope.success {
            let message = if envelope.message.is_empty() {
                GENERIC_FAILURE.to_string()
            } else {
                envelope.message
            };
            return Err(GatewayError::Upstream {
                status: None,
                message,
            });
        }

        Ok(envelope)
    }
}

/// Pull the human-readable message out of a failed response body, falling
/// back to the HTTP status line when the body has none.
async fn extract_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<Envelope<serde_json::Value>>().await {
        Ok(envelope) if !envelope.message.is_empty() => envelope.message,
        _ => format!("HTTP {}", status.as_u16()),
    }
}

fn classify_transport(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout("Upstream request timed out".into())
    } else {
        GatewayError::Transport(e.to_string())
    }
}

/// Builder for [`GatewayClient`].
#[derive(Debug)]
pub struct GatewayBuilder {
    base_url: Option<String>,
    timeout: Duration,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the upstream base origin (required).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GatewayClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| GatewayError::Validation("base_url is required".into()))?;

        let mut base_url = Url::parse(&base_url)
            .map_err(|e| GatewayError::Validation(format!("Invalid base URL: {}", e)))?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("toolgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(GatewayClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                bearer: RwLock::new(None),
            }),
        })
    }
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
