#![allow(dead_code)]

use std::time::Duration;

use toolgate::db::Database;
use toolgate::gateway::GatewayClient;
use toolgate::session::SessionManager;
use toolgate::{ServerConfig, start_server};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestContext {
    /// Local server origin, e.g. "http://127.0.0.1:43521".
    pub base_url: String,
    /// Stub upstream accounts API.
    pub upstream: MockServer,
    pub db: Database,
    pub client: reqwest::Client,
    server_handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

impl TestContext {
    /// Absolute URL for a local API path.
    pub fn api(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Create a demo session and return its cookie value.
    pub async fn demo_cookie(&self) -> String {
        let response = self
            .client
            .post(self.api("/auth/demo"))
            .send()
            .await
            .expect("demo request failed");
        assert_eq!(response.status().as_u16(), 201);

        let set_cookie = response
            .headers()
            .get("set-cookie")
            .expect("demo response sets a cookie")
            .to_str()
            .unwrap();
        let token = set_cookie
            .split(';')
            .next()
            .unwrap()
            .strip_prefix("demo_session=")
            .expect("demo cookie name");
        format!("demo_session={}", token)
    }
}

/// Boot the server on a random port against a fresh stub upstream and an
/// in-memory database.
pub async fn setup() -> TestContext {
    let upstream = MockServer::start().await;
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");

    let config = test_config(&upstream, db.clone());
    let (server_handle, addr) = start_server(config, 0).await;

    TestContext {
        base_url: format!("http://{}", addr),
        upstream,
        db,
        client: reqwest::Client::new(),
        server_handle,
    }
}

/// Like [`setup`], but with OAuth-style claims attached to every request,
/// standing in for the outer session middleware.
pub async fn setup_with_oauth_claims(claims: toolgate::auth::OauthClaims) -> TestContext {
    let upstream = MockServer::start().await;
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");

    let config = test_config(&upstream, db.clone());
    let app = toolgate::create_app(&config).layer(axum::Extension(claims));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local address");

    let server_handle = tokio::spawn(async move {
        let make_service = app.into_make_service_with_connect_info::<std::net::SocketAddr>();
        axum::serve(listener, make_service).await.ok();
    });

    TestContext {
        base_url: format!("http://{}", addr),
        upstream,
        db,
        client: reqwest::Client::new(),
        server_handle,
    }
}

pub fn test_config(upstream: &MockServer, db: Database) -> ServerConfig {
    ServerConfig {
        db,
        upstream_url: Url::parse(&upstream.uri()).expect("Invalid upstream URL"),
        request_timeout: Duration::from_secs(2),
        secure_cookies: false,
        demo_session_ttl_minutes: 30,
    }
}

/// A gateway client pointed at the stub upstream.
pub fn test_gateway(upstream: &MockServer) -> GatewayClient {
    GatewayClient::builder()
        .base_url(upstream.uri())
        .timeout(Duration::from_secs(2))
        .build()
        .expect("Failed to build gateway client")
}

/// A session manager with its own in-memory cache, pointed at the stub
/// upstream. Returns the database so tests can inspect the cache.
pub async fn test_session(upstream: &MockServer) -> (SessionManager, Database) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let manager = SessionManager::new(test_gateway(upstream), db.session_cache());
    (manager, db)
}

// ─────────────────────────────────────────────────────────────────────────
// Upstream stubs
// ─────────────────────────────────────────────────────────────────────────

pub fn envelope(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "success": true, "message": "OK", "data": data })
}

pub fn business_failure(message: &str) -> serde_json::Value {
    serde_json::json!({ "success": false, "message": message })
}

pub fn profile_json(email: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "u-1",
        "fullname": "Nguyễn Văn A",
        "email": email,
        "balance": 50000,
        "isAdmin": false
    })
}

pub fn admin_profile_json(email: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "u-admin",
        "fullname": "Quản trị viên",
        "email": email,
        "balance": 0,
        "isAdmin": true
    })
}

pub fn auth_payload(access: &str, refresh: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "accessToken": access,
        "refreshToken": refresh,
        "user": { "id": "1", "fullname": "A B", "email": email }
    })
}

/// Stub POST /auth/login to succeed with the given tokens and user email.
pub async fn mock_login_success(upstream: &MockServer, access: &str, refresh: &str, email: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(auth_payload(access, refresh, email))),
        )
        .mount(upstream)
        .await;
}

/// Stub GET /auth/me to succeed for the given bearer token.
pub async fn mock_me_success(upstream: &MockServer, token: &str, profile: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(profile)))
        .mount(upstream)
        .await;
}

/// Stub GET /auth/me to reject every bearer.
pub async fn mock_me_unauthorized(upstream: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(business_failure("Token expired")))
        .mount(upstream)
        .await;
}

/// Stub POST /auth/refresh-tokens to return a fresh pair.
pub async fn mock_refresh_success(upstream: &MockServer, access: &str, refresh: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh-tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "accessToken": access,
            "refreshToken": refresh
        }))))
        .mount(upstream)
        .await;
}

/// Matcher: the request carries no Authorization header at all.
pub struct NoAuthHeader;

impl wiremock::Match for NoAuthHeader {
    fn matches(&self, request: &wiremock::Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}
