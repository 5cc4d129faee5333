//! Gateway client behavior against a stub upstream.

mod common;

use std::time::Duration;

use common::*;
use toolgate::gateway::{GatewayClient, GatewayError, LoginRequest};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_sets_bearer_used_by_later_calls() {
    let upstream = MockServer::start().await;
    mock_login_success(&upstream, "AT1", "RT1", "a@b.com").await;
    mock_me_success(&upstream, "AT1", profile_json("a@b.com")).await;

    let gateway = test_gateway(&upstream);
    let payload = gateway
        .login(&LoginRequest {
            email: "a@b.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap();

    assert_eq!(payload.access_token, "AT1");
    assert_eq!(gateway.access_token().as_deref(), Some("AT1"));

    // The profile fetch only matches when "Bearer AT1" is attached.
    let profile = gateway.fetch_profile().await.unwrap();
    assert_eq!(profile.email, "a@b.com");
}

#[tokio::test]
async fn test_unauthorized_clears_bearer_and_next_call_is_anonymous() {
    let upstream = MockServer::start().await;
    mock_me_unauthorized(&upstream).await;

    // After the 401 the next request must carry no Authorization header.
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(NoAuthHeader)
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([]))))
        .expect(1)
        .mount(&upstream)
        .await;

    let gateway = test_gateway(&upstream);
    gateway.set_access_token(Some("stale-token".into()));

    let err = gateway.fetch_profile().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Token expired");
    assert!(gateway.access_token().is_none());

    gateway.list_users().await.unwrap();
}

#[tokio::test]
async fn test_business_failure_surfaces_upstream_message() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(business_failure("Sai mật khẩu")),
        )
        .mount(&upstream)
        .await;

    let gateway = test_gateway(&upstream);
    let err = gateway
        .login(&LoginRequest {
            email: "a@b.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Sai mật khẩu");
    // A failed login must not install a bearer.
    assert!(gateway.access_token().is_none());
}

#[tokio::test]
async fn test_http_error_without_payload_message_falls_back() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&upstream)
        .await;

    let gateway = test_gateway(&upstream);
    let err = gateway
        .login(&LoginRequest {
            email: "a@b.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap_err();

    match err {
        GatewayError::Upstream { status, message } => {
            assert_eq!(status, Some(500));
            assert_eq!(message, "HTTP 500");
        }
        other => panic!("expected upstream error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(profile_json("a@b.com")))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&upstream)
        .await;

    let gateway = GatewayClient::builder()
        .base_url(upstream.uri())
        .timeout(Duration::from_millis(250))
        .build()
        .unwrap();

    let err = gateway.fetch_profile().await.unwrap_err();
    assert!(matches!(err, GatewayError::Timeout(_)));
}

#[tokio::test]
async fn test_validation_failure_sends_nothing() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let gateway = test_gateway(&upstream);
    let err = gateway
        .login(&LoginRequest {
            email: "  ".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Validation(_)));
}

#[tokio::test]
async fn test_refresh_sends_token_and_updates_bearer() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-tokens"))
        .and(body_json(serde_json::json!({ "refreshToken": "RT1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "accessToken": "AT2",
            "refreshToken": "RT2"
        }))))
        .expect(1)
        .mount(&upstream)
        .await;

    let gateway = test_gateway(&upstream);
    let pair = gateway.refresh_tokens("RT1").await.unwrap();

    assert_eq!(pair.access_token, "AT2");
    assert_eq!(pair.refresh_token, "RT2");
    assert_eq!(gateway.access_token().as_deref(), Some("AT2"));
}

#[tokio::test]
async fn test_missing_data_field_is_a_decode_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "success": true, "message": "OK" })),
        )
        .mount(&upstream)
        .await;

    let gateway = test_gateway(&upstream);
    let err = gateway.fetch_profile().await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}
