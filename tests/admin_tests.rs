//! /api/users admin endpoints.

mod common;

use common::*;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_admin_lists_users() {
    let ctx = setup().await;
    mock_me_success(&ctx.upstream, "AT-admin", admin_profile_json("admin@x.vn")).await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(header("authorization", "Bearer AT-admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([
            profile_json("a@b.com"),
            profile_json("c@d.com")
        ]))))
        .expect(1)
        .mount(&ctx.upstream)
        .await;

    let response = ctx
        .client
        .get(ctx.api("/users"))
        .bearer_auth("AT-admin")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_non_admin_is_forbidden() {
    let ctx = setup().await;
    mock_me_success(&ctx.upstream, "AT1", profile_json("a@b.com")).await;

    let response = ctx
        .client
        .get(ctx.api("/users"))
        .bearer_auth("AT1")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Admin access required");
}

#[tokio::test]
async fn test_unauthenticated_is_rejected() {
    let ctx = setup().await;

    let response = ctx.client.get(ctx.api("/users")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn test_admin_creates_user() {
    let ctx = setup().await;
    mock_me_success(&ctx.upstream, "AT-admin", admin_profile_json("admin@x.vn")).await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(serde_json::json!({
            "fullname": "New User",
            "email": "new@x.vn",
            "password": "secret1",
            "isAdmin": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "id": "u-9",
            "fullname": "New User",
            "email": "new@x.vn"
        }))))
        .expect(1)
        .mount(&ctx.upstream)
        .await;

    let response = ctx
        .client
        .post(ctx.api("/users"))
        .bearer_auth("AT-admin")
        .json(&serde_json::json!({
            "fullname": "New User",
            "email": "new@x.vn",
            "password": "secret1",
            "isAdmin": false
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["id"], "u-9");
}
