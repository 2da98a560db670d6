//! Shared helpers for the API integration tests
//!
//! The app is built exactly as `main` builds it, over the in-memory store,
//! and driven in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use api::{repositories::memory::MemoryStore, revocation::RevocationList, state::AppState};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, Response, StatusCode, header},
};
use common::photo::encode_data_uri;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "fantamatto2025";
pub const TOKEN_SECRET: &str = "integration-test-secret-0123456789";

pub fn build_test_app() -> Router {
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        admin: api::admin_gate(ADMIN_PASSWORD, TOKEN_SECRET, 900, RevocationList::in_memory())
            .expect("admin gate"),
        max_photo_bytes: 64 * 1024,
    };
    api::build_app(state)
}

pub fn photo() -> String {
    encode_data_uri("image/jpeg", &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10])
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send and decode, asserting the status on the way
pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
    expected: StatusCode,
) -> Value {
    let response = send(app, method, uri, token, body).await;
    let status = response.status();
    let json = body_json(response).await;
    assert_eq!(status, expected, "unexpected status for {}: {}", uri, json);
    json
}

pub async fn register(app: &Router, username: &str, password: &str) -> Value {
    call(
        app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "username": username, "password": password })),
        StatusCode::CREATED,
    )
    .await
}

pub async fn upload(app: &Router, user: &Value, nickname: &str, rarity: &str) -> Value {
    call(
        app,
        Method::POST,
        "/api/matti",
        None,
        Some(json!({
            "user_id": user["id"],
            "username": user["username"],
            "photo_data": photo(),
            "nickname": nickname,
            "description": "",
            "rarity": rarity,
        })),
        StatusCode::CREATED,
    )
    .await
}

pub async fn admin_token(app: &Router) -> String {
    let json = call(
        app,
        Method::POST,
        "/api/admin/login",
        None,
        Some(json!({ "password": ADMIN_PASSWORD })),
        StatusCode::OK,
    )
    .await;
    json["access_token"].as_str().unwrap().to_string()
}
