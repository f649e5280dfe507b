//! Shared helpers for the HTTP tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use serde_json::Value;

use triage_api::config::ApiConfig;
use triage_api::{AppState, router};
use triage_core::auth::token::{TokenKind, TokenSecrets, generate_token};
use triage_core::models::{Role, User};
use triage_core::store::{MemoryStore, UserStore};

pub fn test_secrets() -> TokenSecrets {
    TokenSecrets {
        access: "http-test-access-secret".to_string(),
        refresh: "http-test-refresh-secret".to_string(),
    }
}

/// Router over a fresh in-memory store; the store is returned for seeding
/// and inspection.
pub fn test_app() -> (Router, MemoryStore) {
    let store = MemoryStore::default();
    let app = app_with_store(store.clone());
    (app, store)
}

pub fn app_with_store(store: MemoryStore) -> Router {
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        database_url: String::new(),
        environment: "development".to_string(),
        origin: "*".to_string(),
        credentials: false,
        secrets: test_secrets(),
    };
    router(AppState {
        store: Arc::new(store),
        config,
    })
}

/// Create a user directly in the store and mint an access token for it.
/// Bypasses signup so tests can pick roles.
pub async fn seed_user(store: &MemoryStore, email: &str, role: Role) -> (User, String) {
    let user = store.create_user(email, "not-a-real-hash", role).await.unwrap();
    let token = generate_token(TokenKind::Access, &user.id, &test_secrets()).unwrap();
    (user, token)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Request with a bearer access token and an optional JSON body.
pub fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json");
    match body {
        Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// The full `Set-Cookie` header for the refresh cookie, if the response set
/// one.
pub fn refresh_set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("refreshToken="))
        .map(|value| value.to_string())
}

/// Just the refresh token value from the response's `Set-Cookie` header.
pub fn refresh_cookie_value(response: &Response<Body>) -> Option<String> {
    let header = refresh_set_cookie(response)?;
    let pair = header.split(';').next()?;
    pair.strip_prefix("refreshToken=").map(|value| value.to_string())
}
