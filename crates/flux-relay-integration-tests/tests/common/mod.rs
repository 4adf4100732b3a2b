//! Common test utilities for flux-relay integration tests
//!
//! This module provides:
//! - A router wired to a real [`PushoverClient`] pointed at a wiremock server
//! - Request builders for webhook calls
//! - Response body helpers

use axum::{
    body::{to_bytes, Body},
    http::Request,
    response::Response,
    Router,
};
use flux_relay_api::{create_router, AppState, ServerConfig};
use flux_relay_core::{Credentials, PushoverClient, PushoverClientConfig};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

pub const USER_KEY: &str = "test_user_key";
pub const API_TOKEN: &str = "test_api_token";
pub const MESSAGES_PATH: &str = "/1/messages.json";

/// The alert used by the end-to-end scenarios.
pub const RECONCILIATION_ALERT: &str = r#"{"severity":"info","message":"Reconciliation finished","reason":"ReconciliationSucceeded","reportingController":"kustomize-controller","metadata":{"revision":"main@sha1:abc"},"involvedObject":{"kind":"Kustomization","name":"secrets"}}"#;

/// Build a router whose Pushover client targets `pushover`.
#[allow(dead_code)]
pub fn relay_router(pushover: &MockServer) -> Router {
    relay_router_with_read_timeout(pushover, Duration::from_secs(10))
}

/// Build a router with a custom read timeout for the outbound call.
#[allow(dead_code)]
pub fn relay_router_with_read_timeout(pushover: &MockServer, read_timeout: Duration) -> Router {
    let credentials = Arc::new(Credentials::new(USER_KEY, API_TOKEN).unwrap());
    let client_config = PushoverClientConfig::default()
        .with_api_url(format!("{}{}", pushover.uri(), MESSAGES_PATH))
        .with_read_timeout(read_timeout);
    let notifier = Arc::new(PushoverClient::new(client_config, credentials.clone()).unwrap());

    create_router(
        AppState::new(credentials, notifier),
        &ServerConfig::default(),
    )
}

/// POST `/webhook` with an optional `Authorization` header.
#[allow(dead_code)]
pub fn webhook_request(authorization: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// The `Authorization` header value accepted by the test router.
#[allow(dead_code)]
pub fn bearer() -> String {
    format!("Bearer {}", API_TOKEN)
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
