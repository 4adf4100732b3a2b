//! End-to-end tests for `POST /webhook` against a stubbed Pushover API.

mod common;

use axum::http::StatusCode;
use common::{
    bearer, body_json, relay_router, relay_router_with_read_timeout, webhook_request,
    MESSAGES_PATH, RECONCILIATION_ALERT,
};
use std::time::Duration;
use tower::ServiceExt;
use wiremock::{
    matchers::{body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Mount a Pushover stub that must never be called.
async fn expect_no_pushover_call(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

/// Verify the full relay path when Pushover accepts the message
#[tokio::test]
async fn test_alert_is_delivered_to_pushover() {
    // Arrange
    let pushover = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("token=test_api_token"))
        .and(body_string_contains("user=test_user_key"))
        .and(body_string_contains("title=FluxCD"))
        .and(body_string_contains(
            "message=ReconciliationSucceeded+%5BINFO%5D%0AReconciliation+finished%0A%0A\
             Controller%3A+kustomize-controller%0AObject%3A+kustomization%2Fsecrets%0A\
             Revision%3A+main%40sha1%3Aabc%0A",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 1,
            "request": "5042853c-402d-4a18-abcb-168734a801de"
        })))
        .expect(1)
        .mount(&pushover)
        .await;

    let app = relay_router(&pushover);

    // Act
    let response = app
        .oneshot(webhook_request(Some(&bearer()), RECONCILIATION_ALERT))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"status": "ok"})
    );
}

/// Verify that an upstream rejection surfaces as 500 with the upstream body
#[tokio::test]
async fn test_upstream_rejection_returns_500_with_details() {
    // Arrange
    let pushover = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("rate limited"))
        .expect(1)
        .mount(&pushover)
        .await;

    let app = relay_router(&pushover);

    // Act
    let response = app
        .oneshot(webhook_request(Some(&bearer()), RECONCILIATION_ALERT))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"error": "Failed to send to Pushover", "details": "rate limited"})
    );
}

/// Verify that a slow upstream resolves to 500 instead of hanging the caller
#[tokio::test]
async fn test_upstream_timeout_returns_500() {
    // Arrange
    let pushover = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&pushover)
        .await;

    let app = relay_router_with_read_timeout(&pushover, Duration::from_millis(100));

    // Act
    let response = app
        .oneshot(webhook_request(Some(&bearer()), RECONCILIATION_ALERT))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to send to Pushover");
    assert!(body["details"].is_string());
}

/// Verify that an alert with no recognised fields is still relayed
#[tokio::test]
async fn test_sparse_alert_is_delivered_with_defaults() {
    // Arrange
    let pushover = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .and(body_string_contains(
            "message=Unknown+%5BINFO%5D%0ANo+Message%0A%0AController%3A+Unknown",
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&pushover)
        .await;

    let app = relay_router(&pushover);

    // Act
    let response = app
        .oneshot(webhook_request(Some(&bearer()), r#"{"test": "test"}"#))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
}

/// Verify that bad credentials never reach Pushover
#[tokio::test]
async fn test_bad_token_is_rejected_without_upstream_call() {
    // Arrange
    let pushover = MockServer::start().await;
    expect_no_pushover_call(&pushover).await;
    let app = relay_router(&pushover);

    // Act
    let response = app
        .oneshot(webhook_request(Some("Bearer bad_token"), r#"{"test": "test"}"#))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"error": "Unauthorized"})
    );
}

/// Verify that a missing Authorization header never reaches Pushover
#[tokio::test]
async fn test_missing_token_is_rejected_without_upstream_call() {
    // Arrange
    let pushover = MockServer::start().await;
    expect_no_pushover_call(&pushover).await;
    let app = relay_router(&pushover);

    // Act
    let response = app
        .oneshot(webhook_request(None, RECONCILIATION_ALERT))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Verify that invalid payloads never reach Pushover
#[tokio::test]
async fn test_invalid_json_is_rejected_without_upstream_call() {
    for body in ["this is not json", "{}", "null"] {
        // Arrange
        let pushover = MockServer::start().await;
        expect_no_pushover_call(&pushover).await;
        let app = relay_router(&pushover);

        // Act
        let response = app
            .oneshot(webhook_request(Some(&bearer()), body))
            .await
            .unwrap();

        // Assert
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "body {body:?} should be rejected"
        );
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "Invalid JSON"})
        );
    }
}
