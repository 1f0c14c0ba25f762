//! Integration tests for the health and metrics endpoints.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use commandsvc_test_support::RecordingPublisher;

async fn app() -> axum::Router {
    common::build_test_app(
        common::memory_archive().await,
        Arc::new(RecordingPublisher::new()),
        common::fixed_clock(),
    )
    .await
}

#[tokio::test]
async fn test_health_returns_200_with_status_ok() {
    let (status, json) = common::get_json(app().await, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_metrics_expose_both_layers_after_a_request() {
    // Arrange
    let app = app().await;
    common::post_json(
        app.clone(),
        "/commands",
        &serde_json::json!({ "udid": "foobarbaz", "request_type": "SecurityInfo" }),
    )
    .await;

    // Act
    let (status, text) = common::get_text(app, "/metrics").await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("commandsvc_service_payloads_created_total{method=\"new_command\"} 1"));
    assert!(text.contains("commandsvc_endpoint_payloads_created_total{method=\"new_command\"} 1"));
    assert!(text.contains("commandsvc_service_duration_seconds"));
    assert!(text.contains("commandsvc_endpoint_duration_seconds"));
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = app().await;

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/v1/nonexistent")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_on_commands_returns_405() {
    let (status, _) = common::get_text(app().await, "/commands").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
