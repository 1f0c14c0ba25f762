//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use tower::ServiceExt;

use commandsvc_api::endpoint::{self, CommandEndpoint};
use commandsvc_api::routes;
use commandsvc_api::state::AppState;
use commandsvc_archive::SqliteArchive;
use commandsvc_core::archive::ARCHIVE_NAMESPACE;
use commandsvc_core::clock::Clock;
use commandsvc_core::publisher::Publisher;
use commandsvc_service::{ArchivingCommandService, middleware};
use commandsvc_test_support::FixedClock;

/// Fixed timestamp used across the integration tests.
pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// A private in-memory archive.
pub async fn memory_archive() -> Arc<SqliteArchive> {
    Arc::new(SqliteArchive::in_memory(ARCHIVE_NAMESPACE).await.unwrap())
}

/// Build the full app router over `archive` and `publisher`, with both
/// middleware chains in place. Uses the same wiring as `main.rs`.
pub async fn build_test_app(
    archive: Arc<SqliteArchive>,
    publisher: Arc<dyn Publisher>,
    clock: Arc<dyn Clock>,
) -> Router {
    let recorder = PrometheusBuilder::new().build_recorder();
    let metrics = recorder.handle();

    let service = ArchivingCommandService::new(archive, publisher, clock)
        .await
        .unwrap();
    let endpoint = metrics::with_local_recorder(&recorder, || {
        let service = middleware::with_middleware(service);
        endpoint::with_middleware(CommandEndpoint::new(Arc::new(service)))
    });

    routes::router().with_state(AppState::new(Arc::new(endpoint), metrics))
}

/// Send a POST request with a raw body and return the response.
pub async fn post_raw(
    app: Router,
    uri: &str,
    body: impl Into<Body>,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_raw(app, uri, serde_json::to_vec(body).unwrap()).await
}

/// Send a GET request and return the status and body text.
pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, String::from_utf8(body_bytes.to_vec()).unwrap())
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, text) = get_text(app, uri).await;
    (status, serde_json::from_str(&text).unwrap())
}
