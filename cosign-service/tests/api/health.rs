use super::{call, registered_account, send, test_app, wallets};
use axum::body::Body;
use axum::http::{Request, StatusCode};

#[tokio::test]
async fn health_and_ready_report_ok() {
    let app = test_app(None);

    let health = call(&app, "GET", "/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "healthy");

    let ready = call(&app, "GET", "/ready", None).await;
    assert_eq!(ready.status, StatusCode::OK);
    assert_eq!(ready.body["status"], "ready");
    assert_eq!(ready.body["storageOk"], true);
}

#[tokio::test]
async fn request_id_is_echoed_or_minted() {
    let app = test_app(None);

    let tagged = Request::builder().method("GET").uri("/health").header("x-request-id", "req-123").body(Body::empty()).expect("request");
    let response = send(&app.router, tagged).await;
    assert_eq!(response.headers.get("x-request-id").and_then(|v| v.to_str().ok()), Some("req-123"));

    let untagged = call(&app, "GET", "/health", None).await;
    let minted = untagged.headers.get("x-request-id").and_then(|v| v.to_str().ok()).expect("minted id");
    assert!(!minted.is_empty());
}

#[tokio::test]
async fn metrics_count_requests_and_lifecycle_events() {
    let app = test_app(None);
    let owners = wallets(2);
    registered_account(&app, &owners, 2).await;
    call(&app, "GET", "/multisig-accounts/unknown", None).await;

    let metrics = call(&app, "GET", "/metrics", None).await;
    assert_eq!(metrics.status, StatusCode::OK);
    assert!(metrics.headers.get("content-type").and_then(|v| v.to_str().ok()).is_some_and(|v| v.starts_with("text/plain")));
    assert!(metrics.text.contains("cosign_api_requests_total"));
    assert!(metrics.text.contains("route=\"/multisig-accounts\""));
    assert!(metrics.text.contains("cosign_accounts_total"));

    let snapshot = app.metrics.snapshot();
    assert!(snapshot.api_ok >= 5);
    assert!(snapshot.api_error >= 1);
}
