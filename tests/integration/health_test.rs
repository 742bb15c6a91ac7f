//! Integration tests for health and reference data endpoints.

mod helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health_reports_ok() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_provinces_list() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/provinces", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let provinces = response.body["data"]
        .as_array()
        .expect("provinces should be an array");
    assert_eq!(provinces.len(), 77);
    assert!(provinces.iter().any(|p| p == "Bangkok"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/does-not-exist", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
