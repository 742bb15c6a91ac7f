//! Integration tests for per-IP rate limiting.

mod helpers;

use axum::http::{StatusCode, header};

#[tokio::test]
async fn test_strict_budget_on_auth_routes() {
    let app = helpers::TestApp::new().await;
    let limit = app.state.config.rate_limit.strict_limit;
    let body = serde_json::json!({ "login": "ghost", "password": "" });

    for _ in 0..limit {
        let response = app
            .request("POST", "/api/auth/login", Some(body.clone()), None)
            .await;
        assert_ne!(response.status, StatusCode::TOO_MANY_REQUESTS);
    }

    let response = app
        .request("POST", "/api/auth/login", Some(body), None)
        .await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.error_code(), Some("RATE_LIMIT"));
    let retry_after: u64 = response.headers[header::RETRY_AFTER]
        .to_str()
        .expect("ascii header")
        .parse()
        .expect("numeric Retry-After");
    assert!(retry_after >= 1);
}

#[tokio::test]
async fn test_strict_budget_does_not_block_other_routes() {
    let app = helpers::TestApp::new().await;
    let limit = app.state.config.rate_limit.strict_limit;

    for _ in 0..=limit {
        app.request("GET", "/api/auth/me", None, None).await;
    }

    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
}
