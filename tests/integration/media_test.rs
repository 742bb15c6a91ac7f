//! Integration tests for signed media downloads.

mod helpers;

use axum::http::{StatusCode, header};
use chrono::{Duration, Utc};

const BASE_URL: &str = "http://questhub.test";

fn signed_path(app: &helpers::TestApp, key: &str, valid_for: Duration) -> String {
    let url = app
        .state
        .storage
        .signer()
        .sign(key, Utc::now() + valid_for)
        .expect("Failed to sign URL");
    url.strip_prefix(BASE_URL)
        .expect("Signed URL should use the public base URL")
        .to_string()
}

#[tokio::test]
async fn test_signed_download_streams_file() {
    let app = helpers::TestApp::new().await;
    let key = "submission/alice/proof.jpg";
    let path = app.media_dir.path().join(key);
    std::fs::create_dir_all(path.parent().expect("key has a parent")).expect("mkdir");
    std::fs::write(&path, b"jpeg-bytes").expect("write media");

    let response = app
        .request("GET", &signed_path(&app, key, Duration::minutes(5)), None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(response.bytes, b"jpeg-bytes");
}

#[tokio::test]
async fn test_expired_signature_forbidden() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "GET",
            &signed_path(&app, "shop/s1/front.png", Duration::minutes(-5)),
            None,
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some("AUTHORIZATION"));
}

#[tokio::test]
async fn test_tampered_key_forbidden() {
    let app = helpers::TestApp::new().await;
    let path = signed_path(&app, "shop/s1/front.png", Duration::minutes(5))
        .replace("front.png", "back.png");

    let response = app.request("GET", &path, None, None).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_signature_is_bad_request() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("GET", "/api/media/files/shop/s1/front.png", None, None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signed_but_missing_file_is_404() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "GET",
            &signed_path(&app, "avatar/nobody/gone.webp", Duration::minutes(5)),
            None,
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
