//! Integration tests for authentication and role checks at the HTTP edge.

mod helpers;

use axum::http::StatusCode;
use questhub_entity::user::UserRole;

#[tokio::test]
async fn test_me_requires_token() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("AUTHENTICATION"));
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("GET", "/api/users/me", None, Some("not-a-jwt"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = helpers::TestApp::new().await;
    let (_, refresh) = app.token_pair(UserRole::User);

    let response = app
        .request("GET", "/api/users/me/points", None, Some(&refresh))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation_error() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "username": "ab",
                "email": "not-an-email",
                "password": "Str0ng-enough-passphrase",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("VALIDATION"));
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "password": "missing-login" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("VALIDATION"));
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_users() {
    let app = helpers::TestApp::new().await;
    let token = app.access_token(UserRole::User);

    let response = app
        .request("GET", "/api/admin/users", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some("AUTHORIZATION"));
}

#[tokio::test]
async fn test_partner_cannot_review_partners() {
    let app = helpers::TestApp::new().await;
    let token = app.access_token(UserRole::Partner);

    let response = app
        .request("GET", "/api/admin/partners", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_province_filter_rejected() {
    let app = helpers::TestApp::new().await;
    let token = app.access_token(UserRole::Admin);

    let response = app
        .request(
            "GET",
            "/api/admin/partners?province=Atlantis",
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("VALIDATION"));
}
