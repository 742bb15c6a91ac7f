//! Shared test helpers for integration tests.
//!
//! The app runs on the memory cache, a temporary local media root and a lazy
//! database pool, so only routes that answer before touching PostgreSQL are
//! exercised here.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use questhub_api::{AppState, build_router};
use questhub_auth::{FacebookVerifier, JwtEncoder, SocialTokenVerifier};
use questhub_cache::CacheManager;
use questhub_core::config::AppConfig;
use questhub_database::DatabasePool;
use questhub_entity::user::UserRole;
use questhub_storage::StorageManager;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for signing URLs and minting tokens
    pub state: AppState,
    /// Local media root, removed on drop
    pub media_dir: TempDir,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let mut config = AppConfig::load_from("tests/fixtures", "test")
            .expect("Failed to load test config");
        let media_dir = tempfile::tempdir().expect("Failed to create media dir");
        config.storage.data_root = media_dir.path().to_string_lossy().into_owned();

        let db = DatabasePool::connect_lazy(&config.database).expect("Invalid database URL");
        let cache = CacheManager::new(&config.cache)
            .await
            .expect("Failed to init cache");
        let storage = Arc::new(
            StorageManager::from_config(&config.storage)
                .await
                .expect("Failed to init storage"),
        );
        let social: Arc<dyn SocialTokenVerifier> = Arc::new(
            FacebookVerifier::new(&config.facebook).expect("Failed to build Facebook verifier"),
        );

        let state = AppState::with_providers(config, db, cache, storage, social);
        let router = build_router(state.clone());

        Self {
            router,
            state,
            media_dir,
        }
    }

    /// Mint an access token without touching the database.
    pub fn access_token(&self, role: UserRole) -> String {
        self.token_pair(role).0
    }

    /// Mint an (access, refresh) pair for a made-up user.
    pub fn token_pair(&self, role: UserRole) -> (String, String) {
        let encoder = JwtEncoder::new(&self.state.config.auth);
        let pair = encoder
            .generate_token_pair(Uuid::new_v4(), role, "tester")
            .expect("Failed to sign token");
        (pair.access_token, pair.refresh_token)
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);

        if body.is_some() {
            req = req.header("Content-Type", "application/json");
        }
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let body = body
            .map(|b| Body::from(serde_json::to_vec(&b).expect("Failed to serialize body")))
            .unwrap_or_else(Body::empty);
        let req = req.body(body).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            bytes: bytes.to_vec(),
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` when the body is not JSON
    pub body: Value,
    /// Raw body
    pub bytes: Vec<u8>,
}

impl TestResponse {
    /// The `error` code of an error body.
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}
