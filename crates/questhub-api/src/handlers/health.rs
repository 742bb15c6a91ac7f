//! Health check handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::State;

use questhub_core::traits::cache::CacheProvider;

use crate::dto::response::{ApiResponse, ComponentHealth, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let started = Instant::now();
    let db_ok = state.db.health_check().await.unwrap_or(false);
    let database = ComponentHealth {
        healthy: db_ok,
        provider: "postgres".to_string(),
        latency_ms: started.elapsed().as_millis() as u64,
    };

    let started = Instant::now();
    let cache_ok = state.cache.health_check().await.unwrap_or(false);
    let cache = ComponentHealth {
        healthy: cache_ok,
        provider: state.config.cache.provider.clone(),
        latency_ms: started.elapsed().as_millis() as u64,
    };

    let started = Instant::now();
    let storage_ok = state.storage.health_check().await;
    let storage = ComponentHealth {
        healthy: storage_ok,
        provider: state.storage.provider_type().to_string(),
        latency_ms: started.elapsed().as_millis() as u64,
    };

    if !(db_ok && cache_ok && storage_ok) {
        tracing::warn!(
            database = db_ok,
            cache = cache_ok,
            storage = storage_ok,
            "Health check degraded"
        );
    }

    let status = if db_ok && cache_ok && storage_ok { "ok" } else { "degraded" };
    Json(ApiResponse::ok(DetailedHealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database,
        cache,
        storage,
    }))
}
