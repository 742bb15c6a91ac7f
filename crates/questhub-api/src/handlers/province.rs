//! Reference data.

use axum::Json;

use questhub_core::types::PROVINCES;

use crate::dto::response::ApiResponse;

/// GET /api/provinces
pub async fn list_provinces() -> Json<ApiResponse<&'static [&'static str]>> {
    Json(ApiResponse::ok(&PROVINCES[..]))
}
