//! Rider self-service handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use questhub_entity::rider::Rider;

use crate::dto::request::{RiderApplyRequest, RiderUpdateRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/riders/apply
pub async fn apply(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<RiderApplyRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Rider>>)> {
    let rider = state.rider_service.apply(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(rider))))
}

/// GET /api/riders/me
pub async fn get_own(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Rider>>> {
    Ok(Json(ApiResponse::ok(state.rider_service.get_own(&auth).await?)))
}

/// PUT /api/riders/me
pub async fn update_own(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<RiderUpdateRequest>,
) -> ApiResult<Json<ApiResponse<Rider>>> {
    let rider = state.rider_service.update_own(&auth, req.into()).await?;
    Ok(Json(ApiResponse::ok(rider)))
}
