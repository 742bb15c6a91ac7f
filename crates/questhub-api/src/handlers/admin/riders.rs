//! Rider review.

use axum::Json;
use axum::extract::{Path, State};

use questhub_core::types::PageResponse;
use questhub_entity::rider::Rider;

use crate::dto::query::ReviewQuery;
use crate::dto::request::ReasonRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, PaginationParams, ValidatedJson, parse_uuid};
use crate::state::AppState;

/// GET /api/admin/riders
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ReviewQuery>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Rider>>>> {
    let riders = state
        .rider_service
        .list(&auth, query.into_rider_filter()?, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(riders)))
}

/// POST /api/admin/riders/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Rider>>> {
    let rider = state.rider_service.approve(&auth, parse_uuid(&id)?).await?;
    Ok(Json(ApiResponse::ok(rider)))
}

/// POST /api/admin/riders/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReasonRequest>,
) -> ApiResult<Json<ApiResponse<Rider>>> {
    let rider = state
        .rider_service
        .reject(&auth, parse_uuid(&id)?, &req.reason)
        .await?;
    Ok(Json(ApiResponse::ok(rider)))
}

/// POST /api/admin/riders/{id}/suspend
pub async fn suspend(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReasonRequest>,
) -> ApiResult<Json<ApiResponse<Rider>>> {
    let rider = state
        .rider_service
        .suspend(&auth, parse_uuid(&id)?, &req.reason)
        .await?;
    Ok(Json(ApiResponse::ok(rider)))
}
