//! Attraction review.

use axum::Json;
use axum::extract::{Path, State};

use questhub_core::types::PageResponse;
use questhub_entity::attraction::Attraction;

use crate::dto::query::AttractionQuery;
use crate::dto::request::ReasonRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, PaginationParams, ValidatedJson, parse_uuid};
use crate::state::AppState;

/// GET /api/admin/attractions
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<AttractionQuery>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Attraction>>>> {
    let attractions = state
        .attraction_service
        .list(&auth, query.into_filter()?, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(attractions)))
}

/// POST /api/admin/attractions/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Attraction>>> {
    let attraction = state
        .attraction_service
        .approve(&auth, parse_uuid(&id)?)
        .await?;
    Ok(Json(ApiResponse::ok(attraction)))
}

/// POST /api/admin/attractions/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReasonRequest>,
) -> ApiResult<Json<ApiResponse<Attraction>>> {
    let attraction = state
        .attraction_service
        .reject(&auth, parse_uuid(&id)?, &req.reason)
        .await?;
    Ok(Json(ApiResponse::ok(attraction)))
}
