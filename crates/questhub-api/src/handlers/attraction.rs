//! Tourist attraction handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use questhub_core::types::PageResponse;
use questhub_entity::attraction::Attraction;

use crate::dto::query::AttractionQuery;
use crate::dto::request::{CreateAttractionRequest, UpdateAttractionRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{
    ApiQuery, AuthUser, MaybeAuthUser, PaginationParams, ValidatedJson, parse_uuid,
};
use crate::state::AppState;

/// GET /api/attractions
pub async fn list_public(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AttractionQuery>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Attraction>>>> {
    let attractions = state
        .attraction_service
        .list_public(query.into_filter()?, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(attractions)))
}

/// POST /api/attractions
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateAttractionRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Attraction>>)> {
    let attraction = state.attraction_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(attraction))))
}

/// GET /api/attractions/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Attraction>>> {
    let attraction = state
        .attraction_service
        .get(auth.ctx(), parse_uuid(&id)?)
        .await?;
    Ok(Json(ApiResponse::ok(attraction)))
}

/// PUT /api/attractions/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateAttractionRequest>,
) -> ApiResult<Json<ApiResponse<Attraction>>> {
    let attraction = state
        .attraction_service
        .update(&auth, parse_uuid(&id)?, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(attraction)))
}

/// DELETE /api/attractions/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state
        .attraction_service
        .delete(&auth, parse_uuid(&id)?)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Attraction deleted"))))
}
