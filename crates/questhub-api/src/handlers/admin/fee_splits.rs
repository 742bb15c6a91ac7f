//! Commission bookkeeping.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use questhub_core::types::PageResponse;
use questhub_entity::fee_split::{FeeSplitSummary, ShopFeeSplitRecord};

use crate::dto::query::FeeSplitQuery;
use crate::dto::request::RecordFeeSplitRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/admin/fee-splits
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<FeeSplitQuery>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<ShopFeeSplitRecord>>>> {
    let records = state
        .commission_service
        .list(&auth, query.into_filter()?, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(records)))
}

/// POST /api/admin/fee-splits
pub async fn record(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<RecordFeeSplitRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ShopFeeSplitRecord>>)> {
    let record = state.commission_service.record(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(record))))
}

/// GET /api/admin/fee-splits/summary
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<FeeSplitQuery>,
) -> ApiResult<Json<ApiResponse<FeeSplitSummary>>> {
    let summary = state
        .commission_service
        .summary(&auth, query.into_filter()?)
        .await?;
    Ok(Json(ApiResponse::ok(summary)))
}
