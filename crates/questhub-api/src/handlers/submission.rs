//! Quest submissions and their review.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use questhub_core::types::PageResponse;
use questhub_entity::quest::QuestSubmission;

use crate::dto::query::StatusQuery;
use crate::dto::request::{ReasonRequest, SubmitProofRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{
    ApiQuery, AuthUser, PaginationParams, ValidatedJson, parse_optional, parse_uuid,
};
use crate::state::AppState;

/// POST /api/quests/{id}/submissions
pub async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quest_id): Path<String>,
    ValidatedJson(req): ValidatedJson<SubmitProofRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<QuestSubmission>>)> {
    let submission = state
        .submission_service
        .submit(&auth, parse_uuid(&quest_id)?, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(submission))))
}

/// GET /api/quests/{id}/submissions
pub async fn list_for_quest(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quest_id): Path<String>,
    ApiQuery(query): ApiQuery<StatusQuery>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<QuestSubmission>>>> {
    let submissions = state
        .submission_service
        .list_for_quest(
            &auth,
            parse_uuid(&quest_id)?,
            parse_optional(query.status.as_deref())?,
            page.into_page_request(),
        )
        .await?;
    Ok(Json(ApiResponse::ok(submissions)))
}

/// GET /api/submissions/mine
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<QuestSubmission>>>> {
    let submissions = state
        .submission_service
        .list_mine(&auth, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(submissions)))
}

/// POST /api/submissions/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<QuestSubmission>>> {
    let submission = state
        .submission_service
        .approve(&auth, parse_uuid(&id)?)
        .await?;
    Ok(Json(ApiResponse::ok(submission)))
}

/// POST /api/submissions/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReasonRequest>,
) -> ApiResult<Json<ApiResponse<QuestSubmission>>> {
    let submission = state
        .submission_service
        .reject(&auth, parse_uuid(&id)?, &req.reason)
        .await?;
    Ok(Json(ApiResponse::ok(submission)))
}
