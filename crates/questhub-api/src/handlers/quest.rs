//! Quest handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use questhub_core::types::PageResponse;
use questhub_entity::quest::Quest;

use crate::dto::query::QuestQuery;
use crate::dto::request::{CreateQuestRequest, UpdateQuestRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{
    ApiQuery, AuthUser, MaybeAuthUser, PaginationParams, ValidatedJson, parse_uuid,
};
use crate::state::AppState;

/// GET /api/quests
///
/// Anonymous callers and consumers see open quests only. Admins see every
/// quest matching the filter, drafts included.
pub async fn list(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    ApiQuery(query): ApiQuery<QuestQuery>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Quest>>>> {
    let filter = query.into_filter()?;
    let page = page.into_page_request();
    let quests = match auth.ctx() {
        Some(ctx) if ctx.is_admin() => state.quest_service.list_all(ctx, filter, page).await?,
        _ => state.quest_service.list_public(filter, page).await?,
    };
    Ok(Json(ApiResponse::ok(quests)))
}

/// POST /api/quests
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateQuestRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Quest>>)> {
    let quest = state.quest_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(quest))))
}

/// GET /api/quests/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Quest>>> {
    let quest = state.quest_service.get(auth.ctx(), parse_uuid(&id)?).await?;
    Ok(Json(ApiResponse::ok(quest)))
}

/// PUT /api/quests/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateQuestRequest>,
) -> ApiResult<Json<ApiResponse<Quest>>> {
    let quest = state
        .quest_service
        .update(&auth, parse_uuid(&id)?, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(quest)))
}

/// POST /api/quests/{id}/publish
pub async fn publish(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Quest>>> {
    let quest = state.quest_service.publish(&auth, parse_uuid(&id)?).await?;
    Ok(Json(ApiResponse::ok(quest)))
}

/// POST /api/quests/{id}/close
pub async fn close(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Quest>>> {
    let quest = state.quest_service.close(&auth, parse_uuid(&id)?).await?;
    Ok(Json(ApiResponse::ok(quest)))
}
