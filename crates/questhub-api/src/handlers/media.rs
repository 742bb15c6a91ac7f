//! Image upload, URL signing and signed downloads.

use axum::Json;
use axum::body::Body;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;

use questhub_core::error::AppError;
use questhub_entity::media::MediaPurpose;
use questhub_service::media::{SignedMedia, UploadedMedia};
use questhub_storage::manager::validate_key;

use crate::dto::request::SignMediaRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, ValidatedJson, parse_uuid};
use crate::state::AppState;

/// POST /api/media/images
///
/// Multipart form with a `file` part and an optional `purpose` part.
pub async fn upload_image(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UploadedMedia>>)> {
    let mut multipart = multipart.map_err(|e| AppError::validation(e.body_text()))?;
    let mut data: Option<Bytes> = None;
    let mut purpose = MediaPurpose::Submission;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read upload: {e}")))?;
                data = Some(bytes);
            }
            Some("purpose") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read purpose: {e}")))?;
                purpose = text.parse()?;
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::validation("Missing 'file' field"))?;
    let uploaded = state.media_service.upload(&auth, purpose, data).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(uploaded))))
}

/// POST /api/media/sign
pub async fn sign(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(req): ValidatedJson<SignMediaRequest>,
) -> ApiResult<Json<ApiResponse<Vec<SignedMedia>>>> {
    let signed = state.media_service.sign(req.keys).await?;
    Ok(Json(ApiResponse::ok(signed)))
}

/// DELETE /api/media/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.media_service.delete(&auth, parse_uuid(&id)?).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Media deleted"))))
}

/// Signature parameters carried by a signed URL.
#[derive(Debug, Deserialize)]
pub struct SignedParams {
    pub expires: i64,
    pub signature: String,
}

/// GET /api/media/files/{*key}
pub async fn serve_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
    ApiQuery(params): ApiQuery<SignedParams>,
) -> ApiResult<Response> {
    validate_key(&key)?;
    state
        .storage
        .signer()
        .verify(&key, params.expires, &params.signature, Utc::now())?;

    let stream = state.storage.read(&key).await?;
    let mut response = Body::from_stream(stream).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type(&key)));
    let max_age = (params.expires - Utc::now().timestamp()).max(0);
    if let Ok(value) = HeaderValue::from_str(&format!("private, max-age={max_age}")) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    Ok(response)
}

fn content_type(key: &str) -> &'static str {
    match key.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type("shop/u/1.JPG"), "image/jpeg");
        assert_eq!(content_type("avatar/u/2.png"), "image/png");
        assert_eq!(content_type("odd/key"), "application/octet-stream");
    }
}
