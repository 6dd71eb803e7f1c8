use axum::{Json, extract::Multipart, extract::State};
use std::sync::Arc;
use tracing::info;

use super::ApiError;
use super::types::{ApiResponse, UploadDto};
use crate::state::AppState;

/// POST /api/uploads
///
/// Relay one multipart `file` field to the media host and record the
/// returned URL.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadDto>>, ApiError> {
    if !state.media.is_enabled() {
        return Err(ApiError::media_host_error("Media host is not configured"));
    }

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .unwrap_or("upload.bin")
            .to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?;

        file = Some((file_name, content_type, bytes.to_vec()));
        break;
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| ApiError::validation("Multipart field 'file' is required"))?;

    if bytes.is_empty() {
        return Err(ApiError::validation("Uploaded file is empty"));
    }

    let file_type = if content_type.starts_with("video/") {
        "video"
    } else {
        "image"
    };

    let url = state
        .media
        .upload(file_name, content_type, bytes)
        .await
        .map_err(|e| ApiError::media_host_error(e.to_string()))?;

    let record = state
        .store
        .record_upload(&url, file_type)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to record upload: {e}")))?;

    info!("Stored {} upload at {}", record.file_type, record.file_url);
    Ok(Json(ApiResponse::success(record.into())))
}

/// GET /api/uploads (admin), newest first.
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UploadDto>>>, ApiError> {
    let uploads = state
        .store
        .list_uploads()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to list uploads: {e}")))?;

    Ok(Json(ApiResponse::success(
        uploads.into_iter().map(UploadDto::from).collect(),
    )))
}
