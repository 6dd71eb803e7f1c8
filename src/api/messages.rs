use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::info;

use super::ApiError;
use super::types::{ApiResponse, BroadcastRequest, MessageDto};
use crate::state::AppState;

/// POST /api/messages/send (admin)
///
/// Mail the given subject and message to every registered account.
pub async fn send(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BroadcastRequest>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    let subject = payload.subject.trim();
    if subject.is_empty() {
        return Err(ApiError::validation("Subject is required"));
    }
    if payload.message.trim().is_empty() {
        return Err(ApiError::validation("Message is required"));
    }

    let users = state
        .store
        .list_users()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to list users: {e}")))?;

    if users.is_empty() {
        return Err(ApiError::validation("No subscribers found"));
    }

    let recipients: Vec<String> = users.into_iter().map(|u| u.email).collect();
    let count = recipients.len();

    state
        .mailer
        .send_newsletter(&recipients, subject, &payload.message)
        .await
        .map_err(|e| ApiError::mail_error(e.to_string()))?;

    info!("Newsletter \"{subject}\" sent to {count} accounts");
    Ok(Json(ApiResponse::success(MessageDto {
        message: format!("Newsletter sent to {count} subscribers"),
    })))
}
