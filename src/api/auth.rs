use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::ApiError;
use crate::entities::users;
use crate::state::AppState;

/// The authenticated account, re-fetched from the database on every
/// request so blocks and deletions take effect before the token expires.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub users::Model);

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing authorization token"))?;

    let claims = state.tokens.verify(&token)?;

    let user = state
        .store
        .get_user_by_id(&claims.sub)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load account: {e}")))?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    if user.is_blocked {
        return Err(ApiError::forbidden("Account is blocked"));
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Admin gate. Must sit inside `auth_middleware` so the extension is set.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    if !user.0.is_admin {
        return Err(ApiError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}

/// Allow admins plus any of the listed roles.
pub fn authorize(user: &users::Model, allowed_roles: &[&str]) -> Result<(), ApiError> {
    if user.is_admin || allowed_roles.contains(&user.role.as_str()) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "Role '{}' is not allowed to access this resource",
            user.role
        )))
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}
