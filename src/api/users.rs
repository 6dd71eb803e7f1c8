use axum::{
    Json,
    extract::{Extension, Path, State},
};
use std::sync::Arc;

use super::auth::{self, CurrentUser};
use super::types::{
    AddUserRequest, ApiResponse, BlockRequest, EmailRequest, MessageDto, ResetPasswordRequest,
    SigninDto, SigninRequest, SignupRequest, UserDto, VerifyOtpRequest,
};
use super::{ApiError, validation};
use crate::services::{AddUser, Signup};
use crate::state::AppState;

/// POST /api/users/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let input = validate_signup(payload, false)?;
    let user = state.accounts.signup(input).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// POST /api/users/admin/signup
pub async fn admin_signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let input = validate_signup(payload, true)?;
    let user = state.accounts.signup(input).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

fn validate_signup(payload: SignupRequest, as_admin: bool) -> Result<Signup, ApiError> {
    let first_name = validation::validate_name("First name", &payload.first_name)?;
    let last_name = validation::validate_name("Last name", &payload.last_name)?;
    let email = validation::validate_email(&payload.email)?.to_string();
    validation::validate_password(&payload.password)?;

    Ok(Signup {
        first_name,
        last_name,
        email,
        password: payload.password,
        image: payload.image,
        as_admin,
    })
}

/// POST /api/users/signin
pub async fn signin(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SigninRequest>,
) -> Result<Json<ApiResponse<SigninDto>>, ApiError> {
    signin_inner(&state, payload, false).await
}

/// POST /api/users/admin/signin
///
/// Same as signin but only admin accounts are accepted; everyone else gets
/// the generic invalid-credentials answer.
pub async fn admin_signin(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SigninRequest>,
) -> Result<Json<ApiResponse<SigninDto>>, ApiError> {
    signin_inner(&state, payload, true).await
}

async fn signin_inner(
    state: &AppState,
    payload: SigninRequest,
    require_admin: bool,
) -> Result<Json<ApiResponse<SigninDto>>, ApiError> {
    let email = validation::validate_email(&payload.email)?;
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let signin = state
        .accounts
        .signin(email, &payload.password, require_admin)
        .await?;

    Ok(Json(ApiResponse::success(SigninDto {
        token: signin.token,
        user: signin.user.into(),
    })))
}

/// POST /api/users/add-user (admin)
pub async fn add_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let first_name = validation::validate_name("First name", &payload.first_name)?;
    let last_name = validation::validate_name("Last name", &payload.last_name)?;
    let email = validation::validate_email(&payload.email)?.to_string();
    validation::validate_password(&payload.password)?;
    let role = validation::validate_role(&payload.role)?.to_string();

    let user = state
        .accounts
        .add_user(AddUser {
            first_name,
            last_name,
            email,
            password: payload.password,
            role,
        })
        .await?;

    Ok(Json(ApiResponse::success(user.into())))
}

/// POST /api/users/otp-verification
///
/// Re-issue a verification code. Any outstanding code is overwritten.
pub async fn request_otp(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    let email = validation::validate_email(&payload.email)?;
    state.accounts.request_otp(email).await?;

    Ok(Json(ApiResponse::success(MessageDto {
        message: "Verification code sent".to_string(),
    })))
}

/// PUT /api/users/verify-otp
pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let otp = validation::validate_otp(&payload.otp)?;
    let user = state.accounts.verify_otp(otp).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// POST /api/users/password-token
pub async fn request_password_reset(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    let email = validation::validate_email(&payload.email)?;
    state.accounts.request_password_reset(email).await?;

    Ok(Json(ApiResponse::success(MessageDto {
        message: "Password reset link sent".to_string(),
    })))
}

/// PUT /api/users/{id}/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    if payload.token.is_empty() {
        return Err(ApiError::validation("Reset token is required"));
    }
    validation::validate_password(&payload.password)?;

    state
        .accounts
        .reset_password(&id, &payload.token, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(MessageDto {
        message: "Password updated successfully".to_string(),
    })))
}

/// GET /api/users (admins and teachers)
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    auth::authorize(&current, &["teacher"])?;

    let users = state
        .store
        .list_users()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to list users: {e}")))?;

    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// GET /api/users/profile
pub async fn profile(
    Extension(CurrentUser(current)): Extension<CurrentUser>,
) -> Json<ApiResponse<UserDto>> {
    Json(ApiResponse::success(current.into()))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .store
        .get_user_by_id(&id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get user: {e}")))?
        .ok_or_else(|| ApiError::not_found("User", &id))?;

    Ok(Json(ApiResponse::success(user.into())))
}

/// GET /api/users/slug/{slug}
pub async fn get_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .store
        .get_user_by_slug(&slug)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get user: {e}")))?
        .ok_or_else(|| ApiError::not_found("User", &slug))?;

    Ok(Json(ApiResponse::success(user.into())))
}

/// PUT /api/users/{id}/block (admin)
pub async fn set_blocked(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<BlockRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    if current.id == id {
        return Err(ApiError::validation("You cannot block your own account"));
    }

    let user = state
        .store
        .get_user_by_id(&id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get user: {e}")))?
        .ok_or_else(|| ApiError::not_found("User", &id))?;

    let user = state
        .store
        .set_user_blocked(user, payload.blocked)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to update blocked flag: {e}")))?;

    Ok(Json(ApiResponse::success(user.into())))
}

/// DELETE /api/users/{id} (admin)
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    if current.id == id {
        return Err(ApiError::validation("You cannot delete your own account"));
    }

    let deleted = state
        .store
        .delete_user(&id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to delete user: {e}")))?;

    if !deleted {
        return Err(ApiError::not_found("User", &id));
    }

    Ok(Json(ApiResponse::success(MessageDto {
        message: "User deleted".to_string(),
    })))
}
