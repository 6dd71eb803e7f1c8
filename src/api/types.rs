use serde::{Deserialize, Serialize};

use crate::entities::{reports, uploads, users};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Public view of an account. Password hash, OTP, and reset fields never
/// leave the server.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub image: Option<String>,
    pub role: String,
    pub is_admin: bool,
    pub is_blocked: bool,
    pub is_account_verified: bool,
    pub slug: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for UserDto {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            image: model.image,
            role: model.role,
            is_admin: model.is_admin,
            is_blocked: model.is_blocked,
            is_account_verified: model.is_account_verified,
            slug: model.slug,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportDto {
    pub id: String,
    pub school_name: String,
    pub slug: Option<String>,
    pub images: Vec<String>,
    pub video: Option<String>,
    pub status: String,
    pub school_location: String,
    pub issue_type: Vec<String>,
    pub description: String,
    pub comment: Option<String>,
    /// Hidden for anonymous submissions.
    pub user_id: Option<String>,
    pub privacy_preference: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<reports::Model> for ReportDto {
    fn from(model: reports::Model) -> Self {
        let user_id = if model.privacy_preference == "anonymous" {
            None
        } else {
            Some(model.user_id)
        };

        Self {
            id: model.id,
            school_name: model.school_name,
            slug: model.slug,
            images: split_list(model.images.as_deref()),
            video: model.video,
            status: model.status,
            school_location: model.school_location,
            issue_type: split_list(Some(&model.issue_type)),
            description: model.description,
            comment: model.comment,
            user_id,
            privacy_preference: model.privacy_preference,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn split_list(joined: Option<&str>) -> Vec<String> {
    joined
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[derive(Debug, Serialize)]
pub struct SigninDto {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct ReportPageDto {
    pub reports: Vec<ReportDto>,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct DailyCountDto {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub users: u64,
    pub reports: u64,
}

#[derive(Debug, Serialize)]
pub struct SummaryDto {
    pub total_users: u64,
    pub total_reports: u64,
    pub pending_reports: u64,
    pub approved_reports: u64,
    pub disapproved_reports: u64,
    /// Last 10 days, oldest first, gaps zero-filled.
    pub daily: Vec<DailyCountDto>,
}

#[derive(Debug, Serialize)]
pub struct UploadDto {
    pub url: String,
    pub file_type: String,
}

impl From<uploads::Model> for UploadDto {
    fn from(model: uploads::Model) -> Self {
        Self {
            url: model.file_url,
            file_type: model.file_type,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BulkStatusDto {
    pub updated: u64,
}

// --- request bodies ---

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub school_name: String,
    pub images: Option<Vec<String>>,
    pub video: Option<String>,
    pub school_location: String,
    pub issue_type: Vec<String>,
    pub description: String,
    pub privacy_preference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReportRequest {
    pub school_name: Option<String>,
    pub images: Option<Vec<String>>,
    pub video: Option<String>,
    pub school_location: Option<String>,
    pub issue_type: Option<Vec<String>>,
    pub description: Option<String>,
    pub privacy_preference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub blocked: bool,
}

#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkStatusRequest {
    pub report_ids: Vec<String>,
    /// "approve" or "disapprove", applied uniformly.
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct ReportFilterQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub issue_type: Option<String>,
    pub privacy_preference: Option<String>,
    #[serde(default)]
    pub page: u64,
    pub per_page: Option<u64>,
}
