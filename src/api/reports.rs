use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::types::{
    ApiResponse, BulkStatusDto, BulkStatusRequest, CreateReportRequest, MessageDto,
    ModerateRequest, ReportDto, ReportFilterQuery, ReportPageDto, UpdateReportRequest,
};
use super::{ApiError, validation};
use crate::db::{NewReport, ReportFilter, ReportUpdate};
use crate::services::StatusAction;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 20;

#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    pub limit: Option<u64>,
}

/// POST /api/reports (verified accounts only)
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Json(payload): Json<CreateReportRequest>,
) -> Result<Json<ApiResponse<ReportDto>>, ApiError> {
    if payload.issue_type.is_empty() {
        return Err(ApiError::validation("At least one issue type is required"));
    }

    let privacy = payload
        .privacy_preference
        .unwrap_or_else(|| "public".to_string());
    validation::validate_privacy_preference(&privacy)?;

    let new = NewReport {
        school_name: payload.school_name,
        images: payload.images.map(|images| images.join(",")),
        video: payload.video,
        school_location: payload.school_location,
        issue_type: payload.issue_type.join(","),
        description: payload.description,
        user_id: current.id.clone(),
        privacy_preference: privacy,
    };

    let report = state.reports.create(&current, new).await?;
    Ok(Json(ApiResponse::success(report.into())))
}

/// GET /api/reports
pub async fn latest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LatestQuery>,
) -> Result<Json<ApiResponse<Vec<ReportDto>>>, ApiError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let reports = state
        .store
        .latest_reports(limit)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to list reports: {e}")))?;

    Ok(Json(ApiResponse::success(
        reports.into_iter().map(ReportDto::from).collect(),
    )))
}

/// GET /api/reports/filters
pub async fn filtered(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportFilterQuery>,
) -> Result<Json<ApiResponse<ReportPageDto>>, ApiError> {
    if let Some(status) = &query.status {
        parse_status(status)?;
    }

    let filter = ReportFilter {
        search: query.search.filter(|s| !s.trim().is_empty()),
        status: query.status,
        issue_type: query.issue_type,
        privacy_preference: query.privacy_preference,
        page: query.page,
        per_page: query.per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100),
    };

    let (rows, total_pages) = state
        .store
        .filtered_reports(filter)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to filter reports: {e}")))?;

    Ok(Json(ApiResponse::success(ReportPageDto {
        reports: rows.into_iter().map(ReportDto::from).collect(),
        total_pages,
    })))
}

fn parse_status(status: &str) -> Result<&str, ApiError> {
    const ALLOWED: [&str; 3] = ["pending", "approved", "disapproved"];

    if !ALLOWED.contains(&status) {
        return Err(ApiError::validation(format!(
            "Invalid status: '{}'. Must be one of: {}",
            status,
            ALLOWED.join(", ")
        )));
    }
    Ok(status)
}

/// GET /api/reports/export (admin)
///
/// Every report as a CSV attachment, oldest first.
pub async fn export(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let reports = state
        .store
        .list_all_reports()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to export reports: {e}")))?;

    let mut csv = String::from(
        "id,school_name,school_location,issue_type,status,privacy_preference,created_at,updated_at\n",
    );
    for report in reports {
        let row = [
            report.id,
            report.school_name,
            report.school_location,
            report.issue_type,
            report.status,
            report.privacy_preference,
            report.created_at,
            report.updated_at,
        ];
        let escaped: Vec<String> = row.iter().map(|field| csv_escape(field)).collect();
        csv.push_str(&escaped.join(","));
        csv.push('\n');
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"reports.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// GET /api/reports/{id}
pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ReportDto>>, ApiError> {
    let report = state
        .store
        .get_report(&id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get report: {e}")))?
        .ok_or_else(|| ApiError::not_found("Report", &id))?;

    Ok(Json(ApiResponse::success(report.into())))
}

/// GET /api/reports/slug/{slug}
pub async fn get_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ReportDto>>, ApiError> {
    let report = state
        .store
        .get_report_by_slug(&slug)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get report: {e}")))?
        .ok_or_else(|| ApiError::not_found("Report", &slug))?;

    Ok(Json(ApiResponse::success(report.into())))
}

/// PUT /api/reports/update-status (admin)
pub async fn bulk_update_status(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BulkStatusRequest>,
) -> Result<Json<ApiResponse<BulkStatusDto>>, ApiError> {
    let action = StatusAction::parse(&payload.action)?;

    let updated = state
        .reports
        .moderate_bulk(&payload.report_ids, action)
        .await?;

    Ok(Json(ApiResponse::success(BulkStatusDto { updated })))
}

/// PUT /api/reports/{id} (admin)
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateReportRequest>,
) -> Result<Json<ApiResponse<ReportDto>>, ApiError> {
    if let Some(privacy) = &payload.privacy_preference {
        validation::validate_privacy_preference(privacy)?;
    }

    let update = ReportUpdate {
        school_name: payload.school_name,
        images: payload.images.map(|images| images.join(",")),
        video: payload.video,
        school_location: payload.school_location,
        issue_type: payload.issue_type.map(|issues| issues.join(",")),
        description: payload.description,
        privacy_preference: payload.privacy_preference,
    };

    let report = state.reports.update(&id, update).await?;
    Ok(Json(ApiResponse::success(report.into())))
}

/// PUT /api/reports/{id}/approve (admin)
pub async fn approve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ModerateRequest>,
) -> Result<Json<ApiResponse<ReportDto>>, ApiError> {
    moderate(&state, &id, StatusAction::Approve, payload.comment).await
}

/// PUT /api/reports/{id}/disapprove (admin)
pub async fn disapprove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ModerateRequest>,
) -> Result<Json<ApiResponse<ReportDto>>, ApiError> {
    moderate(&state, &id, StatusAction::Disapprove, payload.comment).await
}

async fn moderate(
    state: &AppState,
    id: &str,
    action: StatusAction,
    comment: Option<String>,
) -> Result<Json<ApiResponse<ReportDto>>, ApiError> {
    let report = state.reports.moderate(id, action, comment).await?;
    Ok(Json(ApiResponse::success(report.into())))
}

/// DELETE /api/reports/{id} (admin)
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    state.reports.delete(&id).await?;

    Ok(Json(ApiResponse::success(MessageDto {
        message: "Report deleted".to_string(),
    })))
}
