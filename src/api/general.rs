use axum::{Json, extract::State};
use chrono::{Days, NaiveTime, Utc};
use std::sync::Arc;

use super::ApiError;
use super::types::{ApiResponse, DailyCountDto, HealthDto, SummaryDto};
use crate::state::AppState;

const SERIES_DAYS: u64 = 10;

/// GET /api/general/health
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthDto>>, ApiError> {
    state
        .store
        .ping()
        .await
        .map_err(|e| ApiError::internal(format!("Database unreachable: {e}")))?;

    Ok(Json(ApiResponse::success(HealthDto { status: "ok" })))
}

/// GET /api/general/summary
///
/// Platform totals plus a per-day activity series covering the last ten
/// calendar days (UTC), oldest first, with missing days zero-filled.
pub async fn summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SummaryDto>>, ApiError> {
    let total_users = state
        .store
        .count_users()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to count users: {e}")))?;
    let total_reports = state
        .store
        .count_reports()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to count reports: {e}")))?;
    let pending_reports = count_status(&state, "pending").await?;
    let approved_reports = count_status(&state, "approved").await?;
    let disapproved_reports = count_status(&state, "disapproved").await?;

    let today = Utc::now().date_naive();
    let start = today
        .checked_sub_days(Days::new(SERIES_DAYS - 1))
        .ok_or_else(|| ApiError::internal("Summary window underflowed the calendar"))?;
    let since = start.and_time(NaiveTime::MIN).and_utc().to_rfc3339();

    let recent_users = state
        .store
        .users_created_since(&since)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to query recent users: {e}")))?;
    let recent_reports = state
        .store
        .reports_created_since(&since)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to query recent reports: {e}")))?;

    let user_days: Vec<String> = recent_users.iter().map(|u| day_of(&u.created_at)).collect();
    let report_days: Vec<String> = recent_reports
        .iter()
        .map(|r| day_of(&r.created_at))
        .collect();

    let mut daily = Vec::with_capacity(SERIES_DAYS as usize);
    for offset in 0..SERIES_DAYS {
        let Some(date) = start.checked_add_days(Days::new(offset)) else {
            continue;
        };
        let key = date.format("%Y-%m-%d").to_string();
        daily.push(DailyCountDto {
            users: count_matching(&user_days, &key),
            reports: count_matching(&report_days, &key),
            date: key,
        });
    }

    Ok(Json(ApiResponse::success(SummaryDto {
        total_users,
        total_reports,
        pending_reports,
        approved_reports,
        disapproved_reports,
        daily,
    })))
}

async fn count_status(state: &AppState, status: &str) -> Result<u64, ApiError> {
    state
        .store
        .count_reports_by_status(status)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to count {status} reports: {e}")))
}

/// Calendar-day prefix of an RFC3339 timestamp.
fn day_of(timestamp: &str) -> String {
    timestamp.chars().take(10).collect()
}

fn count_matching(days: &[String], key: &str) -> u64 {
    days.iter().filter(|day| day.as_str() == key).count() as u64
}
