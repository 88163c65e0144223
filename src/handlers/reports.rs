use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::analytics::bucketing::WEEK_DAYS;
use crate::analytics::{compute_report_summary, compute_weekly_comparison, ReportPeriod, ReportSummary, WeeklyTrends};
use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub period: Option<String>,
}

pub async fn get_summary(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ReportSummary>> {
    let period = match query.period.as_deref() {
        None => ReportPeriod::default(),
        Some(raw) => raw
            .parse::<ReportPeriod>()
            .map_err(|_| AppError::Validation(format!("Invalid period '{}'", raw)))?,
    };

    let now = Utc::now();
    // The weekly comparison inside the report needs two full weeks.
    let lookback = period.days().max(2 * WEEK_DAYS);
    let records = state
        .repo
        .fetch_records(auth_user.id, now - Duration::days(lookback))
        .await?;
    tracing::debug!(user_id = %auth_user.id, ?period, records = records.len(), "Computing report summary");

    Ok(Json(compute_report_summary(&records, period, now)))
}

pub async fn get_weekly(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<WeeklyTrends>> {
    let now = Utc::now();
    let records = state
        .repo
        .fetch_records(auth_user.id, now - Duration::days(2 * WEEK_DAYS))
        .await?;
    tracing::debug!(user_id = %auth_user.id, records = records.len(), "Computing weekly comparison");

    Ok(Json(compute_weekly_comparison(&records, now)))
}
