use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::analytics::overview::OVERVIEW_WINDOW_DAYS;
use crate::analytics::{compute_overview, compute_trends, DailyTrends, Overview};
use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub days: Option<i64>,
}

pub async fn get_overview(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Overview>> {
    let since = Utc::now() - Duration::days(OVERVIEW_WINDOW_DAYS);
    let records = state.repo.fetch_records(auth_user.id, since).await?;
    tracing::debug!(user_id = %auth_user.id, records = records.len(), "Computing overview");

    Ok(Json(compute_overview(&records)))
}

pub async fn get_trends(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<TrendQuery>,
) -> AppResult<Json<DailyTrends>> {
    let days = state.config.trend_days(query.days);
    let now = Utc::now();

    let mut records = state
        .repo
        .fetch_records(auth_user.id, now - Duration::days(days))
        .await?;
    // Series follow first appearance, so feed them oldest first.
    records.sort_by_key(|r| r.created_at);
    tracing::debug!(user_id = %auth_user.id, days, records = records.len(), "Computing trends");

    Ok(Json(compute_trends(&records, days, now)))
}
