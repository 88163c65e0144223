use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::analytics::{compute_record_stats, RecordStats};
use crate::models::record::{
    CreateRecordRequest, Record, RecordQuery, RecordStatsQuery, UpdateRecordRequest,
};
use crate::AppState;

pub async fn list_records(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<RecordQuery>,
) -> AppResult<Json<Vec<Record>>> {
    let since = Utc::now() - Duration::days(query.range_days());
    let mut records = state.repo.fetch_records(auth_user.id, since).await?;

    if let Some(record_type) = query.record_type {
        records.retain(|r| r.record_type() == record_type);
    }
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(records))
}

pub async fn get_record_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<RecordStatsQuery>,
) -> AppResult<Json<RecordStats>> {
    let days = query.range_days();
    let now = Utc::now();
    let records = state
        .repo
        .fetch_records(auth_user.id, now - Duration::days(days))
        .await?;
    tracing::debug!(user_id = %auth_user.id, days, records = records.len(), "Computing record stats");

    Ok(Json(compute_record_stats(&records, days, now)))
}

pub async fn create_record(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateRecordRequest>,
) -> AppResult<(StatusCode, Json<Record>)> {
    body.validate()?;
    let record = body
        .into_record(auth_user.id, Utc::now())
        .map_err(AppError::Validation)?;

    let record = state.repo.insert_record(record).await?;
    tracing::info!(user_id = %auth_user.id, record_id = %record.id, record_type = %record.record_type(), "Record created");

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_record(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(record_id): Path<Uuid>,
    Json(body): Json<UpdateRecordRequest>,
) -> AppResult<Json<Record>> {
    body.validate()?;

    let mut record = state
        .repo
        .get_record(auth_user.id, record_id)
        .await?
        .ok_or(AppError::NotFound("Record not found".into()))?;

    body.apply_to(&mut record).map_err(AppError::Validation)?;

    if !state.repo.update_record(&record).await? {
        return Err(AppError::NotFound("Record not found".into()));
    }
    tracing::info!(user_id = %auth_user.id, record_id = %record.id, "Record updated");

    Ok(Json(record))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(record_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    if !state.repo.delete_record(auth_user.id, record_id).await? {
        return Err(AppError::NotFound("Record not found".into()));
    }
    tracing::info!(user_id = %auth_user.id, record_id = %record_id, "Record deleted");

    Ok(Json(json!({ "deleted": true })))
}
