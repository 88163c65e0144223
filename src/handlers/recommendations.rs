use axum::{extract::State, Extension, Json};
use chrono::{Duration, Utc};

use crate::analytics::overview::OVERVIEW_WINDOW_DAYS;
use crate::analytics::{compute_recommendations, Recommendations};
use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::AppState;

pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Recommendations>> {
    let now = Utc::now();
    let records = state
        .repo
        .fetch_records(auth_user.id, now - Duration::days(OVERVIEW_WINDOW_DAYS))
        .await?;
    tracing::debug!(user_id = %auth_user.id, records = records.len(), "Computing recommendations");

    Ok(Json(compute_recommendations(&records, now)))
}
