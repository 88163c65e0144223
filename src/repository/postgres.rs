use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::RecordRepository;
use crate::error::{AppError, AppResult};
use crate::models::record::{
    ExerciseDetails, FoodDetails, HealthDetails, MoodDetails, Record, RecordDetails, RecordType,
};

#[derive(Debug, Clone)]
pub struct PgRecordRepository {
    pool: PgPool,
}

impl PgRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape of the `records` table. Variant fields live in `details` JSONB.
#[derive(Debug, FromRow)]
struct RecordRow {
    id: Uuid,
    user_id: Uuid,
    record_type: String,
    details: Value,
    note: Option<String>,
    record_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl RecordRow {
    /// Convert into a [`Record`], or `None` for an unknown `record_type`.
    ///
    /// Each variant field is decoded on its own: a malformed value loads as
    /// absent and the remaining fields are kept.
    fn into_record(self) -> Option<Record> {
        let record_type: RecordType = match self.record_type.parse() {
            Ok(t) => t,
            Err(_) => {
                tracing::warn!(record_id = %self.id, record_type = %self.record_type, "Skipping record with unknown type");
                return None;
            }
        };

        let fields = match self.details {
            Value::Object(map) => map,
            other => {
                if !other.is_null() {
                    tracing::warn!(record_id = %self.id, "Record details are not an object");
                }
                Map::new()
            }
        };
        let reader = DetailsReader {
            record_id: self.id,
            fields: &fields,
        };

        Some(Record {
            id: self.id,
            user_id: self.user_id,
            details: reader.details(record_type),
            note: self.note,
            record_date: self.record_date,
            created_at: self.created_at,
        })
    }
}

/// Lenient access to the `details` object of one row.
struct DetailsReader<'a> {
    record_id: Uuid,
    fields: &'a Map<String, Value>,
}

impl DetailsReader<'_> {
    fn details(&self, record_type: RecordType) -> RecordDetails {
        match record_type {
            RecordType::Exercise => RecordDetails::Exercise(ExerciseDetails {
                exercise_type: self.field("exercise_type"),
                duration: self.field("duration"),
                intensity: self.field("intensity"),
            }),
            RecordType::Mood => RecordDetails::Mood(MoodDetails {
                mood_type: self.field("mood_type"),
            }),
            RecordType::Health => RecordDetails::Health(HealthDetails {
                feeling: self.field("feeling"),
                status: self.tags("status"),
            }),
            RecordType::Food => RecordDetails::Food(FoodDetails {
                food_name: self.field("food_name"),
                meal_time: self.field("meal_time"),
            }),
        }
    }

    /// The field decoded as `T`; absent, null and malformed values are `None`.
    fn field<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.fields.get(key).filter(|v| !v.is_null())?;
        match T::deserialize(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(record_id = %self.record_id, field = key, error = %e, "Ignoring malformed record field");
                None
            }
        }
    }

    /// String entries of an array field; anything else is dropped.
    fn tags(&self, key: &str) -> Vec<String> {
        match self.fields.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                tracing::warn!(record_id = %self.record_id, field = key, "Ignoring non-array status");
                Vec::new()
            }
        }
    }
}

fn details_json(record: &Record) -> AppResult<Value> {
    let mut value = serde_json::to_value(&record.details)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode record details: {}", e)))?;
    if let Value::Object(map) = &mut value {
        map.remove("type");
    }
    Ok(value)
}

#[async_trait]
impl RecordRepository for PgRecordRepository {
    async fn fetch_records(&self, user_id: Uuid, since: DateTime<Utc>) -> AppResult<Vec<Record>> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, user_id, record_type, details, note, record_date, created_at
            FROM records
            WHERE user_id = $1 AND created_at >= $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(RecordRow::into_record).collect())
    }

    async fn get_record(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Record>> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, user_id, record_type, details, note, record_date, created_at
            FROM records
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(RecordRow::into_record))
    }

    async fn insert_record(&self, record: Record) -> AppResult<Record> {
        sqlx::query(
            r#"
            INSERT INTO records (id, user_id, record_type, details, note, record_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.record_type().as_str())
        .bind(details_json(&record)?)
        .bind(&record.note)
        .bind(record.record_date)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn update_record(&self, record: &Record) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE records
            SET details = $3, note = $4, record_date = $5
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(details_json(record)?)
        .bind(&record.note)
        .bind(record.record_date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_record(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM records WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{ExerciseType, Feeling, Intensity, MoodType};
    use serde_json::json;

    fn row(record_type: &str, details: Value) -> RecordRow {
        let now = Utc::now();
        RecordRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            record_type: record_type.into(),
            details,
            note: None,
            record_date: now,
            created_at: now,
        }
    }

    #[test]
    fn test_row_converts_into_tagged_record() {
        let record = row(
            "exercise",
            json!({"exercise_type": "running", "duration": 30, "intensity": "high"}),
        )
        .into_record()
        .unwrap();
        assert_eq!(
            record.details,
            RecordDetails::Exercise(ExerciseDetails {
                exercise_type: Some(ExerciseType::Running),
                duration: Some(30),
                intensity: Some(Intensity::High),
            })
        );
    }

    #[test]
    fn test_unknown_type_is_skipped() {
        assert!(row("sleep", json!({})).into_record().is_none());
    }

    #[test]
    fn test_malformed_details_load_empty() {
        let record = row("mood", json!({"mood_type": "ecstatic"})).into_record().unwrap();
        assert_eq!(record.details, RecordDetails::Mood(MoodDetails::default()));

        let record = row("mood", json!({"mood_type": "happy"})).into_record().unwrap();
        assert_eq!(record.mood_type(), Some(MoodType::Happy));

        let record = row("food", json!("not an object")).into_record().unwrap();
        assert_eq!(record.details, RecordDetails::Food(FoodDetails::default()));
    }

    #[test]
    fn test_bad_field_keeps_the_others() {
        let record = row(
            "exercise",
            json!({"exercise_type": "running", "duration": "45", "intensity": "high"}),
        )
        .into_record()
        .unwrap();
        assert_eq!(
            record.details,
            RecordDetails::Exercise(ExerciseDetails {
                exercise_type: Some(ExerciseType::Running),
                duration: None,
                intensity: Some(Intensity::High),
            })
        );
        assert_eq!(record.duration_minutes(), 0);
    }

    #[test]
    fn test_non_string_tags_are_dropped() {
        let record = row(
            "health",
            json!({"feeling": "tired", "status": ["sleep_bad", null, 3]}),
        )
        .into_record()
        .unwrap();
        assert_eq!(record.status_tags(), ["sleep_bad"]);
        assert_eq!(
            record.details,
            RecordDetails::Health(HealthDetails {
                feeling: Some(Feeling::Tired),
                status: vec!["sleep_bad".to_string()],
            })
        );

        let record = row("health", json!({"feeling": "good", "status": "headache"}))
            .into_record()
            .unwrap();
        assert!(record.status_tags().is_empty());
    }

    #[test]
    fn test_stored_details_omit_type_tag() {
        let record = row("health", json!({"feeling": "good", "status": ["headache"]}))
            .into_record()
            .unwrap();
        let stored = details_json(&record).unwrap();
        assert_eq!(stored, json!({"feeling": "good", "status": ["headache"]}));
    }
}
