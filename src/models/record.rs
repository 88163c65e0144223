use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::analytics::record_stats::DEFAULT_STATS_DAYS;

/// A stored label that does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised value: {0}")]
pub struct UnknownLabel(pub String);

/// Declares a closed set of lowercase string labels with serde, `Display` and
/// `FromStr` support.
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownLabel(other.to_string())),
                }
            }
        }
    };
}

labelled_enum!(
    /// Discriminator of a [`Record`].
    RecordType {
        Exercise => "exercise",
        Mood => "mood",
        Health => "health",
        Food => "food",
    }
);

labelled_enum!(ExerciseType {
    Walking => "walking",
    Running => "running",
    Cycling => "cycling",
    Swimming => "swimming",
    Yoga => "yoga",
    Gym => "gym",
    Basketball => "basketball",
    Football => "football",
    Other => "other",
});

labelled_enum!(Intensity {
    Light => "light",
    Medium => "medium",
    High => "high",
});

labelled_enum!(MoodType {
    Happy => "happy",
    Calm => "calm",
    Sad => "sad",
    Angry => "angry",
    Anxious => "anxious",
    Tired => "tired",
    Excited => "excited",
    Bored => "bored",
});

labelled_enum!(Feeling {
    Energetic => "energetic",
    Good => "good",
    Normal => "normal",
    Tired => "tired",
});

labelled_enum!(MealTime {
    Breakfast => "breakfast",
    Lunch => "lunch",
    Dinner => "dinner",
    Snack => "snack",
});

/// Health status tag for a good night's sleep.
pub const SLEEP_WELL: &str = "sleep_well";
/// Health status tag for a poor night's sleep.
pub const SLEEP_BAD: &str = "sleep_bad";

/// One logged entry. Serialized flat, with the variant selected by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub details: RecordDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub record_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecordDetails {
    Exercise(ExerciseDetails),
    Mood(MoodDetails),
    Health(HealthDetails),
    Food(FoodDetails),
}

// Variant fields are optional: rows written by older clients or edited by
// hand must still load, and aggregation treats a missing field as absent.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_type: Option<ExerciseType>,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Intensity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_type: Option<MoodType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feeling: Option<Feeling>,
    #[serde(default)]
    pub status: Vec<String>,
}

impl HealthDetails {
    pub fn has_status(&self, tag: &str) -> bool {
        self.status.iter().any(|s| s == tag)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_time: Option<MealTime>,
}

impl RecordDetails {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordDetails::Exercise(_) => RecordType::Exercise,
            RecordDetails::Mood(_) => RecordType::Mood,
            RecordDetails::Health(_) => RecordType::Health,
            RecordDetails::Food(_) => RecordType::Food,
        }
    }

    /// Name of the first required field that is absent, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        match self {
            RecordDetails::Exercise(e) => {
                if e.exercise_type.is_none() {
                    Some("exercise_type")
                } else if e.duration.is_none() {
                    Some("duration")
                } else if e.intensity.is_none() {
                    Some("intensity")
                } else {
                    None
                }
            }
            RecordDetails::Mood(m) => m.mood_type.is_none().then_some("mood_type"),
            RecordDetails::Health(h) => {
                if h.feeling.is_none() {
                    Some("feeling")
                } else if h.status.is_empty() {
                    Some("status")
                } else {
                    None
                }
            }
            RecordDetails::Food(f) => {
                if f.food_name.as_deref().map_or(true, |n| n.trim().is_empty()) {
                    Some("food_name")
                } else if f.meal_time.is_none() {
                    Some("meal_time")
                } else {
                    None
                }
            }
        }
    }
}

impl Record {
    pub fn record_type(&self) -> RecordType {
        self.details.record_type()
    }

    /// Exercise duration in minutes; zero for other types or when absent.
    pub fn duration_minutes(&self) -> u32 {
        match &self.details {
            RecordDetails::Exercise(e) => e.duration.unwrap_or(0),
            _ => 0,
        }
    }

    pub fn mood_type(&self) -> Option<MoodType> {
        match &self.details {
            RecordDetails::Mood(m) => m.mood_type,
            _ => None,
        }
    }

    /// Health status tags; empty for other types.
    pub fn status_tags(&self) -> &[String] {
        match &self.details {
            RecordDetails::Health(h) => &h.status,
            _ => &[],
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Variant-specific fields shared by create and update requests.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RecordFields {
    pub exercise_type: Option<ExerciseType>,

    #[validate(range(max = 1440, message = "Duration must be 0-1440 minutes"))]
    pub duration: Option<u32>,

    pub intensity: Option<Intensity>,
    pub mood_type: Option<MoodType>,
    pub feeling: Option<Feeling>,

    #[validate(length(max = 20, message = "At most 20 status tags"))]
    pub status: Option<Vec<String>>,

    #[validate(length(min = 1, max = 200, message = "Food name must be 1-200 characters"))]
    pub food_name: Option<String>,

    pub meal_time: Option<MealTime>,
}

impl RecordFields {
    /// First populated field that does not belong to `record_type`.
    fn misplaced_field(&self, record_type: RecordType) -> Option<&'static str> {
        let populated = [
            (RecordType::Exercise, "exercise_type", self.exercise_type.is_some()),
            (RecordType::Exercise, "duration", self.duration.is_some()),
            (RecordType::Exercise, "intensity", self.intensity.is_some()),
            (RecordType::Mood, "mood_type", self.mood_type.is_some()),
            (RecordType::Health, "feeling", self.feeling.is_some()),
            (RecordType::Health, "status", self.status.is_some()),
            (RecordType::Food, "food_name", self.food_name.is_some()),
            (RecordType::Food, "meal_time", self.meal_time.is_some()),
        ];
        populated
            .into_iter()
            .find(|(owner, _, present)| *present && *owner != record_type)
            .map(|(_, name, _)| name)
    }

    /// Overwrite the fields of `details` that are present in `self`.
    fn merge_into(self, details: &mut RecordDetails) {
        match details {
            RecordDetails::Exercise(e) => {
                e.exercise_type = self.exercise_type.or(e.exercise_type);
                e.duration = self.duration.or(e.duration);
                e.intensity = self.intensity.or(e.intensity);
            }
            RecordDetails::Mood(m) => {
                m.mood_type = self.mood_type.or(m.mood_type);
            }
            RecordDetails::Health(h) => {
                h.feeling = self.feeling.or(h.feeling);
                if let Some(status) = self.status {
                    h.status = normalize_status(status);
                }
            }
            RecordDetails::Food(f) => {
                if let Some(name) = self.food_name {
                    f.food_name = Some(name.trim().to_string());
                }
                f.meal_time = self.meal_time.or(f.meal_time);
            }
        }
    }

    fn validate_for(&self, record_type: RecordType) -> Result<(), String> {
        if let Some(field) = self.misplaced_field(record_type) {
            return Err(format!(
                "Field '{}' is not valid for {} records",
                field, record_type
            ));
        }
        Ok(())
    }
}

/// Trim tags and drop blanks and duplicates, keeping first-seen order.
fn normalize_status(status: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(status.len());
    for tag in status {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// POST /api/records
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecordRequest {
    #[serde(rename = "type")]
    pub record_type: RecordType,

    #[serde(flatten)]
    #[validate]
    pub fields: RecordFields,

    #[validate(length(max = 2000, message = "Note must be under 2000 characters"))]
    pub note: Option<String>,

    /// Date the activity happened. Default: now.
    pub record_date: Option<DateTime<Utc>>,
}

impl CreateRecordRequest {
    /// Build a validated record owned by `user_id`.
    pub fn into_record(self, user_id: Uuid, now: DateTime<Utc>) -> Result<Record, String> {
        self.fields.validate_for(self.record_type)?;

        let mut details = match self.record_type {
            RecordType::Exercise => RecordDetails::Exercise(ExerciseDetails::default()),
            RecordType::Mood => RecordDetails::Mood(MoodDetails::default()),
            RecordType::Health => RecordDetails::Health(HealthDetails::default()),
            RecordType::Food => RecordDetails::Food(FoodDetails::default()),
        };
        self.fields.merge_into(&mut details);

        if let Some(field) = details.missing_field() {
            return Err(format!(
                "Field '{}' is required for {} records",
                field, self.record_type
            ));
        }

        Ok(Record {
            id: Uuid::new_v4(),
            user_id,
            details,
            note: self.note.filter(|n| !n.trim().is_empty()),
            record_date: self.record_date.unwrap_or(now),
            created_at: now,
        })
    }
}

/// PUT /api/records/:id. Partial update; the record type cannot change.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRecordRequest {
    #[serde(flatten)]
    #[validate]
    pub fields: RecordFields,

    #[validate(length(max = 2000, message = "Note must be under 2000 characters"))]
    pub note: Option<String>,

    pub record_date: Option<DateTime<Utc>>,
}

impl UpdateRecordRequest {
    /// Merge the update into `record`, leaving it untouched on error.
    pub fn apply_to(self, record: &mut Record) -> Result<(), String> {
        let record_type = record.record_type();
        self.fields.validate_for(record_type)?;

        let mut details = record.details.clone();
        self.fields.merge_into(&mut details);
        if let Some(field) = details.missing_field() {
            return Err(format!(
                "Field '{}' is required for {} records",
                field, record_type
            ));
        }

        record.details = details;
        if let Some(note) = self.note {
            record.note = Some(note).filter(|n| !n.trim().is_empty());
        }
        if let Some(record_date) = self.record_date {
            record.record_date = record_date;
        }
        Ok(())
    }
}

/// GET /api/records query params
#[derive(Debug, Deserialize)]
pub struct RecordQuery {
    #[serde(rename = "type")]
    pub record_type: Option<RecordType>,
    /// Lookback in days. Default: 7
    pub days: Option<i64>,
}

impl RecordQuery {
    pub fn range_days(&self) -> i64 {
        lookback_days(self.days, 7)
    }
}

/// GET /api/records/stats query params
#[derive(Debug, Deserialize)]
pub struct RecordStatsQuery {
    /// Lookback in days. Default: 30
    pub days: Option<i64>,
}

impl RecordStatsQuery {
    pub fn range_days(&self) -> i64 {
        lookback_days(self.days, DEFAULT_STATS_DAYS)
    }
}

const MAX_LOOKBACK_DAYS: i64 = 365;

fn lookback_days(requested: Option<i64>, default: i64) -> i64 {
    match requested {
        Some(days) if days > 0 => days.min(MAX_LOOKBACK_DAYS),
        _ => default,
    }
}
