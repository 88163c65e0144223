use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::bucketing::{by_type, window_filter};
use crate::models::record::{Record, RecordType};

pub const DEFAULT_STATS_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub exercise: usize,
    pub mood: usize,
    pub health: usize,
    pub food: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStats {
    pub total: usize,
    pub by_type: TypeCounts,
    /// Most recently created record in the window.
    pub last_record: Option<Record>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

/// Record counts over the last `days` days of `now`.
pub fn compute_record_stats(records: &[Record], days: i64, now: DateTime<Utc>) -> RecordStats {
    let recent = window_filter(records, now, days);
    let count = |record_type| by_type(recent.iter().copied(), record_type).len();

    // Later in input order wins a tie on created_at.
    let last_record = recent
        .iter()
        .copied()
        .fold(None::<&Record>, |latest, r| match latest {
            Some(l) if l.created_at > r.created_at => Some(l),
            _ => Some(r),
        })
        .cloned();

    RecordStats {
        total: recent.len(),
        by_type: TypeCounts {
            exercise: count(RecordType::Exercise),
            mood: count(RecordType::Mood),
            health: count(RecordType::Health),
            food: count(RecordType::Food),
        },
        last_record,
        period_start: now - Duration::days(days),
        period_end: now,
    }
}
