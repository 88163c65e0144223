//! Per-record signals shared by the overview, trend and recommendation
//! aggregators.

use serde::Serialize;

use super::bucketing::safe_ratio;
use crate::models::record::{HealthDetails, Intensity, Record, RecordDetails, SLEEP_BAD, SLEEP_WELL};

/// Three-step qualitative level used for sleep quality, mood stability and
/// exercise level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

pub const BASE_HEALTH_SCORE: i64 = 70;
const GOOD_SLEEP_POINTS: i64 = 5;
const BAD_SLEEP_PENALTY: i64 = 3;
const ISSUE_PENALTY: i64 = 2;

/// Sleep tags and status volume over a set of health records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SleepCounts {
    /// Health records seen.
    pub records: usize,
    /// Records tagged `sleep_well`.
    pub good: usize,
    /// Records tagged `sleep_bad`.
    pub bad: usize,
    /// Status tags across all records, counted with repetition.
    pub tags: usize,
}

impl SleepCounts {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut counts = Self::default();
        for record in records {
            if let RecordDetails::Health(health) = &record.details {
                counts.observe(health);
            }
        }
        counts
    }

    pub fn observe(&mut self, health: &HealthDetails) {
        self.records += 1;
        self.tags += health.status.len();
        if health.has_status(SLEEP_WELL) {
            self.good += 1;
        }
        if health.has_status(SLEEP_BAD) {
            self.bad += 1;
        }
    }

    pub fn quality(&self) -> Level {
        match self.good.cmp(&self.bad) {
            std::cmp::Ordering::Greater => Level::High,
            std::cmp::Ordering::Less => Level::Low,
            std::cmp::Ordering::Equal => Level::Medium,
        }
    }

    /// `(good - bad) / records`, 0 without health records.
    pub fn ratio(&self) -> f64 {
        safe_ratio(
            self.good as f64 - self.bad as f64,
            self.records as f64,
            0.0,
        )
    }

    /// 70 + 5 per good night - 3 per bad night - 2 per status tag, clamped
    /// to 0..=100.
    pub fn score(&self) -> u32 {
        let raw = BASE_HEALTH_SCORE + GOOD_SLEEP_POINTS * self.good as i64
            - BAD_SLEEP_PENALTY * self.bad as i64
            - ISSUE_PENALTY * self.tags as i64;
        raw.clamp(0, 100) as u32
    }
}

/// Numeric value of an intensity on the 1–3 scale; absent counts as medium.
pub fn intensity_value(intensity: Option<Intensity>) -> f64 {
    match intensity {
        Some(Intensity::Light) => 1.0,
        Some(Intensity::Medium) | None => 2.0,
        Some(Intensity::High) => 3.0,
    }
}

/// Mean intensity value over exercise records, `None` if there are none.
pub fn average_intensity<'a, I>(records: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut sum = 0.0;
    let mut count = 0usize;
    for record in records {
        if let RecordDetails::Exercise(exercise) = &record.details {
            sum += intensity_value(exercise.intensity);
            count += 1;
        }
    }
    (count > 0).then(|| sum / count as f64)
}

/// Map an averaged intensity value back to its category.
pub fn bucket_intensity(average: f64) -> Intensity {
    if average <= 1.5 {
        Intensity::Light
    } else if average <= 2.5 {
        Intensity::Medium
    } else {
        Intensity::High
    }
}
