//! Day-bucketed series for charting and week-over-week comparisons.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use super::bucketing::{
    by_type, group_by_calendar_day, percent_change, percentage, round_half_up, safe_ratio,
    split_weeks, window_filter, Tally, WEEK_DAYS,
};
use super::signals::{average_intensity, bucket_intensity, Level, SleepCounts};
use crate::models::record::{Intensity, MoodType, Record, RecordType};

pub const DEFAULT_TREND_DAYS: i64 = 30;

/// Numeric intensity assumed for a week without exercise.
const NEUTRAL_INTENSITY: f64 = 2.0;

const POSITIVE_MOODS: [MoodType; 3] = [MoodType::Happy, MoodType::Excited, MoodType::Calm];

// ============================================================================
// Daily series
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrends {
    pub exercise: Vec<DailyExercise>,
    pub mood: Vec<DailyMood>,
    pub health: Vec<DailyHealth>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyExercise {
    pub date: NaiveDate,
    pub minutes: u64,
    pub intensity: Intensity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMood {
    pub date: NaiveDate,
    pub mood: MoodType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyHealth {
    pub date: NaiveDate,
    pub issues: Vec<String>,
    pub sleep_quality: Level,
}

/// Per-day series over the last `window_days` days.
///
/// Series are sparse: a day only appears in a type's series if it has at
/// least one record of that type. Days follow the order of the input.
pub fn compute_trends(records: &[Record], window_days: i64, now: DateTime<Utc>) -> DailyTrends {
    let windowed = window_filter(records, now, window_days);

    let mut trends = DailyTrends {
        exercise: Vec::new(),
        mood: Vec::new(),
        health: Vec::new(),
    };

    for (date, day) in group_by_calendar_day(windowed) {
        let exercise = by_type(day.iter().copied(), RecordType::Exercise);
        if !exercise.is_empty() {
            trends.exercise.push(DailyExercise {
                date,
                minutes: total_minutes(&exercise),
                intensity: average_intensity(exercise.iter().copied())
                    .map_or(Intensity::Medium, bucket_intensity),
            });
        }

        let moods = by_type(day.iter().copied(), RecordType::Mood);
        if !moods.is_empty() {
            trends.mood.push(DailyMood {
                date,
                mood: dominant_mood(&moods),
            });
        }

        let health = by_type(day.iter().copied(), RecordType::Health);
        if !health.is_empty() {
            trends.health.push(DailyHealth {
                date,
                issues: health
                    .iter()
                    .flat_map(|r| r.status_tags().iter().cloned())
                    .collect(),
                sleep_quality: SleepCounts::from_records(health.iter().copied()).quality(),
            });
        }
    }

    trends
}

fn total_minutes(records: &[&Record]) -> u64 {
    records.iter().map(|r| u64::from(r.duration_minutes())).sum()
}

fn dominant_mood(records: &[&Record]) -> MoodType {
    records
        .iter()
        .filter_map(|r| r.mood_type())
        .collect::<Tally<_>>()
        .most_frequent()
        .copied()
        .unwrap_or(MoodType::Calm)
}

// ============================================================================
// Week over week
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTrends {
    pub exercise: ExerciseTrend,
    pub mood: MoodTrend,
    pub health: HealthTrend,
    pub window: WeekWindow,
}

/// Bounds of the two compared weeks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekWindow {
    pub previous_start: DateTime<Utc>,
    pub current_start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseTrend {
    pub weekly_minutes: u64,
    pub weekly_change: i64,
    pub frequency: usize,
    pub frequency_change: i64,
    pub intensity_avg: Intensity,
    pub intensity_change: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodTrend {
    pub positive_rate: u32,
    pub positive_change: i64,
    pub stability: Level,
    pub stability_change: i64,
    pub current_mood: MoodType,
    pub previous_mood: MoodType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthTrend {
    pub sleep_quality: Level,
    pub sleep_change: i64,
    pub issue_frequency: usize,
    pub issue_change: i64,
    pub overall_score: u32,
    pub score_change: i64,
}

/// Compare the week ending at `now` with the week before it.
pub fn compute_weekly_comparison<'a, I>(records: I, now: DateTime<Utc>) -> WeeklyTrends
where
    I: IntoIterator<Item = &'a Record>,
{
    let (current, previous) = split_weeks(records, now);
    let current_start = now - Duration::days(WEEK_DAYS);

    WeeklyTrends {
        exercise: exercise_trend(&current, &previous),
        mood: mood_trend(&current, &previous),
        health: health_trend(&current, &previous),
        window: WeekWindow {
            previous_start: current_start - Duration::days(WEEK_DAYS),
            current_start,
            end: now,
        },
    }
}

fn exercise_trend(current: &[&Record], previous: &[&Record]) -> ExerciseTrend {
    let current = by_type(current.iter().copied(), RecordType::Exercise);
    let previous = by_type(previous.iter().copied(), RecordType::Exercise);

    let current_minutes = total_minutes(&current);
    let previous_minutes = total_minutes(&previous);

    let current_avg = average_intensity(current.iter().copied());
    let previous_avg = average_intensity(previous.iter().copied());

    ExerciseTrend {
        weekly_minutes: current_minutes,
        weekly_change: percent_change(current_minutes as f64, previous_minutes as f64),
        frequency: current.len(),
        frequency_change: percent_change(current.len() as f64, previous.len() as f64),
        intensity_avg: current_avg.map_or(Intensity::Medium, bucket_intensity),
        intensity_change: percent_change(
            current_avg.unwrap_or(NEUTRAL_INTENSITY),
            previous_avg.unwrap_or(NEUTRAL_INTENSITY),
        ),
    }
}

/// Mood labels in one week.
struct MoodWeek {
    records: usize,
    positive: usize,
    moods: Tally<MoodType>,
}

impl MoodWeek {
    fn from_records(records: &[&Record]) -> Self {
        let moods = by_type(records.iter().copied(), RecordType::Mood);
        let labels: Tally<MoodType> = moods.iter().filter_map(|r| r.mood_type()).collect();
        let positive = moods
            .iter()
            .filter(|r| r.mood_type().is_some_and(|m| POSITIVE_MOODS.contains(&m)))
            .count();
        Self {
            records: moods.len(),
            positive,
            moods: labels,
        }
    }

    fn positive_rate(&self) -> u32 {
        percentage(self.positive, self.records)
    }

    fn stability(&self) -> Level {
        match self.moods.distinct() {
            0..=2 => Level::High,
            3..=4 => Level::Medium,
            _ => Level::Low,
        }
    }

    fn dominant(&self) -> MoodType {
        self.moods.most_frequent().copied().unwrap_or(MoodType::Calm)
    }
}

fn mood_trend(current: &[&Record], previous: &[&Record]) -> MoodTrend {
    let current = MoodWeek::from_records(current);
    let previous = MoodWeek::from_records(previous);

    let current_rate = current.positive_rate();
    let previous_rate = previous.positive_rate();

    let current_distinct = current.moods.distinct() as f64;
    let previous_distinct = previous.moods.distinct() as f64;
    // More distinct moods means less stable, so the change is negated.
    let stability_change = round_half_up(
        safe_ratio(current_distinct - previous_distinct, previous_distinct, 0.0) * -100.0,
    );

    MoodTrend {
        positive_rate: current_rate,
        positive_change: percent_change(f64::from(current_rate), f64::from(previous_rate)),
        stability: current.stability(),
        stability_change,
        current_mood: current.dominant(),
        previous_mood: previous.dominant(),
    }
}

fn health_trend(current: &[&Record], previous: &[&Record]) -> HealthTrend {
    let current = SleepCounts::from_records(current.iter().copied());
    let previous = SleepCounts::from_records(previous.iter().copied());

    let current_ratio = current.ratio();
    let previous_ratio = previous.ratio();
    let sleep_change = round_half_up(
        safe_ratio(current_ratio - previous_ratio, previous_ratio.abs(), 0.0) * 100.0,
    );

    let current_score = current.score();
    let previous_score = previous.score();

    HealthTrend {
        sleep_quality: current.quality(),
        sleep_change,
        issue_frequency: current.tags,
        issue_change: percent_change(current.tags as f64, previous.tags as f64),
        overall_score: current_score,
        score_change: percent_change(f64::from(current_score), f64::from(previous_score)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::*;

    #[test]
    fn test_daily_series_is_sparse() {
        let now = fixed_now();
        let records = vec![
            exercise_at(now, 3, 30, Some("light")),
            exercise_at(now, 3, 20, Some("high")),
            mood_at(now, 3, "sad"),
            mood_at(now, 2, "happy"),
            mood_at(now, 2, "calm"),
            mood_at(now, 2, "calm"),
            health_at(now, 1, &["sleep_well", "headache"]),
            health_at(now, 1, &["sleep_bad"]),
            health_at(now, 1, &["sleep_bad"]),
        ];
        let trends = compute_trends(&records, DEFAULT_TREND_DAYS, now);

        assert_eq!(
            trends.exercise,
            vec![DailyExercise {
                date: days_ago(now, 3),
                minutes: 50,
                intensity: Intensity::Medium,
            }]
        );
        assert_eq!(
            trends.mood,
            vec![
                DailyMood { date: days_ago(now, 3), mood: MoodType::Sad },
                DailyMood { date: days_ago(now, 2), mood: MoodType::Calm },
            ]
        );
        assert_eq!(trends.health.len(), 1);
        assert_eq!(trends.health[0].issues, vec!["sleep_well", "headache", "sleep_bad", "sleep_bad"]);
        assert_eq!(trends.health[0].sleep_quality, Level::Low);
    }

    #[test]
    fn test_trend_window_reaches_back_35_days() {
        let now = fixed_now();
        let records = vec![exercise_at(now, 31, 60, Some("high"))];
        assert!(compute_trends(&records, 30, now).exercise.is_empty());

        let trends = compute_trends(&records, 35, now);
        assert_eq!(trends.exercise.len(), 1);
        assert_eq!(trends.exercise[0].minutes, 60);
        assert_eq!(trends.exercise[0].intensity, Intensity::High);
    }

    #[test]
    fn test_weekly_exercise_change() {
        let now = fixed_now();
        let records = vec![
            exercise_at(now, 1, 70, Some("high")),
            exercise_at(now, 2, 50, Some("high")),
            exercise_at(now, 8, 100, Some("medium")),
        ];
        let weekly = compute_weekly_comparison(&records, now);
        let exercise = weekly.exercise;
        assert_eq!(exercise.weekly_minutes, 120);
        assert_eq!(exercise.weekly_change, 20);
        assert_eq!(exercise.frequency, 2);
        assert_eq!(exercise.frequency_change, 100);
        assert_eq!(exercise.intensity_avg, Intensity::High);
        assert_eq!(exercise.intensity_change, 50);
    }

    #[test]
    fn test_weekly_without_previous_week_reports_no_change() {
        let now = fixed_now();
        let records = vec![
            exercise_at(now, 1, 45, Some("light")),
            mood_at(now, 1, "happy"),
            mood_at(now, 2, "sad"),
            health_at(now, 3, &["sleep_well"]),
        ];
        let weekly = compute_weekly_comparison(&records, now);
        assert_eq!(weekly.exercise.weekly_change, 0);
        assert_eq!(weekly.exercise.frequency_change, 0);
        assert_eq!(weekly.mood.positive_rate, 50);
        assert_eq!(weekly.mood.positive_change, 0);
        assert_eq!(weekly.mood.stability_change, 0);
        assert_eq!(weekly.mood.previous_mood, MoodType::Calm);
        assert_eq!(weekly.health.sleep_change, 0);
        assert_eq!(weekly.health.issue_change, 0);
        // Previous week scores the neutral 70.
        assert_eq!(weekly.health.overall_score, 73);
        assert_eq!(weekly.health.score_change, 4);
    }

    #[test]
    fn test_weekly_mood_trend() {
        let now = fixed_now();
        let records = vec![
            mood_at(now, 1, "happy"),
            mood_at(now, 2, "happy"),
            mood_at(now, 3, "excited"),
            mood_at(now, 4, "sad"),
            mood_at(now, 8, "sad"),
            mood_at(now, 9, "angry"),
            mood_at(now, 10, "anxious"),
            mood_at(now, 11, "calm"),
        ];
        let mood = compute_weekly_comparison(&records, now).mood;
        assert_eq!(mood.positive_rate, 75);
        // 25% -> 75%
        assert_eq!(mood.positive_change, 200);
        assert_eq!(mood.stability, Level::Medium);
        // 4 distinct -> 3 distinct
        assert_eq!(mood.stability_change, 25);
        assert_eq!(mood.current_mood, MoodType::Happy);
        assert_eq!(mood.previous_mood, MoodType::Sad);
    }

    #[test]
    fn test_weekly_health_trend() {
        let now = fixed_now();
        let records = vec![
            health_at(now, 1, &["sleep_well"]),
            health_at(now, 2, &["sleep_well", "headache"]),
            health_at(now, 8, &["sleep_bad"]),
            health_at(now, 9, &["sleep_well"]),
            health_at(now, 10, &["sleep_bad", "fatigue"]),
        ];
        let health = compute_weekly_comparison(&records, now).health;
        assert_eq!(health.sleep_quality, Level::High);
        // ratio 1.0 vs -1/3
        assert_eq!(health.sleep_change, 400);
        assert_eq!(health.issue_frequency, 3);
        assert_eq!(health.issue_change, -25);
        // 70 + 10 - 6 = 74 vs 70 + 5 - 6 - 8 = 61
        assert_eq!(health.overall_score, 74);
        assert_eq!(health.score_change, 21);
    }

    #[test]
    fn test_empty_weekly_comparison_is_neutral() {
        let now = fixed_now();
        let weekly = compute_weekly_comparison(&[], now);
        assert_eq!(weekly.exercise.weekly_minutes, 0);
        assert_eq!(weekly.exercise.intensity_avg, Intensity::Medium);
        assert_eq!(weekly.exercise.intensity_change, 0);
        assert_eq!(weekly.mood.stability, Level::High);
        assert_eq!(weekly.mood.current_mood, MoodType::Calm);
        assert_eq!(weekly.health.sleep_quality, Level::Medium);
        assert_eq!(weekly.health.overall_score, 70);
        assert_eq!(weekly.health.score_change, 0);
        assert_eq!(weekly.window.end, now);
        assert_eq!(weekly.window.previous_start, now - Duration::days(14));
    }

    #[test]
    fn test_weekly_scores_stay_clamped() {
        let now = fixed_now();
        let records: Vec<_> = (0..30)
            .map(|i| health_at(now, i % 7, &["sleep_bad", "headache", "fatigue"]))
            .collect();
        let health = compute_weekly_comparison(&records, now).health;
        assert_eq!(health.overall_score, 0);
        assert_eq!(health.score_change, -100);
    }

    #[test]
    fn test_trends_are_idempotent() {
        let now = fixed_now();
        let records = vec![
            exercise_at(now, 1, 30, Some("light")),
            exercise_at(now, 9, 45, None),
            mood_at(now, 2, "happy"),
            mood_at(now, 10, "sad"),
            health_at(now, 3, &["sleep_well", "headache"]),
            health_at(now, 11, &["sleep_bad"]),
        ];

        assert_eq!(
            compute_trends(&records, DEFAULT_TREND_DAYS, now),
            compute_trends(&records, DEFAULT_TREND_DAYS, now)
        );
        assert_eq!(
            compute_weekly_comparison(&records, now),
            compute_weekly_comparison(&records, now)
        );
    }
}
