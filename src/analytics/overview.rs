use serde::Serialize;

use super::bucketing::{percentage, round_half_up, safe_ratio, Tally};
use super::signals::{Level, SleepCounts};
use crate::models::record::{ExerciseType, Intensity, MoodType, Record, RecordDetails};

/// Days covered by the overview snapshot. Also the fixed divisor for
/// `averagePerDay`, whether or not every day has data.
pub const OVERVIEW_WINDOW_DAYS: i64 = 30;
/// Overview lists at most this many health issues.
pub const TOP_ISSUES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub exercise: ExerciseOverview,
    pub mood: MoodOverview,
    pub health: HealthOverview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseOverview {
    pub total_minutes: u64,
    pub average_per_day: u64,
    pub most_frequent_type: ExerciseType,
    pub intensity_distribution: IntensityDistribution,
}

/// Percent of exercise records per intensity. Rounded independently, so the
/// values need not add up to exactly 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntensityDistribution {
    pub light: u32,
    pub medium: u32,
    pub high: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodOverview {
    pub distribution: MoodDistribution,
    pub most_frequent: MoodType,
}

/// Percent of mood records per mood type; every type is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MoodDistribution {
    pub happy: u32,
    pub calm: u32,
    pub sad: u32,
    pub angry: u32,
    pub anxious: u32,
    pub tired: u32,
    pub excited: u32,
    pub bored: u32,
}

impl MoodDistribution {
    fn slot(&mut self, mood: MoodType) -> &mut u32 {
        match mood {
            MoodType::Happy => &mut self.happy,
            MoodType::Calm => &mut self.calm,
            MoodType::Sad => &mut self.sad,
            MoodType::Angry => &mut self.angry,
            MoodType::Anxious => &mut self.anxious,
            MoodType::Tired => &mut self.tired,
            MoodType::Excited => &mut self.excited,
            MoodType::Bored => &mut self.bored,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueCount {
    #[serde(rename = "type")]
    pub tag: String,
    pub count: usize,
}

impl IssueCount {
    /// Rank status tags by frequency, keeping at most `limit` entries.
    pub fn ranked(tally: Tally<&str>, limit: Option<usize>) -> Vec<IssueCount> {
        tally
            .ranked()
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|(tag, count)| IssueCount {
                tag: tag.to_string(),
                count,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOverview {
    pub common_issues: Vec<IssueCount>,
    pub sleep_quality: Level,
    pub overall_score: u32,
}

/// Snapshot statistics over records already windowed to the last 30 days.
pub fn compute_overview<'a, I>(records: I) -> Overview
where
    I: IntoIterator<Item = &'a Record>,
{
    summarize(records, OVERVIEW_WINDOW_DAYS)
}

/// Same statistics as [`compute_overview`], averaging exercise minutes over
/// `days` instead of the fixed 30.
pub(crate) fn summarize<'a, I>(records: I, days: i64) -> Overview
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut total_minutes = 0u64;
    let mut exercise_count = 0usize;
    let mut exercise_types = Tally::new();
    let mut intensities = Tally::new();

    let mut mood_count = 0usize;
    let mut moods = Tally::new();

    let mut sleep = SleepCounts::default();
    let mut issues: Tally<&str> = Tally::new();

    for record in records {
        match &record.details {
            RecordDetails::Exercise(exercise) => {
                exercise_count += 1;
                total_minutes += u64::from(exercise.duration.unwrap_or(0));
                if let Some(kind) = exercise.exercise_type {
                    exercise_types.add(kind);
                }
                if let Some(intensity) = exercise.intensity {
                    intensities.add(intensity);
                }
            }
            RecordDetails::Mood(mood) => {
                mood_count += 1;
                if let Some(kind) = mood.mood_type {
                    moods.add(kind);
                }
            }
            RecordDetails::Health(health) => {
                sleep.observe(health);
                for tag in &health.status {
                    issues.add(tag.as_str());
                }
            }
            RecordDetails::Food(_) => {}
        }
    }

    let average_per_day = round_half_up(safe_ratio(total_minutes as f64, days as f64, 0.0)).max(0) as u64;

    let intensity_distribution = IntensityDistribution {
        light: percentage(intensities.count(&Intensity::Light), exercise_count),
        medium: percentage(intensities.count(&Intensity::Medium), exercise_count),
        high: percentage(intensities.count(&Intensity::High), exercise_count),
    };

    let mut distribution = MoodDistribution::default();
    for &mood in MoodType::ALL {
        *distribution.slot(mood) = percentage(moods.count(&mood), mood_count);
    }

    Overview {
        exercise: ExerciseOverview {
            total_minutes,
            average_per_day,
            most_frequent_type: exercise_types
                .most_frequent()
                .copied()
                .unwrap_or(ExerciseType::Walking),
            intensity_distribution,
        },
        mood: MoodOverview {
            distribution,
            most_frequent: moods.most_frequent().copied().unwrap_or(MoodType::Calm),
        },
        health: HealthOverview {
            common_issues: IssueCount::ranked(issues, Some(TOP_ISSUES)),
            sleep_quality: sleep.quality(),
            overall_score: sleep.score(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::bucketing::window_filter;
    use crate::analytics::test_support::*;

    #[test]
    fn test_empty_overview_is_neutral() {
        let overview = compute_overview(&[]);
        assert_eq!(overview.exercise.total_minutes, 0);
        assert_eq!(overview.exercise.average_per_day, 0);
        assert_eq!(overview.exercise.most_frequent_type, ExerciseType::Walking);
        assert_eq!(overview.exercise.intensity_distribution, IntensityDistribution::default());
        assert_eq!(overview.mood.distribution, MoodDistribution::default());
        assert_eq!(overview.mood.most_frequent, MoodType::Calm);
        assert!(overview.health.common_issues.is_empty());
        assert_eq!(overview.health.sleep_quality, Level::Medium);
        assert_eq!(overview.health.overall_score, 70);
    }

    #[test]
    fn test_exercise_totals_and_most_frequent_type() {
        let now = fixed_now();
        let records = vec![
            exercise_of(now, 0, "yoga", 40, "light"),
            exercise_of(now, 1, "running", 30, "high"),
            exercise_of(now, 2, "running", 20, "medium"),
            exercise_of(now, 3, "yoga", 15, "light"),
        ];
        let overview = compute_overview(&records);
        assert_eq!(overview.exercise.total_minutes, 105);
        assert_eq!(overview.exercise.average_per_day, 4);
        // yoga and running tie at two; yoga was seen first.
        assert_eq!(overview.exercise.most_frequent_type, ExerciseType::Yoga);
        assert_eq!(
            overview.exercise.intensity_distribution,
            IntensityDistribution { light: 50, medium: 25, high: 25 }
        );
    }

    #[test]
    fn test_all_high_intensity() {
        let now = fixed_now();
        let records: Vec<_> = (0..10)
            .map(|day| exercise_at(now, day, 30, Some("high")))
            .collect();
        let overview = compute_overview(&records);
        assert_eq!(
            overview.exercise.intensity_distribution,
            IntensityDistribution { light: 0, medium: 0, high: 100 }
        );
    }

    #[test]
    fn test_malformed_exercise_counts_as_zero() {
        let now = fixed_now();
        let mut broken = exercise_at(now, 0, 0, None);
        if let RecordDetails::Exercise(e) = &mut broken.details {
            e.duration = None;
            e.exercise_type = None;
        }
        let records = vec![broken, exercise_at(now, 1, 25, Some("light"))];
        let overview = compute_overview(&records);
        assert_eq!(overview.exercise.total_minutes, 25);
        assert_eq!(overview.exercise.intensity_distribution.light, 50);
        assert_eq!(overview.exercise.intensity_distribution.medium, 0);
    }

    #[test]
    fn test_mood_distribution_covers_every_type() {
        let now = fixed_now();
        let records = vec![
            mood_at(now, 0, "sad"),
            mood_at(now, 1, "happy"),
            mood_at(now, 2, "happy"),
        ];
        let overview = compute_overview(&records);
        let distribution = overview.mood.distribution;
        assert_eq!(distribution.happy, 67);
        assert_eq!(distribution.sad, 33);
        assert_eq!(distribution.bored, 0);
        assert_eq!(overview.mood.most_frequent, MoodType::Happy);

        let json = serde_json::to_value(&distribution).unwrap();
        let shares = json.as_object().unwrap();
        assert_eq!(shares.len(), 8);
        for &mood in MoodType::ALL {
            assert!(shares[mood.as_str()].as_u64().unwrap() <= 100);
        }
    }

    #[test]
    fn test_health_issues_sleep_and_score() {
        let now = fixed_now();
        let records = vec![
            health_at(now, 0, &["headache", "sleep_bad"]),
            health_at(now, 1, &["sleep_bad", "fatigue"]),
            health_at(now, 2, &["sleep_well"]),
            health_at(now, 3, &["a", "b", "c", "d"]),
        ];
        let overview = compute_overview(&records);
        let issues: Vec<_> = overview
            .health
            .common_issues
            .iter()
            .map(|i| (i.tag.as_str(), i.count))
            .collect();
        assert_eq!(
            issues,
            vec![("sleep_bad", 2), ("headache", 1), ("fatigue", 1), ("sleep_well", 1), ("a", 1)]
        );
        assert_eq!(overview.health.sleep_quality, Level::Low);
        // 70 + 5*1 - 3*2 - 2*9
        assert_eq!(overview.health.overall_score, 51);
    }

    #[test]
    fn test_overview_window_excludes_day_31() {
        let now = fixed_now();
        let records = vec![exercise_at(now, 31, 60, Some("medium"))];
        let windowed = window_filter(&records, now, OVERVIEW_WINDOW_DAYS);
        let overview = compute_overview(windowed);
        assert_eq!(overview.exercise.total_minutes, 0);
    }

    #[test]
    fn test_overview_is_idempotent() {
        let now = fixed_now();
        let records = vec![
            exercise_at(now, 0, 30, Some("high")),
            mood_at(now, 1, "calm"),
            health_at(now, 2, &["sleep_well"]),
        ];
        assert_eq!(compute_overview(&records), compute_overview(&records));
    }
}
