//! Rule-based recommendations: a season-keyed base list plus entries appended
//! for poor sleep, fatigue, low mood and exercise level.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use super::bucketing::{by_type, safe_ratio, window_filter, Tally};
use super::overview::{IssueCount, OVERVIEW_WINDOW_DAYS};
use super::signals::{Level, SleepCounts};
use crate::models::record::{MoodType, Record, RecordType};

const FATIGUE: &str = "fatigue";

const POSITIVE_MOODS: [MoodType; 3] = [MoodType::Happy, MoodType::Calm, MoodType::Excited];
const NEGATIVE_MOODS: [MoodType; 5] = [
    MoodType::Sad,
    MoodType::Angry,
    MoodType::Anxious,
    MoodType::Tired,
    MoodType::Bored,
];

/// Exercise records per day at or above which the level is high / medium.
const HIGH_EXERCISE_FREQUENCY: f64 = 0.7;
const MEDIUM_EXERCISE_FREQUENCY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepStatus {
    Good,
    Bad,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodStatus {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub name: &'static str,
    pub benefits: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LifestyleTip {
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    pub sleep_quality: SleepStatus,
    /// Every status tag seen, most frequent first.
    pub common_issues: Vec<IssueCount>,
    pub mood_status: MoodStatus,
    pub exercise_level: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationLists {
    pub food: Vec<Suggestion>,
    pub exercise: Vec<Suggestion>,
    pub lifestyle: Vec<LifestyleTip>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub season: Season,
    pub health_summary: HealthSummary,
    pub recommendations: RecommendationLists,
}

/// Recommendations from the last 30 days of `records`, seasoned by `now`.
pub fn compute_recommendations(records: &[Record], now: DateTime<Utc>) -> Recommendations {
    let recent = window_filter(records, now, OVERVIEW_WINDOW_DAYS);
    let season = Season::from_month(now.month());
    let summary = summarize_health(&recent);

    Recommendations {
        season,
        recommendations: RecommendationLists {
            food: food_suggestions(season, &summary),
            exercise: exercise_suggestions(season, &summary),
            lifestyle: lifestyle_tips(&summary),
        },
        health_summary: summary,
    }
}

fn summarize_health(records: &[&Record]) -> HealthSummary {
    let sleep = SleepCounts::from_records(records.iter().copied());
    let sleep_quality = match sleep.quality() {
        Level::High => SleepStatus::Good,
        Level::Low => SleepStatus::Bad,
        Level::Medium => SleepStatus::Normal,
    };

    let issues: Tally<&str> = records
        .iter()
        .flat_map(|r| r.status_tags())
        .map(String::as_str)
        .collect();

    let moods: Vec<MoodType> = records.iter().filter_map(|r| r.mood_type()).collect();
    let positive = moods.iter().filter(|m| POSITIVE_MOODS.contains(m)).count();
    let negative = moods.iter().filter(|m| NEGATIVE_MOODS.contains(m)).count();
    let mood_status = match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => MoodStatus::Positive,
        std::cmp::Ordering::Less => MoodStatus::Negative,
        std::cmp::Ordering::Equal => MoodStatus::Neutral,
    };

    let exercise_count = by_type(records.iter().copied(), RecordType::Exercise).len();
    let per_day = safe_ratio(exercise_count as f64, OVERVIEW_WINDOW_DAYS as f64, 0.0);
    let exercise_level = if per_day >= HIGH_EXERCISE_FREQUENCY {
        Level::High
    } else if per_day >= MEDIUM_EXERCISE_FREQUENCY {
        Level::Medium
    } else {
        Level::Low
    };

    HealthSummary {
        sleep_quality,
        common_issues: IssueCount::ranked(issues, None),
        mood_status,
        exercise_level,
    }
}

impl HealthSummary {
    fn has_issue(&self, tag: &str) -> bool {
        self.common_issues.iter().any(|issue| issue.tag == tag)
    }
}

const fn tip(name: &'static str, benefits: &'static str) -> Suggestion {
    Suggestion { name, benefits }
}

const fn habit(title: &'static str, description: &'static str) -> LifestyleTip {
    LifestyleTip { title, description }
}

fn food_suggestions(season: Season, summary: &HealthSummary) -> Vec<Suggestion> {
    let mut food: Vec<Suggestion> = match season {
        Season::Spring => vec![
            tip("Asparagus", "Rich in vitamin K and folate; supports detox and eases inflammation"),
            tip("Spinach", "Iron and antioxidants that strengthen immunity"),
            tip("Strawberries", "Vitamin C and antioxidants that support heart health"),
        ],
        Season::Summer => vec![
            tip("Watermelon", "High water content keeps you hydrated and cool"),
            tip("Cucumber", "Low in calories and hydrating in hot weather"),
            tip("Tomatoes", "Lycopene helps protect skin from UV damage"),
        ],
        Season::Autumn => vec![
            tip("Pumpkin", "Vitamin A and antioxidants that strengthen immunity"),
            tip("Apples", "Dietary fibre and antioxidants for healthy digestion"),
            tip("Sweet potatoes", "Complex carbohydrates and beta-carotene for steady blood sugar"),
        ],
        Season::Winter => vec![
            tip("Citrus fruit", "Vitamin C to strengthen immunity"),
            tip("Daikon radish", "Aids digestion and helps ward off colds"),
            tip("Kale", "Vitamins K, A and C with anti-inflammatory benefits"),
        ],
    };

    if summary.sleep_quality == SleepStatus::Bad {
        food.extend([
            tip("Cherries", "Natural melatonin that helps improve sleep"),
            tip("Bananas", "Magnesium and tryptophan promote relaxation and sleep"),
        ]);
    }
    if summary.has_issue(FATIGUE) {
        food.extend([
            tip("Spinach", "Iron that helps relieve fatigue"),
            tip("Salmon", "Omega-3 fatty acids and B vitamins for sustained energy"),
        ]);
    }
    if summary.mood_status == MoodStatus::Negative {
        food.extend([
            tip("Dark chocolate", "Polyphenols and magnesium that lift mood"),
            tip("Blueberries", "Antioxidants that help reduce stress and anxiety"),
        ]);
    }
    food
}

fn exercise_suggestions(season: Season, summary: &HealthSummary) -> Vec<Suggestion> {
    let mut exercise: Vec<Suggestion> = match season {
        Season::Spring => vec![
            tip("Outdoor walks", "Enjoy the mild weather and get more vitamin D"),
            tip("Cycling", "Builds cardiovascular fitness with a view of the season"),
        ],
        Season::Summer => vec![
            tip("Swimming", "Full-body workout without overheating"),
            tip("Early morning or evening workouts", "Avoid the hottest hours and the risk of heatstroke"),
        ],
        Season::Autumn => vec![
            tip("Hiking", "Enjoy the autumn scenery while building endurance"),
            tip("Yoga", "Improves flexibility ahead of the winter months"),
        ],
        Season::Winter => vec![
            tip("Indoor training", "Keeps the routine going through cold weather"),
            tip("Tai chi", "Gentle movement that improves balance and coordination"),
        ],
    };

    if summary.sleep_quality == SleepStatus::Bad {
        exercise.extend([
            tip("Yoga", "Relaxes body and mind for better sleep"),
            tip("Gentle aerobic exercise", "Light activity such as walking helps regulate your body clock"),
        ]);
    }
    match summary.exercise_level {
        Level::Low => exercise.extend([
            tip("Daily brisk walk", "Start at low intensity and build the habit gradually"),
            tip("Stretching", "Improves flexibility and prepares for harder sessions"),
        ]),
        Level::High => exercise.extend([
            tip("Interval training", "Gets more out of each session in less time"),
            tip("Strength training", "Builds muscle and raises resting metabolism"),
        ]),
        Level::Medium => {}
    }
    if summary.mood_status == MoodStatus::Negative {
        exercise.extend([
            tip("Aerobic dance", "Releases endorphins and lifts mood"),
            tip("Team sports", "Social contact that eases loneliness"),
        ]);
    }
    exercise
}

fn lifestyle_tips(summary: &HealthSummary) -> Vec<LifestyleTip> {
    let mut lifestyle = vec![
        habit("Keep a regular schedule", "Go to bed and get up at the same time every day to steady your body clock"),
        habit("Drink plenty of water", "Aim for at least two litres a day to stay hydrated"),
        habit("Cut screen time", "Put devices away an hour before bed for better sleep"),
    ];

    if summary.sleep_quality == SleepStatus::Bad {
        lifestyle.extend([
            habit("Wind down before bed", "Deep breathing or meditation helps body and mind relax"),
            habit("Improve your sleep environment", "Keep the bedroom quiet, dark and cool"),
        ]);
    }
    if summary.has_issue(FATIGUE) {
        lifestyle.extend([
            habit("Schedule breaks", "Rest 5-10 minutes after every 45-50 minutes of work"),
            habit("Consider B vitamins", "B-complex supplements support energy metabolism"),
        ]);
    }
    if summary.mood_status == MoodStatus::Negative {
        lifestyle.extend([
            habit("Get some sunlight", "15-30 minutes of daylight a day boosts vitamin D"),
            habit("Stay social", "Regular social activities strengthen your connections"),
        ]);
    }
    lifestyle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::*;
    use chrono::TimeZone;

    fn at_month(month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, month, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_season_from_month() {
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(5), Season::Spring);
        assert_eq!(Season::from_month(6), Season::Summer);
        assert_eq!(Season::from_month(9), Season::Autumn);
        assert_eq!(Season::from_month(11), Season::Autumn);
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
    }

    #[test]
    fn test_empty_records_get_base_lists() {
        let now = at_month(7);
        let result = compute_recommendations(&[], now);
        assert_eq!(result.season, Season::Summer);
        assert_eq!(result.health_summary.sleep_quality, SleepStatus::Normal);
        assert_eq!(result.health_summary.mood_status, MoodStatus::Neutral);
        assert_eq!(result.health_summary.exercise_level, Level::Low);
        assert!(result.health_summary.common_issues.is_empty());

        let lists = result.recommendations;
        assert_eq!(lists.food.len(), 3);
        assert_eq!(lists.food[0].name, "Watermelon");
        // Seasonal pair plus the low-activity pair.
        assert_eq!(lists.exercise.len(), 4);
        assert_eq!(lists.lifestyle.len(), 3);
    }

    #[test]
    fn test_conditions_append_entries() {
        let now = at_month(1);
        let mut records = vec![
            health_at(now, 1, &["sleep_bad", "fatigue"]),
            health_at(now, 2, &["sleep_bad"]),
            mood_at(now, 1, "sad"),
            mood_at(now, 2, "anxious"),
            mood_at(now, 3, "happy"),
        ];
        for day in 0..21 {
            records.push(exercise_at(now, day, 30, Some("medium")));
        }

        let result = compute_recommendations(&records, now);
        let summary = &result.health_summary;
        assert_eq!(result.season, Season::Winter);
        assert_eq!(summary.sleep_quality, SleepStatus::Bad);
        assert_eq!(summary.mood_status, MoodStatus::Negative);
        assert_eq!(summary.exercise_level, Level::High);

        let lists = &result.recommendations;
        // season 3 + sleep 2 + fatigue 2 + mood 2
        assert_eq!(lists.food.len(), 9);
        // season 2 + sleep 2 + high level 2 + mood 2
        assert_eq!(lists.exercise.len(), 8);
        assert!(lists.exercise.iter().any(|s| s.name == "Strength training"));
        // base 3 + sleep 2 + fatigue 2 + mood 2
        assert_eq!(lists.lifestyle.len(), 9);
    }

    #[test]
    fn test_medium_exercise_level_adds_nothing() {
        let now = at_month(4);
        let records: Vec<_> = (0..9).map(|day| exercise_at(now, day, 20, None)).collect();
        let result = compute_recommendations(&records, now);
        assert_eq!(result.health_summary.exercise_level, Level::Medium);
        assert_eq!(result.recommendations.exercise.len(), 2);
    }

    #[test]
    fn test_common_issues_are_not_capped() {
        let now = at_month(10);
        let records = vec![
            health_at(now, 1, &["a", "b", "c", "d"]),
            health_at(now, 2, &["e", "f", "g", "a"]),
        ];
        let result = compute_recommendations(&records, now);
        let issues = &result.health_summary.common_issues;
        assert_eq!(issues.len(), 7);
        assert_eq!(issues[0].tag, "a");
        assert_eq!(issues[0].count, 2);
    }

    #[test]
    fn test_records_older_than_30_days_are_ignored() {
        let now = at_month(8);
        let records = vec![health_at(now, 40, &["sleep_bad", "fatigue"])];
        let result = compute_recommendations(&records, now);
        assert_eq!(result.health_summary.sleep_quality, SleepStatus::Normal);
        assert!(result.health_summary.common_issues.is_empty());
    }

    #[test]
    fn test_recommendations_are_idempotent() {
        let now = at_month(5);
        let records = vec![
            health_at(now, 1, &["sleep_bad", "fatigue"]),
            mood_at(now, 2, "anxious"),
            exercise_at(now, 3, 25, Some("medium")),
        ];
        assert_eq!(
            compute_recommendations(&records, now),
            compute_recommendations(&records, now)
        );
    }
}
