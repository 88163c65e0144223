use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::bucketing::{window_filter, Tally};
use super::overview::{summarize, Overview};
use super::trends::{compute_weekly_comparison, WeeklyTrends};
use crate::models::record::{MealTime, Record, RecordDetails, UnknownLabel};

/// Report lists at most this many foods.
pub const TOP_FOODS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl ReportPeriod {
    pub fn days(self) -> i64 {
        match self {
            ReportPeriod::Week => 7,
            ReportPeriod::Month => 30,
            ReportPeriod::Quarter => 90,
            ReportPeriod::Year => 365,
        }
    }
}

impl FromStr for ReportPeriod {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(ReportPeriod::Week),
            "month" => Ok(ReportPeriod::Month),
            "quarter" => Ok(ReportPeriod::Quarter),
            "year" => Ok(ReportPeriod::Year),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MealDistribution {
    pub breakfast: usize,
    pub lunch: usize,
    pub dinner: usize,
    pub snack: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoodCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodStats {
    pub total_records: usize,
    pub meal_distribution: MealDistribution,
    pub top_foods: Vec<FoodCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub period: ReportPeriod,
    pub analysis: Overview,
    pub trends: WeeklyTrends,
    pub food: FoodStats,
    pub date_range: DateRange,
}

/// Overview and food statistics over `period`, plus the usual week-on-week
/// comparison. Exercise minutes are averaged over the period's length.
pub fn compute_report_summary(records: &[Record], period: ReportPeriod, now: DateTime<Utc>) -> ReportSummary {
    let days = period.days();
    let in_period = window_filter(records, now, days);

    ReportSummary {
        period,
        analysis: summarize(in_period.iter().copied(), days),
        trends: compute_weekly_comparison(records, now),
        food: food_stats(&in_period),
        date_range: DateRange {
            start: (now - Duration::days(days)).date_naive(),
            end: now.date_naive(),
        },
    }
}

fn food_stats(records: &[&Record]) -> FoodStats {
    let mut total_records = 0;
    let mut meals = MealDistribution::default();
    let mut foods: Tally<&str> = Tally::new();

    for record in records {
        let RecordDetails::Food(food) = &record.details else {
            continue;
        };
        total_records += 1;
        match food.meal_time {
            Some(MealTime::Breakfast) => meals.breakfast += 1,
            Some(MealTime::Lunch) => meals.lunch += 1,
            Some(MealTime::Dinner) => meals.dinner += 1,
            Some(MealTime::Snack) => meals.snack += 1,
            None => {}
        }
        if let Some(name) = food.food_name.as_deref() {
            foods.add(name);
        }
    }

    FoodStats {
        total_records,
        meal_distribution: meals,
        top_foods: foods
            .ranked()
            .into_iter()
            .take(TOP_FOODS)
            .map(|(name, count)| FoodCount {
                name: name.to_string(),
                count,
            })
            .collect(),
    }
}
