//! Pure aggregation over a user's records.
//!
//! Nothing in here touches storage or the clock: callers fetch records and
//! pass `now` in, so every function is deterministic for a given input.

pub mod bucketing;
pub mod overview;
pub mod recommendations;
pub mod record_stats;
pub mod report;
pub mod signals;
pub mod trends;

pub use overview::{compute_overview, Overview};
pub use recommendations::{compute_recommendations, Recommendations};
pub use record_stats::{compute_record_stats, RecordStats};
pub use report::{compute_report_summary, ReportPeriod, ReportSummary};
pub use trends::{compute_trends, compute_weekly_comparison, DailyTrends, WeeklyTrends};
