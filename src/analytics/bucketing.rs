//! Record selection by type and time window, plus the shared arithmetic used
//! by every aggregator.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::record::{Record, RecordType};

pub const WEEK_DAYS: i64 = 7;

/// Records of one type, in input order.
pub fn by_type<'a, I>(records: I, record_type: RecordType) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|r| r.record_type() == record_type)
        .collect()
}

/// Records created within the last `days` days of `now` (inclusive bound).
pub fn window_filter<'a, I>(records: I, now: DateTime<Utc>, days: i64) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let since = now - Duration::days(days);
    records
        .into_iter()
        .filter(|r| r.created_at >= since)
        .collect()
}

/// Split into `(current_week, previous_week)` relative to `now`.
///
/// Both windows are inclusive at the lower bound and exclusive at the upper
/// bound; anything older than two weeks is dropped.
pub fn split_weeks<'a, I>(records: I, now: DateTime<Utc>) -> (Vec<&'a Record>, Vec<&'a Record>)
where
    I: IntoIterator<Item = &'a Record>,
{
    let one_week_ago = now - Duration::days(WEEK_DAYS);
    let two_weeks_ago = one_week_ago - Duration::days(WEEK_DAYS);

    let mut current = Vec::new();
    let mut previous = Vec::new();
    for record in records {
        if record.created_at >= one_week_ago {
            current.push(record);
        } else if record.created_at >= two_weeks_ago {
            previous.push(record);
        }
    }
    (current, previous)
}

/// Group records by the UTC calendar day of `created_at`.
///
/// Days appear in order of first appearance in the input, not sorted.
pub fn group_by_calendar_day<'a, I>(records: I) -> Vec<(NaiveDate, Vec<&'a Record>)>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut days: Vec<(NaiveDate, Vec<&'a Record>)> = Vec::new();
    for record in records {
        let date = record.created_at.date_naive();
        match days.iter_mut().find(|(d, _)| *d == date) {
            Some((_, bucket)) => bucket.push(record),
            None => days.push((date, vec![record])),
        }
    }
    days
}

/// `numerator / denominator`, or `default` when the denominator is zero or
/// the quotient is not finite.
pub fn safe_ratio(numerator: f64, denominator: f64, default: f64) -> f64 {
    if denominator == 0.0 {
        return default;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        default
    }
}

/// Round to the nearest integer, halves towards positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Share of `part` in `whole` as a rounded percentage, 0 for an empty whole.
pub fn percentage(part: usize, whole: usize) -> u32 {
    let share = safe_ratio(part as f64, whole as f64, 0.0) * 100.0;
    round_half_up(share).clamp(0, 100) as u32
}

/// Rounded percentage change from `previous` to `current`, 0 when there is
/// no previous value to compare against.
pub fn percent_change(current: f64, previous: f64) -> i64 {
    round_half_up(safe_ratio(current - previous, previous, 0.0) * 100.0)
}

/// Occurrence counts that remember first-seen order.
///
/// Ties in [`Tally::most_frequent`] and [`Tally::ranked`] go to whichever key
/// was added first.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    entries: Vec<(K, usize)>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((key, 1)),
        }
    }

    pub fn count(&self, key: &K) -> usize {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(0, |(_, count)| *count)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Number of distinct keys.
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    pub fn most_frequent(&self) -> Option<&K> {
        let mut best: Option<&(K, usize)> = None;
        for entry in &self.entries {
            if best.map_or(true, |(_, count)| entry.1 > *count) {
                best = Some(entry);
            }
        }
        best.map(|(key, _)| key)
    }

    /// Keys by descending count; stable for equal counts.
    pub fn ranked(self) -> Vec<(K, usize)> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

impl<K: PartialEq> FromIterator<K> for Tally<K> {
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let mut tally = Tally::new();
        for key in iter {
            tally.add(key);
        }
        tally
    }
}
