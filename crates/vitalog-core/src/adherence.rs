//! Trailing-window routine adherence.
//!
//! The series builder is pure: the caller resolves checklist snapshots up
//! front (see [`crate::store::prefetch_checklists`]) and hands in a
//! synchronous lookup. Days without a snapshot count as 0%.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::bucket::DayBucket;
use crate::checklist::ChecklistSnapshot;

/// Completion percentage for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdherencePoint {
    pub date: DayBucket,
    /// 0 to 100
    pub value: u8,
}

/// Build one point per day for the last `window_days` days, today included.
///
/// Points are ordered oldest first and the last point is always today's
/// bucket. A zero window yields an empty series.
pub fn build_series<Tz, F>(window_days: u32, now: &DateTime<Tz>, mut fetch: F) -> Vec<AdherencePoint>
where
    Tz: TimeZone,
    F: FnMut(DayBucket) -> Option<ChecklistSnapshot>,
{
    let today = DayBucket::of(now);
    (0..window_days)
        .rev()
        .map(|back| {
            let date = today.sub_days(u64::from(back));
            let value = fetch(date).map(|snap| snap.completion()).unwrap_or(0);
            AdherencePoint { date, value }
        })
        .collect()
}

/// Rounded arithmetic mean of the series, or 0 when it is empty.
pub fn average_adherence(points: &[AdherencePoint]) -> u8 {
    let len = points.len() as u64;
    if len == 0 {
        return 0;
    }
    let sum: u64 = points.iter().map(|p| u64::from(p.value)).sum();
    ((2 * sum + len) / (2 * len)) as u8
}

/// A series plus the figures the adherence screen shows next to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdherenceSummary {
    pub points: Vec<AdherencePoint>,
    pub average: u8,
    /// Highest daily value in the window
    pub best: u8,
    /// Days at 100%
    pub completed_days: u32,
}

impl AdherenceSummary {
    pub fn from_points(points: Vec<AdherencePoint>) -> Self {
        let average = average_adherence(&points);
        let best = points.iter().map(|p| p.value).max().unwrap_or(0);
        let completed_days = points.iter().filter(|p| p.value == 100).count() as u32;
        Self {
            points,
            average,
            best,
            completed_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::RoutineTemplate;
    use chrono::{FixedOffset, Utc};
    use std::collections::HashMap;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 3, 8, 15, 0)
            .unwrap()
    }

    #[test]
    fn seven_day_window_is_oldest_first_and_ends_today() {
        let series = build_series(7, &now(), |_| None);
        assert_eq!(series.len(), 7);
        assert_eq!(series[6].date, DayBucket::of(&now()));
        assert_eq!(series[0].date.to_string(), "2024-02-26");
        for pair in series.windows(2) {
            assert_eq!(pair[0].date.succ(), pair[1].date);
        }
        assert!(series.iter().all(|p| p.value == 0));
    }

    #[test]
    fn today_follows_the_callers_timezone() {
        // 2024-03-03 08:15 at +09:00 is still 2024-03-02 in UTC
        let utc_now = now().with_timezone(&Utc);
        let series = build_series(1, &utc_now, |_| None);
        assert_eq!(series[0].date.to_string(), "2024-03-02");
    }

    #[test]
    fn zero_window_is_empty() {
        assert!(build_series(0, &now(), |_| None).is_empty());
        assert_eq!(average_adherence(&[]), 0);
    }

    #[test]
    fn fetched_snapshots_are_scored() {
        let template = RoutineTemplate::new(["a", "b", "c", "d"]);
        let today = DayBucket::of(&now());
        let mut by_day = HashMap::new();
        by_day.insert(today, template.snapshot(today, ["a", "b", "c", "d"]));
        by_day.insert(today.pred(), template.snapshot(today.pred(), ["a"]));

        let mut calls = Vec::new();
        let series = build_series(3, &now(), |day| {
            calls.push(day);
            by_day.get(&day).cloned()
        });

        let values: Vec<u8> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, [0, 25, 100]);
        assert_eq!(calls.len(), 3);
        assert_eq!(average_adherence(&series), 42);
    }

    #[test]
    fn builder_is_repeatable() {
        let template = RoutineTemplate::default();
        let fetch = |day: DayBucket| Some(template.snapshot(day, ["skin_am", "sunscreen"]));
        assert_eq!(build_series(7, &now(), fetch), build_series(7, &now(), fetch));
    }

    #[test]
    fn average_rounds_half_up() {
        let day = DayBucket::of(&now());
        let points = [
            AdherencePoint { date: day.pred(), value: 50 },
            AdherencePoint { date: day, value: 51 },
        ];
        assert_eq!(average_adherence(&points), 51);
    }

    #[test]
    fn summary_counts_completed_days() {
        let day = DayBucket::of(&now());
        let summary = AdherenceSummary::from_points(vec![
            AdherencePoint { date: day.sub_days(2), value: 100 },
            AdherencePoint { date: day.pred(), value: 40 },
            AdherencePoint { date: day, value: 100 },
        ]);
        assert_eq!(summary.average, 80);
        assert_eq!(summary.best, 100);
        assert_eq!(summary.completed_days, 2);

        let empty = AdherenceSummary::from_points(Vec::new());
        assert_eq!(empty, AdherenceSummary::default());
    }
}
