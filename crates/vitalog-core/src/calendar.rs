//! Mood calendar month grid.
//!
//! Weeks start on Sunday. Cells before the 1st and after the last day of the
//! month are padding (`date == None`), so every row has exactly seven cells.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::bucket::DayBucket;
use crate::error::ValidationError;

/// A calendar month, serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// # Errors
    /// Returns an error if `month` is not 1 to 12 or the year is out of range.
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        ValidationError::check_range("month", i64::from(month), 1, 12)?;
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(ValidationError::invalid("year", format!("{year} is out of range")));
        }
        Ok(Self { year, month })
    }

    /// Month containing `t`, in `t`'s timezone.
    pub fn containing<Tz: TimeZone>(t: &DateTime<Tz>) -> Self {
        let date = t.date_naive();
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> DayBucket {
        DayBucket::from_ymd(self.year, self.month, 1).unwrap_or_else(|| DayBucket::new(NaiveDate::MIN))
    }

    pub fn days_in_month(&self) -> u32 {
        let (y, m) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        match NaiveDate::from_ymd_opt(y, m, 1) {
            Some(next) => next.pred_opt().map(|d| d.day()).unwrap_or(31),
            None => 31,
        }
    }

    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn pred(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ValidationError::invalid("month", format!("'{s}' is not YYYY-MM"));
        let (y, m) = s.trim().split_once('-').ok_or_else(bad)?;
        let year = y.parse::<i32>().map_err(|_| bad())?;
        let month = m.parse::<u32>().map_err(|_| bad())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<YearMonth> for String {
    fn from(month: YearMonth) -> Self {
        month.to_string()
    }
}

/// A dated mood journal entry, as consumed by the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub recorded_at: DateTime<Utc>,
    pub mood_label: String,
}

/// One cell of the month grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// `None` for padding cells
    pub date: Option<DayBucket>,
    pub has_entry: bool,
    pub mood_label: Option<String>,
    pub is_today: bool,
}

impl CalendarDay {
    pub fn is_padding(&self) -> bool {
        self.date.is_none()
    }
}

pub type Week = [CalendarDay; 7];

/// Build the Sunday-first week rows for `month`.
///
/// Entries are bucketed in `now`'s timezone. When several entries fall on the
/// same day the first one in `entries` wins. The result has 4 to 6 rows.
pub fn build_month_grid<Tz: TimeZone>(
    month: YearMonth,
    entries: &[MoodEntry],
    now: &DateTime<Tz>,
) -> Vec<Week> {
    let tz = now.timezone();
    let today = DayBucket::of(now);

    let mut by_day: HashMap<DayBucket, &str> = HashMap::new();
    for entry in entries {
        let day = DayBucket::of(&entry.recorded_at.with_timezone(&tz));
        by_day.entry(day).or_insert(entry.mood_label.as_str());
    }

    let first = month.first_day();
    let leading = first.date().weekday().num_days_from_sunday() as usize;

    let mut cells: Vec<CalendarDay> = Vec::with_capacity(42);
    cells.resize(leading, CalendarDay::default());

    let mut day = first;
    for _ in 0..month.days_in_month() {
        let label = by_day.get(&day).copied();
        cells.push(CalendarDay {
            date: Some(day),
            has_entry: label.is_some(),
            mood_label: label.map(str::to_string),
            is_today: day == today,
        });
        day = day.succ();
    }

    let trailing = (7 - cells.len() % 7) % 7;
    cells.resize(cells.len() + trailing, CalendarDay::default());

    cells
        .chunks(7)
        .map(|row| std::array::from_fn(|i| row[i].clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn entry(at: DateTime<Utc>, label: &str) -> MoodEntry {
        MoodEntry {
            recorded_at: at,
            mood_label: label.to_string(),
        }
    }

    fn dated(grid: &[Week]) -> Vec<&CalendarDay> {
        grid.iter().flatten().filter(|c| !c.is_padding()).collect()
    }

    #[test]
    fn thirty_day_month_starting_wednesday_has_five_rows() {
        // September 2021 starts on a Wednesday
        let month = YearMonth::new(2021, 9).unwrap();
        let now = utc(2021, 9, 14, 10);
        let grid = build_month_grid(month, &[], &now);

        assert_eq!(grid.len(), 5);
        assert_eq!(grid[0].iter().take_while(|c| c.is_padding()).count(), 3);
        assert_eq!(grid[0][3].date.map(|d| d.to_string()).as_deref(), Some("2021-09-01"));
        assert_eq!(dated(&grid).len(), 30);
        assert_eq!(grid.iter().flatten().filter(|c| c.is_today).count(), 1);
        let today = grid.iter().flatten().find(|c| c.is_today).unwrap();
        assert_eq!(today.date.map(|d| d.to_string()).as_deref(), Some("2021-09-14"));
    }

    #[test]
    fn row_count_ranges_from_four_to_six() {
        let now = utc(2000, 1, 1, 0);
        // February 2015: 28 days starting Sunday
        assert_eq!(build_month_grid(YearMonth::new(2015, 2).unwrap(), &[], &now).len(), 4);
        // August 2020: 31 days starting Saturday
        assert_eq!(build_month_grid(YearMonth::new(2020, 8).unwrap(), &[], &now).len(), 6);
        for m in 1..=12 {
            let rows = build_month_grid(YearMonth::new(2024, m).unwrap(), &[], &now).len();
            assert!((4..=6).contains(&rows), "month {m} has {rows} rows");
        }
    }

    #[test]
    fn no_today_outside_the_month() {
        let grid = build_month_grid(YearMonth::new(2021, 9).unwrap(), &[], &utc(2021, 10, 1, 0));
        assert!(grid.iter().flatten().all(|c| !c.is_today));
    }

    #[test]
    fn entries_match_by_day_and_first_wins() {
        let month = YearMonth::new(2024, 2).unwrap();
        let entries = vec![
            entry(utc(2024, 2, 10, 8), "calm"),
            entry(utc(2024, 2, 10, 21), "anxious"),
            entry(utc(2024, 2, 29, 12), "happy"),
            entry(utc(2024, 3, 1, 12), "elsewhere"),
        ];
        let grid = build_month_grid(month, &entries, &utc(2024, 2, 20, 0));
        let cells = dated(&grid);

        let tenth = cells[9];
        assert!(tenth.has_entry);
        assert_eq!(tenth.mood_label.as_deref(), Some("calm"));

        let last = cells[28];
        assert_eq!(last.mood_label.as_deref(), Some("happy"));

        assert_eq!(cells.iter().filter(|c| c.has_entry).count(), 2);
        assert!(cells.iter().filter(|c| !c.has_entry).all(|c| c.mood_label.is_none()));
    }

    #[test]
    fn entries_are_bucketed_in_local_time() {
        // 2024-02-10 23:30 at -05:00 is 2024-02-11 04:30 UTC
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 2, 15, 9, 0, 0).unwrap();
        let recorded = tz.with_ymd_and_hms(2024, 2, 10, 23, 30, 0).unwrap().with_timezone(&Utc);
        let grid = build_month_grid(YearMonth::new(2024, 2).unwrap(), &[entry(recorded, "tired")], &now);
        let cells = dated(&grid);
        assert!(cells[9].has_entry);
        assert!(!cells[10].has_entry);
    }

    #[test]
    fn rows_are_always_full() {
        let now = utc(2024, 1, 1, 0);
        let grid = build_month_grid(YearMonth::new(2024, 1).unwrap(), &[], &now);
        let last_row = grid.last().unwrap();
        // January 2024 ends on a Wednesday
        assert_eq!(last_row.iter().filter(|c| c.is_padding()).count(), 3);
    }

    #[test]
    fn builder_is_repeatable() {
        let month = YearMonth::new(2024, 5).unwrap();
        let now = utc(2024, 5, 3, 0);
        let entries = vec![entry(now - Duration::days(1), "ok")];
        assert_eq!(
            build_month_grid(month, &entries, &now),
            build_month_grid(month, &entries, &now)
        );
    }

    #[test]
    fn year_month_parsing_and_navigation() {
        let ym: YearMonth = "2024-12".parse().unwrap();
        assert_eq!(ym.days_in_month(), 31);
        assert_eq!(ym.succ().to_string(), "2025-01");
        assert_eq!(ym.succ().pred(), ym);
        assert_eq!(YearMonth::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(2024, 2).unwrap().days_in_month(), 29);
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("2024".parse::<YearMonth>().is_err());
        assert!(YearMonth::new(2024, 0).is_err());
    }

    #[test]
    fn year_month_deserialize_validates() {
        let ym: YearMonth = serde_json::from_str("\"2024-05\"").unwrap();
        assert_eq!(ym, YearMonth::new(2024, 5).unwrap());
        assert_eq!(serde_json::to_string(&ym).unwrap(), "\"2024-05\"");

        assert!(serde_json::from_str::<YearMonth>("\"2024-13\"").is_err());
        assert!(serde_json::from_str::<YearMonth>(r#"{"year":2024,"month":13}"#).is_err());
    }
}
