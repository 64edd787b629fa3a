//! Day bucketing.
//!
//! Every time series in the engine is keyed by the local calendar day a
//! timestamp falls on. [`DayBucket`] is that key; [`bucket_of`] is the same
//! idea expressed as a timestamp truncated to local midnight.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// One local calendar day.
///
/// Two timestamps in the same local day always produce equal buckets, so
/// lookups compare buckets by value, never the original timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayBucket(NaiveDate);

impl DayBucket {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Bucket containing `t`, in `t`'s own timezone.
    pub fn of<Tz: TimeZone>(t: &DateTime<Tz>) -> Self {
        Self(t.date_naive())
    }

    /// Build from calendar fields; `None` when the date does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// The first instant of this day in `tz`.
    ///
    /// Normally local midnight. When a DST transition skips midnight the
    /// earliest valid local instant of the day is returned instead.
    pub fn start_in<Tz: TimeZone>(self, tz: &Tz) -> DateTime<Tz> {
        let midnight = self.0.and_time(NaiveTime::MIN);
        if let Some(start) = tz.from_local_datetime(&midnight).earliest() {
            return start;
        }
        (1..=24 * 60)
            .find_map(|minutes| {
                tz.from_local_datetime(&(midnight + Duration::minutes(minutes)))
                    .earliest()
            })
            .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
    }

    /// The previous day, saturating at the earliest representable date.
    pub fn pred(self) -> Self {
        self.sub_days(1)
    }

    /// The next day, saturating at the latest representable date.
    pub fn succ(self) -> Self {
        Self(self.0.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX))
    }

    pub fn sub_days(self, days: u64) -> Self {
        Self(self.0.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN))
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(self, other: DayBucket) -> i64 {
        (other.0 - self.0).num_days()
    }
}

impl From<NaiveDate> for DayBucket {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DayBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayBucket {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate(s.to_string()))
    }
}

/// Truncate `t` to the start of its local day.
///
/// Idempotent: `bucket_of(&bucket_of(&t)) == bucket_of(&t)`.
pub fn bucket_of<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    DayBucket::of(t).start_in(&t.timezone())
}
