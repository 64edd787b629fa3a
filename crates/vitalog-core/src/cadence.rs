//! Cadence gate for recurring check-style events.
//!
//! A check (e.g. a hairline photo) may be logged only once a minimum number
//! of days has passed since the previous one, and is considered overdue
//! after a maximum. The gate keeps no state: it is rebuilt from the latest
//! event on every query.
//!
//! ## States
//!
//! - **First**: no previous event, logging allowed
//! - **Blocked**: fewer than `min_days` since the last event
//! - **Due**: between `min_days` and `max_days`
//! - **Overdue**: past `max_days`, still allowed

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default spacing for hairline checks.
pub const DEFAULT_MIN_DAYS: i64 = 28;
pub const DEFAULT_MAX_DAYS: i64 = 42;

/// Upper bound accepted for either policy bound (ten years).
pub const MAX_CADENCE_DAYS: i64 = 3650;

/// One logged occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceEvent {
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CadenceEvent {
    pub fn new(occurred_at: DateTime<Utc>) -> Self {
        Self {
            occurred_at,
            notes: None,
        }
    }
}

/// Result of a gate query. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceStatus {
    pub allowed: bool,
    /// Whole days since the last event; `None` when there is none
    pub days_since_last: Option<i64>,
    pub message: String,
    /// Past `max_days`
    pub overdue: bool,
    /// When a blocked gate opens
    pub next_eligible_at: Option<DateTime<Utc>>,
}

/// Minimum and maximum spacing between occurrences, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadencePolicy {
    min_days: i64,
    max_days: i64,
}

impl Default for CadencePolicy {
    fn default() -> Self {
        Self {
            min_days: DEFAULT_MIN_DAYS,
            max_days: DEFAULT_MAX_DAYS,
        }
    }
}

impl CadencePolicy {
    /// # Errors
    /// Returns an error if either bound is outside `0..=MAX_CADENCE_DAYS` or
    /// `min_days > max_days`.
    pub fn new(min_days: i64, max_days: i64) -> Result<Self, ValidationError> {
        ValidationError::check_range("min_days", min_days, 0, MAX_CADENCE_DAYS)?;
        ValidationError::check_range("max_days", max_days, 0, MAX_CADENCE_DAYS)?;
        if max_days < min_days {
            return Err(ValidationError::invalid(
                "max_days",
                format!("must be at least min_days ({min_days})"),
            ));
        }
        Ok(Self { min_days, max_days })
    }

    pub fn min_days(&self) -> i64 {
        self.min_days
    }

    pub fn max_days(&self) -> i64 {
        self.max_days
    }
}

/// A named gate, e.g. "hairline check".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CadenceGate {
    label: String,
    policy: CadencePolicy,
}

impl CadenceGate {
    pub fn new(label: impl Into<String>, policy: CadencePolicy) -> Self {
        Self {
            label: label.into(),
            policy,
        }
    }

    pub fn hairline() -> Self {
        Self::new("hairline check", CadencePolicy::default())
    }

    pub fn policy(&self) -> CadencePolicy {
        self.policy
    }

    /// Evaluate against an event log in any order.
    pub fn check(&self, events: &[CadenceEvent], now: DateTime<Utc>) -> CadenceStatus {
        let last = latest_event(events).map(|e| e.occurred_at);
        self.evaluate(last, now)
    }

    pub fn evaluate(&self, last_event_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> CadenceStatus {
        let Some(last) = last_event_at else {
            return CadenceStatus {
                allowed: true,
                days_since_last: None,
                message: format!("No previous {} recorded. You can log your first one now.", self.label),
                overdue: false,
                next_eligible_at: None,
            };
        };

        let min_days = self.policy.min_days;
        let next_eligible_at = Duration::try_days(min_days).and_then(|d| last.checked_add_signed(d));

        // Last event in the future: clock skew or corrected data. Never open the gate.
        if now < last {
            return CadenceStatus {
                allowed: false,
                days_since_last: Some(0),
                message: format!(
                    "Last {} is dated in the future. Next one available in {} {}.",
                    self.label,
                    min_days.max(1),
                    plural_days(min_days.max(1))
                ),
                overdue: false,
                next_eligible_at,
            };
        }

        let days = (now - last).num_days();
        if days < min_days {
            let remaining = min_days - days;
            return CadenceStatus {
                allowed: false,
                days_since_last: Some(days),
                message: format!(
                    "Too soon for another {}. Next one available in {} {}.",
                    self.label,
                    remaining,
                    plural_days(remaining)
                ),
                overdue: false,
                next_eligible_at,
            };
        }

        let overdue = days > self.policy.max_days;
        let message = if overdue {
            let late = days - self.policy.max_days;
            format!(
                "Your {} is overdue by {} {} ({} days since the last one).",
                self.label,
                late,
                plural_days(late),
                days
            )
        } else {
            format!("Your {} is due ({} days since the last one).", self.label, days)
        };
        CadenceStatus {
            allowed: true,
            days_since_last: Some(days),
            message,
            overdue,
            next_eligible_at: None,
        }
    }
}

/// Two-state gate decision with the default "check" label.
///
/// Negative bounds are treated as 0 and an inverted range simply never
/// reports overdue. Bounds too large for a timestamp leave
/// `next_eligible_at` unset.
pub fn evaluate(
    last_event_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    min_days: i64,
    max_days: i64,
) -> CadenceStatus {
    let min_days = min_days.max(0);
    let policy = CadencePolicy {
        min_days,
        max_days: max_days.max(min_days),
    };
    CadenceGate::new("check", policy).evaluate(last_event_at, now)
}

/// Most recent event of an append-only log.
pub fn latest_event(events: &[CadenceEvent]) -> Option<&CadenceEvent> {
    events.iter().max_by_key(|e| e.occurred_at)
}

fn plural_days(n: i64) -> &'static str {
    if n == 1 {
        "day"
    } else {
        "days"
    }
}
