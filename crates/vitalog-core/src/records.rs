//! Boundary mapping from persisted record shapes to typed entities.
//!
//! The storage layer hands back loosely typed rows: booleans stored as
//! `0`/`1`, timestamps as RFC 3339 strings, SQLite `datetime()` text or epoch
//! milliseconds, plus bookkeeping columns the engine does not care about.
//! Everything is normalized here so the engine only ever sees the types in
//! [`crate::checklist`], [`crate::cadence`] and [`crate::calendar`].

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bucket::DayBucket;
use crate::cadence::CadenceEvent;
use crate::calendar::MoodEntry;
use crate::checklist::{ChecklistItem, ChecklistSnapshot, RoutineTemplate};
use crate::error::ValidationError;

/// Columns every stored row may carry that are not routine flags.
const BOOKKEEPING_COLUMNS: [&str; 4] = ["id", "created_at", "updated_at", "notes"];

/// A routine checklist row keyed by its `date` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChecklistRecord {
    pub date: String,
    #[serde(flatten)]
    pub columns: Map<String, Value>,
}

/// A hairline check row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCadenceRecord {
    #[serde(alias = "checked_at", alias = "date")]
    pub occurred_at: Value,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A mood journal row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMoodRecord {
    #[serde(alias = "date", alias = "created_at")]
    pub recorded_at: Value,
    #[serde(alias = "mood")]
    pub mood_label: Option<String>,
}

/// Transformation profile; its absence means onboarding has not happened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformationProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub current_weight_kg: Option<f64>,
    #[serde(default)]
    pub goal_weight_kg: Option<f64>,
    #[serde(default)]
    pub goal_body_fat_pct: Option<f64>,
}

impl RawChecklistRecord {
    /// Map onto `template`. Template keys without a column are false; columns
    /// outside the template are ignored.
    ///
    /// # Errors
    /// Returns an error if the date is malformed or a flag column holds
    /// something other than a boolean, a number, or null.
    pub fn into_snapshot(self, template: &RoutineTemplate) -> Result<ChecklistSnapshot, ValidationError> {
        let day: DayBucket = self.date.parse()?;

        for key in self.columns.keys() {
            if !template.keys().contains(key) && !BOOKKEEPING_COLUMNS.contains(&key.as_str()) {
                tracing::debug!(%day, column = %key, "ignoring checklist column outside routine template");
            }
        }

        let items = template
            .keys()
            .iter()
            .map(|key| {
                let done = match self.columns.get(key) {
                    None => false,
                    Some(value) => flag(key, value)?,
                };
                Ok(ChecklistItem::new(key.clone(), done))
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(ChecklistSnapshot::new(day, items))
    }
}

impl TryFrom<RawCadenceRecord> for CadenceEvent {
    type Error = ValidationError;

    fn try_from(raw: RawCadenceRecord) -> Result<Self, Self::Error> {
        Ok(CadenceEvent {
            occurred_at: timestamp("occurred_at", &raw.occurred_at)?,
            notes: raw.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

impl TryFrom<RawMoodRecord> for MoodEntry {
    type Error = ValidationError;

    fn try_from(raw: RawMoodRecord) -> Result<Self, Self::Error> {
        let mood_label = raw
            .mood_label
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .ok_or_else(|| ValidationError::invalid("mood_label", "missing or empty"))?;
        Ok(MoodEntry {
            recorded_at: timestamp("recorded_at", &raw.recorded_at)?,
            mood_label,
        })
    }
}

/// Interpret a stored flag. Any non-zero number counts as done.
fn flag(field: &str, value: &Value) -> Result<bool, ValidationError> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        other => Err(ValidationError::invalid(
            field,
            format!("expected boolean or 0/1, got {other}"),
        )),
    }
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 strings, SQLite `YYYY-MM-DD HH:MM:SS` text (UTC), and
/// integer epoch milliseconds.
pub fn timestamp(field: &str, value: &Value) -> Result<DateTime<Utc>, ValidationError> {
    let bad = |detail: String| ValidationError::invalid(field, detail);
    match value {
        Value::String(s) => {
            if let Ok(t) = DateTime::parse_from_rfc3339(s) {
                return Ok(t.with_timezone(&Utc));
            }
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|naive| Utc.from_utc_datetime(&naive))
                .map_err(|_| bad(format!("'{s}' is not a recognized timestamp")))
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| bad(format!("{n} is not a valid epoch millisecond value"))),
        other => Err(bad(format!("expected timestamp, got {other}"))),
    }
}
