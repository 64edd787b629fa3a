//! Persistence boundary.
//!
//! The engine never talks to storage. Callers fetch through a [`HealthStore`]
//! first, then hand the resolved data to the pure builders. [`MemoryStore`]
//! serves a JSON export of the app's records and backs the CLI and tests.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use crate::bucket::DayBucket;
use crate::cadence::CadenceEvent;
use crate::calendar::{MoodEntry, YearMonth};
use crate::checklist::{ChecklistSnapshot, RoutineTemplate};
use crate::error::{CoreError, Result};
use crate::records::{RawCadenceRecord, RawChecklistRecord, RawMoodRecord, TransformationProfile};

/// Read queries the engine's callers need from the persistence layer.
pub trait HealthStore {
    /// Checklist recorded for `day`, if any.
    fn routine_checklist_by_date(&self, day: DayBucket) -> Result<Option<ChecklistSnapshot>>;

    /// Up to `limit` hairline checks, newest first.
    fn hairline_checks(&self, limit: usize) -> Result<Vec<CadenceEvent>>;

    /// Mood entries recorded in `range`, oldest first.
    fn mood_entries(&self, range: Range<DateTime<Utc>>) -> Result<Vec<MoodEntry>>;

    /// The transformation profile, or [`CoreError::NotFound`] before onboarding.
    fn profile(&self) -> Result<TransformationProfile>;
}

/// Resolve one checklist per day of the trailing window ending today.
///
/// The result feeds [`crate::adherence::build_series`] as a plain map lookup.
pub fn prefetch_checklists<S, Tz>(
    store: &S,
    window_days: u32,
    now: &DateTime<Tz>,
) -> Result<BTreeMap<DayBucket, ChecklistSnapshot>>
where
    S: HealthStore + ?Sized,
    Tz: TimeZone,
{
    let today = DayBucket::of(now);
    let mut resolved = BTreeMap::new();
    for back in 0..window_days {
        let day = today.sub_days(u64::from(back));
        if let Some(snapshot) = store.routine_checklist_by_date(day)? {
            resolved.insert(day, snapshot);
        }
    }
    Ok(resolved)
}

/// UTC range covering `month` in `tz`, for [`HealthStore::mood_entries`].
pub fn month_range<Tz: TimeZone>(month: YearMonth, tz: &Tz) -> Range<DateTime<Utc>> {
    let start = month.first_day().start_in(tz).with_timezone(&Utc);
    let end = month.succ().first_day().start_in(tz).with_timezone(&Utc);
    start..end
}

/// Records as exported by the app, before boundary mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthExport {
    #[serde(default)]
    pub profile: Option<Value>,
    #[serde(default)]
    pub routine_checklists: Vec<RawChecklistRecord>,
    #[serde(default)]
    pub hairline_checks: Vec<RawCadenceRecord>,
    #[serde(default)]
    pub mood_entries: Vec<RawMoodRecord>,
}

impl HealthExport {
    /// # Errors
    /// Returns an error if the file cannot be read or is not a JSON export.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Persistence(format!("failed to read {}: {e}", path.display())))?;
        let export = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded health export");
        Ok(export)
    }
}

/// In-memory [`HealthStore`] holding already-mapped records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    profile: Option<TransformationProfile>,
    checklists: BTreeMap<DayBucket, ChecklistSnapshot>,
    hairline_checks: Vec<CadenceEvent>,
    mood_entries: Vec<MoodEntry>,
    skipped: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every exported record, skipping malformed ones.
    ///
    /// Duplicate checklist rows for one day keep the first row. Mood entries
    /// are served sorted by `recorded_at`, so the earliest entry of a day is
    /// the one the calendar shows. Only same-instant entries keep export order.
    pub fn from_export(export: HealthExport, template: &RoutineTemplate) -> Self {
        let mut store = Self::new();

        match export.profile {
            None | Some(Value::Null) => {}
            Some(value) => match serde_json::from_value(value) {
                Ok(profile) => store.profile = Some(profile),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed transformation profile");
                    store.skipped += 1;
                }
            },
        }

        for raw in export.routine_checklists {
            match raw.into_snapshot(template) {
                Ok(snapshot) => {
                    if store.checklists.contains_key(&snapshot.day) {
                        tracing::warn!(day = %snapshot.day, "duplicate checklist row, keeping the first");
                        store.skipped += 1;
                    } else {
                        store.checklists.insert(snapshot.day, snapshot);
                    }
                }
                Err(e) => store.skip("routine checklist", &e),
            }
        }

        for raw in export.hairline_checks {
            match CadenceEvent::try_from(raw) {
                Ok(event) => store.hairline_checks.push(event),
                Err(e) => store.skip("hairline check", &e),
            }
        }
        store.hairline_checks.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

        for raw in export.mood_entries {
            match MoodEntry::try_from(raw) {
                Ok(entry) => store.mood_entries.push(entry),
                Err(e) => store.skip("mood entry", &e),
            }
        }

        tracing::debug!(
            checklists = store.checklists.len(),
            hairline_checks = store.hairline_checks.len(),
            mood_entries = store.mood_entries.len(),
            skipped = store.skipped,
            "mapped health export"
        );
        store
    }

    fn skip(&mut self, kind: &str, error: &dyn std::fmt::Display) {
        tracing::warn!(kind, error = %error, "skipping malformed record");
        self.skipped += 1;
    }

    /// Records dropped while mapping the export.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn set_profile(&mut self, profile: TransformationProfile) {
        self.profile = Some(profile);
    }

    pub fn put_checklist(&mut self, snapshot: ChecklistSnapshot) {
        self.checklists.insert(snapshot.day, snapshot);
    }

    pub fn log_hairline_check(&mut self, event: CadenceEvent) {
        let at = self
            .hairline_checks
            .partition_point(|e| e.occurred_at >= event.occurred_at);
        self.hairline_checks.insert(at, event);
    }

    pub fn add_mood_entry(&mut self, entry: MoodEntry) {
        self.mood_entries.push(entry);
    }
}

impl HealthStore for MemoryStore {
    fn routine_checklist_by_date(&self, day: DayBucket) -> Result<Option<ChecklistSnapshot>> {
        Ok(self.checklists.get(&day).cloned())
    }

    fn hairline_checks(&self, limit: usize) -> Result<Vec<CadenceEvent>> {
        Ok(self.hairline_checks.iter().take(limit).cloned().collect())
    }

    fn mood_entries(&self, range: Range<DateTime<Utc>>) -> Result<Vec<MoodEntry>> {
        let mut entries: Vec<MoodEntry> = self
            .mood_entries
            .iter()
            .filter(|e| range.contains(&e.recorded_at))
            .cloned()
            .collect();
        // stable: same-instant entries keep export order
        entries.sort_by_key(|e| e.recorded_at);
        Ok(entries)
    }

    fn profile(&self) -> Result<TransformationProfile> {
        self.profile
            .clone()
            .ok_or_else(|| CoreError::not_found("transformation profile"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::build_month_grid;
    use chrono::{Duration, FixedOffset};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 18, 0, 0).unwrap()
    }

    fn export() -> HealthExport {
        serde_json::from_value(json!({
            "profile": { "display_name": "Sam", "goal_weight_kg": 78.5 },
            "routine_checklists": [
                { "date": "2024-04-10", "skin_am": 1, "skin_pm": 1 },
                { "date": "2024-04-10", "skin_am": 0 },
                { "date": "2024-04-08", "sunscreen": true },
                { "date": "not-a-date", "skin_am": 1 }
            ],
            "hairline_checks": [
                { "checked_at": "2024-02-01T09:00:00Z" },
                { "checked_at": "2024-03-20T09:00:00Z", "notes": "temples stable" },
                { "checked_at": "garbage" }
            ],
            "mood_entries": [
                { "date": "2024-04-03T10:00:00Z", "mood": "calm" },
                { "date": "2024-03-31T10:00:00Z", "mood": "tired" },
                { "date": "2024-04-05T10:00:00Z" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn from_export_maps_and_skips() {
        let store = MemoryStore::from_export(export(), &RoutineTemplate::default());
        // duplicate day, bad date, bad timestamp, missing mood
        assert_eq!(store.skipped(), 4);

        let today = DayBucket::from_ymd(2024, 4, 10).unwrap();
        let snap = store.routine_checklist_by_date(today).unwrap().unwrap();
        assert_eq!(snap.is_done("skin_am"), Some(true));
        assert_eq!(snap.completion(), 29);
        assert!(store.routine_checklist_by_date(today.pred()).unwrap().is_none());
    }

    #[test]
    fn hairline_checks_are_newest_first() {
        let mut store = MemoryStore::from_export(export(), &RoutineTemplate::default());
        let checks = store.hairline_checks(10).unwrap();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].notes.as_deref(), Some("temples stable"));

        store.log_hairline_check(CadenceEvent::new(now()));
        let latest = store.hairline_checks(1).unwrap();
        assert_eq!(latest, vec![CadenceEvent::new(now())]);
    }

    #[test]
    fn mood_entries_filtered_by_range() {
        let store = MemoryStore::from_export(export(), &RoutineTemplate::default());
        let april = month_range(YearMonth::new(2024, 4).unwrap(), &Utc);
        let entries = store.mood_entries(april).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mood_label, "calm");
    }

    #[test]
    fn earliest_same_day_mood_wins_regardless_of_export_order() {
        let export: HealthExport = serde_json::from_value(json!({
            "mood_entries": [
                { "date": "2024-04-03T18:00:00Z", "mood": "stressed" },
                { "date": "2024-04-03T12:00:00Z", "mood": "good" },
                { "date": "2024-04-04T09:00:00Z", "mood": "calm" },
                { "date": "2024-04-04T09:00:00Z", "mood": "tired" }
            ]
        }))
        .unwrap();
        let store = MemoryStore::from_export(export, &RoutineTemplate::default());
        let month = YearMonth::new(2024, 4).unwrap();
        let entries = store.mood_entries(month_range(month, &Utc)).unwrap();
        let labels: Vec<&str> = entries.iter().map(|e| e.mood_label.as_str()).collect();
        assert_eq!(labels, ["good", "stressed", "calm", "tired"]);

        let grid = build_month_grid(month, &entries, &now());
        let cell = |d: u32| {
            let day = DayBucket::from_ymd(2024, 4, d).unwrap();
            grid.iter().flatten().find(|c| c.date == Some(day)).unwrap().clone()
        };
        assert_eq!(cell(3).mood_label.as_deref(), Some("good"));
        assert_eq!(cell(4).mood_label.as_deref(), Some("calm"));
    }

    #[test]
    fn store_built_in_memory_serves_queries() {
        let mut store = MemoryStore::new();
        let today = DayBucket::of(&now());
        let template = RoutineTemplate::default();

        store.set_profile(TransformationProfile {
            display_name: Some("Alex".into()),
            goal_weight_kg: Some(72.0),
            ..TransformationProfile::default()
        });
        store.put_checklist(template.snapshot(today, ["skin_am", "sunscreen"]));
        store.put_checklist(template.snapshot(today, ["skin_am"]));
        store.add_mood_entry(MoodEntry {
            recorded_at: now(),
            mood_label: "upbeat".into(),
        });
        store.add_mood_entry(MoodEntry {
            recorded_at: now() - Duration::hours(6),
            mood_label: "groggy".into(),
        });

        assert_eq!(store.profile().unwrap().display_name.as_deref(), Some("Alex"));
        assert_eq!(store.skipped(), 0);

        // later puts replace the day's snapshot
        let snap = store.routine_checklist_by_date(today).unwrap().unwrap();
        assert_eq!(snap.is_done("sunscreen"), Some(false));
        assert_eq!(snap.completion(), 14);

        let resolved = prefetch_checklists(&store, 7, &now()).unwrap();
        assert_eq!(resolved.len(), 1);

        let entries = store.mood_entries(now() - Duration::days(1)..now() + Duration::days(1)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].mood_label, "groggy");
    }

    #[test]
    fn month_range_respects_timezone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let range = month_range(YearMonth::new(2024, 4).unwrap(), &tz);
        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 3, 31, 22, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2024, 4, 30, 22, 0, 0).unwrap());
    }

    #[test]
    fn missing_profile_needs_onboarding() {
        let store = MemoryStore::new();
        let err = store.profile().unwrap_err();
        assert!(err.needs_onboarding());

        let store = MemoryStore::from_export(export(), &RoutineTemplate::default());
        assert_eq!(store.profile().unwrap().display_name.as_deref(), Some("Sam"));
    }

    #[test]
    fn prefetch_covers_window_only() {
        let store = MemoryStore::from_export(export(), &RoutineTemplate::default());
        let resolved = prefetch_checklists(&store, 2, &now()).unwrap();
        assert_eq!(resolved.len(), 1);

        let resolved = prefetch_checklists(&store, 7, &now()).unwrap();
        assert_eq!(resolved.len(), 2);

        let resolved = prefetch_checklists(&store, 7, &(now() + Duration::days(30))).unwrap();
        assert!(resolved.is_empty());
    }
}
