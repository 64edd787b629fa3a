//! Routine checklist snapshots and the completion ratio.

use serde::{Deserialize, Serialize};

use crate::bucket::DayBucket;

/// One named routine flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub key: String,
    pub done: bool,
}

impl ChecklistItem {
    pub fn new(key: impl Into<String>, done: bool) -> Self {
        Self {
            key: key.into(),
            done,
        }
    }
}

/// The routine flags recorded for one day, in template order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistSnapshot {
    pub day: DayBucket,
    pub items: Vec<ChecklistItem>,
}

impl ChecklistSnapshot {
    pub fn new(day: DayBucket, items: Vec<ChecklistItem>) -> Self {
        Self { day, items }
    }

    pub fn flags(&self) -> impl Iterator<Item = bool> + '_ {
        self.items.iter().map(|item| item.done)
    }

    pub fn is_done(&self, key: &str) -> Option<bool> {
        self.items.iter().find(|item| item.key == key).map(|item| item.done)
    }

    /// Completion percentage for this day.
    pub fn completion(&self) -> u8 {
        let flags: Vec<bool> = self.flags().collect();
        completion_ratio(&flags)
    }
}

/// `round(100 * done / total)`, or 0 when there are no flags.
///
/// Halves round up, so 1 of 8 yields 13.
pub fn completion_ratio(flags: &[bool]) -> u8 {
    let total = flags.len() as u64;
    if total == 0 {
        return 0;
    }
    let done = flags.iter().filter(|&&f| f).count() as u64;
    ((200 * done + total) / (2 * total)) as u8
}

/// Ordered set of routine keys a day is expected to cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineTemplate {
    keys: Vec<String>,
}

/// Default daily routine: skin care, hair care, grooming.
pub const DEFAULT_ROUTINE: [&str; 7] = [
    "skin_am",
    "skin_pm",
    "sunscreen",
    "retinol",
    "hair_wash",
    "conditioner",
    "beard_oil",
];

impl Default for RoutineTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTINE)
    }
}

impl RoutineTemplate {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = Vec::new();
        for key in keys {
            let key = key.into();
            if !seen.contains(&key) {
                seen.push(key);
            }
        }
        Self { keys: seen }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// All-false snapshot, used for days with no record.
    pub fn blank(&self, day: DayBucket) -> ChecklistSnapshot {
        ChecklistSnapshot::new(
            day,
            self.keys.iter().map(|k| ChecklistItem::new(k.clone(), false)).collect(),
        )
    }

    /// Snapshot with exactly this template's keys, in template order.
    ///
    /// Keys missing from `done` are false; keys not in the template are dropped.
    pub fn snapshot<'a, I>(&self, day: DayBucket, done: I) -> ChecklistSnapshot
    where
        I: IntoIterator<Item = &'a str>,
    {
        let done: Vec<&str> = done.into_iter().collect();
        ChecklistSnapshot::new(
            day,
            self.keys
                .iter()
                .map(|k| ChecklistItem::new(k.clone(), done.contains(&k.as_str())))
                .collect(),
        )
    }
}
