//! # Vitalog Core Library
//!
//! This library provides the computation layer behind Vitalog's routine,
//! mood and check-in screens. Screens fetch records from the persistence
//! layer, then call into this crate synchronously; nothing here performs
//! I/O except the explicit store and config loaders.
//!
//! ## Architecture
//!
//! - **Bucketing**: timestamps truncated to local calendar days
//! - **Adherence**: per-day checklist completion over a trailing window
//! - **Cadence**: minimum/maximum spacing gate for recurring checks
//! - **Calendar**: Sunday-first month grids of mood entries
//! - **Store**: the persistence boundary and record mapping
//!
//! ## Key Components
//!
//! - [`DayBucket`]: aggregation key for all time series
//! - [`build_series`]: trailing adherence series
//! - [`CadenceGate`]: two-state cadence decision
//! - [`build_month_grid`]: mood calendar grid
//! - [`HealthStore`]: read contract for the persistence layer
//! - [`Config`]: application configuration management

pub mod adherence;
pub mod bucket;
pub mod cadence;
pub mod calendar;
pub mod checklist;
pub mod config;
pub mod error;
pub mod records;
pub mod store;
pub mod vitals;

pub use adherence::{average_adherence, build_series, AdherencePoint, AdherenceSummary};
pub use bucket::{bucket_of, DayBucket};
pub use cadence::{evaluate, latest_event, CadenceEvent, CadenceGate, CadencePolicy, CadenceStatus};
pub use calendar::{build_month_grid, CalendarDay, MoodEntry, Week, YearMonth};
pub use checklist::{completion_ratio, ChecklistItem, ChecklistSnapshot, RoutineTemplate};
pub use config::{ColorScheme, Config};
pub use error::{ConfigError, CoreError, ValidationError};
pub use records::TransformationProfile;
pub use store::{month_range, prefetch_checklists, HealthExport, HealthStore, MemoryStore};
pub use vitals::{BpCategory, BpReading};

use std::path::PathBuf;

/// Returns `~/.config/vitalog[-dev]/` based on VITALOG_ENV.
///
/// Set VITALOG_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("VITALOG_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("vitalog-dev")
    } else {
        base_dir.join("vitalog")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
