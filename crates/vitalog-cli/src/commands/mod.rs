pub mod adherence;
pub mod cadence;
pub mod calendar;
pub mod config;
pub mod profile;
pub mod vitals;

use chrono::{DateTime, Duration, Local};
use std::path::{Path, PathBuf};
use vitalog_core::{Config, DayBucket, HealthExport, MemoryStore};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Load the config from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate()?;
    Ok(config)
}

pub fn config_path(path: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(Config::path()?),
    }
}

/// Read an export file and map it with the configured routine.
pub fn load_store(data: &Path, config: &Config) -> Result<MemoryStore, Box<dyn std::error::Error>> {
    tracing::debug!(data = %data.display(), "loading records");
    let export = HealthExport::load(data)?;
    let store = MemoryStore::from_export(export, &config.routine_template());
    if store.skipped() > 0 {
        tracing::warn!(skipped = store.skipped(), data = %data.display(), "skipped malformed records");
    }
    Ok(store)
}

/// Current local time, or midday of `today` when overridden.
pub fn local_now(today: Option<DayBucket>) -> DateTime<Local> {
    match today {
        Some(day) => day.start_in(&Local) + Duration::hours(12),
        None => Local::now(),
    }
}
