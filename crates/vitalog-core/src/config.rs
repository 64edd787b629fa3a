//! TOML-based application configuration.
//!
//! Stores:
//! - Adherence window length
//! - Cadence gate bounds and label
//! - Routine checklist keys
//! - Color scheme preference
//!
//! Configuration is stored at `~/.config/vitalog/config.toml`. It is loaded
//! once and passed explicitly to whatever needs it; nothing reads it from
//! ambient state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cadence::{CadenceGate, CadencePolicy, DEFAULT_MAX_DAYS, DEFAULT_MIN_DAYS};
use crate::checklist::{RoutineTemplate, DEFAULT_ROUTINE};
use crate::error::{ConfigError, ValidationError};

/// Adherence series configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdherenceConfig {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_routine")]
    pub routine: Vec<String>,
}

/// Cadence gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CadenceConfig {
    #[serde(default = "default_min_days")]
    pub min_days: i64,
    #[serde(default = "default_max_days")]
    pub max_days: i64,
    #[serde(default = "default_cadence_label")]
    pub label: String,
}

/// Light, dark, or follow the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    Dark,
    #[default]
    System,
}

/// UI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub color_scheme: ColorScheme,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/vitalog/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub adherence: AdherenceConfig,
    #[serde(default)]
    pub cadence: CadenceConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

fn default_window_days() -> u32 {
    7
}
fn default_routine() -> Vec<String> {
    DEFAULT_ROUTINE.iter().map(|k| k.to_string()).collect()
}
fn default_min_days() -> i64 {
    DEFAULT_MIN_DAYS
}
fn default_max_days() -> i64 {
    DEFAULT_MAX_DAYS
}
fn default_cadence_label() -> String {
    "hairline check".into()
}

impl Default for AdherenceConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            routine: default_routine(),
        }
    }
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            min_days: default_min_days(),
            max_days: default_max_days(),
            label: default_cadence_label(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parents) = parents {
            for part in parents.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => value
                .parse::<i64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?,
            serde_json::Value::Array(_) => {
                if value.trim_start().starts_with('[') {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                } else {
                    serde_json::Value::Array(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(|s| serde_json::Value::String(s.to_string()))
                            .collect(),
                    )
                }
            }
            serde_json::Value::Object(_) => serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?,
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Default location: `config.toml` in [`crate::data_dir`].
    pub fn path() -> Result<PathBuf, ConfigError> {
        crate::data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("~/.config/vitalog"),
                message: e.to_string(),
            })
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                tracing::debug!(path = %path.display(), "loaded config");
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config found, writing defaults");
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// The updated config must still deserialize and pass [`Config::validate`].
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.cadence_policy()?;
        if self.adherence.window_days == 0 {
            return Err(ValidationError::invalid("adherence.window_days", "must be at least 1"));
        }
        Ok(())
    }

    /// # Errors
    /// Returns an error if the configured bounds are inconsistent.
    pub fn cadence_policy(&self) -> Result<CadencePolicy, ValidationError> {
        CadencePolicy::new(self.cadence.min_days, self.cadence.max_days)
    }

    pub fn cadence_gate(&self) -> Result<CadenceGate, ValidationError> {
        Ok(CadenceGate::new(self.cadence.label.clone(), self.cadence_policy()?))
    }

    pub fn routine_template(&self) -> RoutineTemplate {
        RoutineTemplate::new(self.adherence.routine.iter().cloned())
    }
}
