//! Core error types for vitalog-core.
//!
//! The engine modules (`bucket`, `checklist`, `adherence`, `cadence`,
//! `calendar`) never fail; they apply defined edge-case policies instead.
//! Errors only arise at the edges: human input, the persistence boundary,
//! and configuration files.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for vitalog-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed or out-of-range input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Record absent from the store (e.g. no transformation profile yet)
    #[error("No {kind} found")]
    NotFound { kind: String },

    /// The persistence collaborator failed to read or write
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub fn not_found(kind: impl Into<String>) -> Self {
        CoreError::NotFound { kind: kind.into() }
    }

    /// A missing record means the user has not onboarded yet.
    pub fn needs_onboarding(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }

    /// Whether the caller should offer a retry to the user.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Persistence(_) | CoreError::Io(_))
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Numeric value outside its accepted range
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Date string that could not be parsed
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}

impl ValidationError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Check `value` against an inclusive range.
    pub fn check_range(field: &str, value: i64, min: i64, max: i64) -> Result<(), Self> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field: field.to_string(),
                value,
                min,
                max,
            })
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
