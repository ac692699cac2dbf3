//! Core error types for habitroom-core.
//!
//! This module defines the error hierarchy using thiserror. Validation,
//! lookup and state errors are raised before any mutation happens, so the
//! caller can surface them and keep going with an unchanged session.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type for habitroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// One or more input fields were rejected
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Habit index does not exist in today's list
    #[error("Habit {index} not found (today has {len} habits)")]
    NotFound { index: usize, len: usize },

    /// Operation not allowed in the current day state
    #[error("Invalid state: {0}")]
    InvalidState(#[from] InvalidStateError),

    /// Persistence gateway errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Input field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Category,
    Priority,
    Points,
    Goal,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::Name => "name",
            Field::Category => "category",
            Field::Priority => "priority",
            Field::Points => "points",
            Field::Goal => "goal",
        };
        f.write_str(s)
    }
}

/// A single field-scoped validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Validation errors.
///
/// Field checks are independent: a habit with an empty name and
/// out-of-range points reports both.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", format_fields(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

fn format_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field,
                message: message.into(),
            }],
        }
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.fields.iter().any(|e| e.field == field)
    }

    /// Map each field message to a presentation event.
    pub fn to_events(&self) -> Vec<crate::events::Event> {
        self.fields
            .iter()
            .map(|e| crate::events::Event::ValidationFailed {
                field: e.field,
                message: e.message.clone(),
            })
            .collect()
    }
}

/// Day lifecycle violations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidStateError {
    /// No day is active; start a day first
    #[error("no active day, start a day first")]
    DayNotActive,

    /// A day is already running; end it before starting another
    #[error("a day is already active, end it before starting a new one")]
    DayAlreadyActive,
}

/// Persistence gateway errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite errors
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Snapshot names a challenge that is not in the catalog
    #[error("Unknown challenge in snapshot: {0}")]
    UnknownChallenge(String),

    /// Data directory could not be resolved or created
    #[error("Failed to prepare data directory {path}: {message}")]
    DataDir { path: PathBuf, message: String },
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

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
