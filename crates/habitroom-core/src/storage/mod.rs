//! Persistence: snapshot gateways and application configuration.

mod config;
pub mod database;
pub mod json_store;

pub use config::{Config, StorageBackend, Theme};
pub use database::Database;
pub use json_store::JsonFileStore;

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::challenge::Challenge;
use crate::day::{Badge, DaySession, HistoryRecord, Profile};
use crate::error::StorageError;
use crate::habit::{Habit, HabitRegistry};
use crate::progress::Milestone;

/// Returns `~/.config/habitroom[-dev]/` based on HABITROOM_ENV.
///
/// Set HABITROOM_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABITROOM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("habitroom-dev")
    } else {
        base_dir.join("habitroom")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// Everything persisted between runs: the profile plus the current day.
///
/// Field names match the snapshot format used by earlier versions of the
/// tracker. Every field is optional on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub habits: Vec<Habit>,
    pub daily_challenge: Option<Challenge>,
    pub daily_goal: u32,
    /// Written for readers of the file; recomputed on load.
    pub current_points: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub badges: BTreeSet<Badge>,
    pub history: Vec<HistoryRecord>,
    pub day_started: bool,
    pub active_days: u32,
    pub shown_milestones: BTreeSet<Milestone>,
}

impl Snapshot {
    pub fn capture(profile: &Profile, session: &DaySession) -> Self {
        Self {
            habits: session.habits.habits().to_vec(),
            daily_challenge: session.challenge,
            daily_goal: session.goal,
            current_points: session.progress().points(),
            current_streak: profile.current_streak,
            best_streak: profile.best_streak,
            badges: profile.badges.clone(),
            history: profile.history.clone(),
            day_started: session.active,
            active_days: profile.active_days,
            shown_milestones: session.shown_milestones.clone(),
        }
    }

    pub fn restore(self) -> (Profile, DaySession) {
        let profile = Profile {
            history: self.history,
            current_streak: self.current_streak,
            // best is a running max of current
            best_streak: self.best_streak.max(self.current_streak),
            badges: self.badges,
            active_days: self.active_days,
        };
        let session = DaySession {
            goal: self.daily_goal,
            habits: HabitRegistry::from_habits(self.habits),
            challenge: self.daily_challenge,
            active: self.day_started,
            shown_milestones: self.shown_milestones,
        };
        (profile, session)
    }
}

/// Persistence gateway.
///
/// `load` returning `Ok(None)` means first run.
pub trait SnapshotStore {
    fn load(&self) -> Result<Option<Snapshot>, StorageError>;
    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError>;
}

/// In-process store holding the serialized snapshot.
///
/// Keeps the JSON text rather than the value so the wire format is
/// exercised the same way the file store does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    json: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw snapshot JSON.
    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: RefCell::new(Some(json.into())),
        }
    }

    pub fn json(&self) -> Option<String> {
        self.json.borrow().clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        match self.json.borrow().as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let json = serde_json::to_string(snapshot)?;
        *self.json.borrow_mut() = Some(json);
        Ok(())
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        (**self).save(snapshot)
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        (**self).save(snapshot)
    }
}

/// Open the store selected by the configuration, under the data directory.
pub fn open_configured(config: &Config) -> Result<Box<dyn SnapshotStore>, StorageError> {
    let dir = data_dir()?;
    let store: Box<dyn SnapshotStore> = match config.storage.backend {
        StorageBackend::Json => Box::new(JsonFileStore::new(dir.join(json_store::SNAPSHOT_FILE))),
        StorageBackend::Sqlite => Box::new(Database::open_at(&dir.join(database::DB_FILE))?),
    };
    Ok(store)
}
