//! # Habitroom Core Library
//!
//! This library provides the core business logic for the Habitroom daily
//! habit tracker. The user sets a daily point goal, registers habits, marks
//! them complete, and closes the day out to move a streak counter, a badge
//! set and a history log. Screens and dialogs are a thin layer over this
//! crate: they call into [`HabitTracker`] and render the [`Event`]s it
//! returns.
//!
//! ## Architecture
//!
//! - **Habit Registry**: today's habits, validated and kept sorted
//! - **Challenge Engine**: one random daily challenge out of a fixed catalog,
//!   each with its own completion predicate
//! - **Progress Calculator**: points, goal percentage and milestones, always
//!   derived from the habit list
//! - **Day/Streak Controller**: day start/end, streaks, badges, history
//! - **Storage**: snapshot gateways (JSON file, SQLite) and TOML configuration
//!
//! ## Key Components
//!
//! - [`HabitTracker`]: the explicit session object
//! - [`ChallengeKind`]: the challenge catalog
//! - [`SnapshotStore`]: persistence contract
//! - [`Config`]: application configuration management

pub mod challenge;
pub mod day;
pub mod error;
pub mod events;
pub mod habit;
pub mod progress;
pub mod stats;
pub mod storage;
pub mod tracker;

pub use challenge::{Challenge, ChallengeDrawer, ChallengeKind, CHALLENGE_BONUS_POINTS};
pub use day::{Badge, DaySession, DaySummary, HistoryRecord, Profile};
pub use error::{
    ConfigError, CoreError, Field, FieldError, InvalidStateError, StorageError, ValidationError,
};
pub use events::{ChallengeStatus, Event};
pub use habit::{Category, Habit, HabitDraft, HabitRegistry, Priority};
pub use progress::{Milestone, Progress};
pub use stats::OverallStats;
pub use storage::{Config, Database, JsonFileStore, MemoryStore, Snapshot, SnapshotStore};
pub use tracker::{HabitTracker, ProgressReport};
