//! Day-session lifecycle, streaks and badges.
//!
//! ## State Transitions
//!
//! ```text
//! Inactive --start_new_day(goal)--> Active --end_day()--> Inactive
//! ```
//!
//! Ending a day appends a history record and moves the streak: a met goal
//! extends it (and may award a badge), a missed goal resets it to zero.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::challenge::Challenge;
use crate::error::{Field, InvalidStateError, ValidationError};
use crate::habit::HabitRegistry;
use crate::progress::{self, Milestone, Progress};

pub const MIN_GOAL: u32 = 1000;
pub const MAX_GOAL: u32 = 9999;

/// Streak achievements. Awarded on an exact streak length, never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Badge {
    Bronze,
    Silver,
    Gold,
}

impl Badge {
    pub const ALL: [Badge; 3] = [Badge::Bronze, Badge::Silver, Badge::Gold];

    pub fn streak_days(&self) -> u32 {
        match self {
            Badge::Bronze => 3,
            Badge::Silver => 7,
            Badge::Gold => 14,
        }
    }

    /// Badge keyed to exactly this streak length, if any.
    pub fn for_streak(streak: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.streak_days() == streak)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Badge::Bronze => "BRONZE",
            Badge::Silver => "SILVER",
            Badge::Gold => "GOLD",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One closed day in the append-only history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub date: NaiveDate,
    pub points_earned: u32,
    pub goal_points: u32,
}

/// State that survives across day-sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub history: Vec<HistoryRecord>,
    pub current_streak: u32,
    pub best_streak: u32,
    pub badges: BTreeSet<Badge>,
    pub active_days: u32,
}

impl Profile {
    /// Apply the streak rules for a closed day.
    ///
    /// Returns the badge newly awarded by this day, if any.
    pub fn record_day(&mut self, record: HistoryRecord) -> Option<Badge> {
        let goal_met = record.points_earned >= record.goal_points;
        self.history.push(record);

        if !goal_met {
            self.current_streak = 0;
            return None;
        }

        self.current_streak += 1;
        self.best_streak = self.best_streak.max(self.current_streak);
        Badge::for_streak(self.current_streak).filter(|badge| self.badges.insert(*badge))
    }
}

/// Transient state of the current day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySession {
    pub goal: u32,
    pub habits: HabitRegistry,
    pub challenge: Option<Challenge>,
    pub active: bool,
    pub shown_milestones: BTreeSet<Milestone>,
}

impl DaySession {
    /// Validate a daily goal (1000..=9999).
    pub fn validate_goal(goal: i64) -> Result<u32, ValidationError> {
        if goal < i64::from(MIN_GOAL) || goal > i64::from(MAX_GOAL) {
            return Err(ValidationError::single(
                Field::Goal,
                format!("Daily goal must be between {MIN_GOAL} and {MAX_GOAL}"),
            ));
        }
        Ok(goal as u32)
    }

    /// Begin a fresh day. Fails without touching anything if a day is active.
    pub fn start(&mut self, goal: u32, challenge: Challenge) -> Result<(), InvalidStateError> {
        if self.active {
            return Err(InvalidStateError::DayAlreadyActive);
        }
        self.goal = goal;
        self.habits.reset_for_new_day();
        self.challenge = Some(challenge);
        self.shown_milestones.clear();
        self.active = true;
        Ok(())
    }

    pub fn ensure_active(&self) -> Result<(), InvalidStateError> {
        if self.active {
            Ok(())
        } else {
            Err(InvalidStateError::DayNotActive)
        }
    }

    /// Re-evaluate the challenge and derive current progress.
    pub fn recompute(&mut self) -> Progress {
        progress::recompute(self.habits.habits(), self.challenge.as_mut(), self.goal)
    }

    /// Current progress without evaluating the challenge.
    pub fn progress(&self) -> Progress {
        Progress::of(self.habits.habits(), self.challenge.as_ref(), self.goal)
    }
}

/// End-of-day report handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub points: u32,
    pub goal: u32,
    pub completion_pct: f64,
    pub goal_met: bool,
    pub current_streak: u32,
    pub best_streak: u32,
    /// Bonus earned from the daily challenge, when it was completed.
    pub challenge_bonus: Option<u32>,
    /// Every badge earned on this installation.
    pub badges: Vec<Badge>,
    /// Badge awarded by this day, if any.
    pub new_badge: Option<Badge>,
}

impl fmt::Display for DaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Day Complete!")?;
        writeln!(f)?;
        writeln!(f, "Points Earned: {}/{}", self.points, self.goal)?;
        writeln!(f, "Completion: {:.2}%", self.completion_pct)?;
        writeln!(f, "Current Streak: {} days", self.current_streak)?;
        if let Some(bonus) = self.challenge_bonus {
            writeln!(f)?;
            writeln!(f, "Daily Challenge Completed! +{bonus} bonus points")?;
        }
        if !self.badges.is_empty() {
            let badges: Vec<&str> = self.badges.iter().map(Badge::label).collect();
            writeln!(f)?;
            write!(f, "Badges Earned: {}", badges.join(", "))?;
        }
        Ok(())
    }
}
