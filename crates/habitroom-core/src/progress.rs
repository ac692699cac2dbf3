//! Points, goal percentage and milestone detection.
//!
//! Points are never stored: they are derived from the habit list and the
//! challenge state every time they are needed.

use std::collections::BTreeSet;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::challenge::Challenge;
use crate::habit::Habit;

/// Completion thresholds announced once per day-session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Milestone {
    Half,
    EightyPercent,
    GoalReached,
}

impl Milestone {
    pub const ALL: [Milestone; 3] = [
        Milestone::Half,
        Milestone::EightyPercent,
        Milestone::GoalReached,
    ];

    /// Threshold in percent of the daily goal.
    pub fn threshold(&self) -> u8 {
        match self {
            Milestone::Half => 50,
            Milestone::EightyPercent => 80,
            Milestone::GoalReached => 100,
        }
    }

    pub fn from_threshold(threshold: u64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| u64::from(m.threshold()) == threshold)
    }

    pub fn message(&self) -> &'static str {
        match self {
            Milestone::Half => "50% Milestone Reached!",
            Milestone::EightyPercent => "80% Milestone Reached!",
            Milestone::GoalReached => "100% Goal Achieved!",
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.threshold())
    }
}

// On the wire a milestone is its threshold. Older snapshots stored the
// threshold as a string ("50"), so both forms are accepted.
impl Serialize for Milestone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.threshold())
    }
}

impl<'de> Deserialize<'de> for Milestone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ThresholdVisitor;

        impl Visitor<'_> for ThresholdVisitor {
            type Value = Milestone;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a milestone threshold (50, 80 or 100)")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Milestone, E> {
                Milestone::from_threshold(v)
                    .ok_or_else(|| E::custom(format!("unknown milestone threshold {v}")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Milestone, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom(format!("unknown milestone threshold {v}")))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Milestone, E> {
                let n = v
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| E::custom(format!("unknown milestone threshold '{v}'")))?;
                self.visit_u64(n)
            }
        }

        deserializer.deserialize_any(ThresholdVisitor)
    }
}

/// Derived progress of a day-session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Completed habit points, bonus excluded.
    pub base_points: u32,
    /// Challenge bonus currently earned.
    pub bonus_points: u32,
    pub goal: u32,
}

impl Progress {
    /// Pure derivation from the habit list and challenge state.
    pub fn of(habits: &[Habit], challenge: Option<&Challenge>, goal: u32) -> Self {
        Self {
            base_points: base_points(habits),
            bonus_points: challenge.map(Challenge::earned_bonus).unwrap_or(0),
            goal,
        }
    }

    pub fn points(&self) -> u32 {
        self.base_points + self.bonus_points
    }

    pub fn percentage(&self) -> f64 {
        percentage(self.points(), self.goal)
    }

    pub fn goal_met(&self) -> bool {
        self.points() >= self.goal
    }
}

/// Sum of completed habits' points.
pub fn base_points(habits: &[Habit]) -> u32 {
    habits.iter().filter(|h| h.completed).map(|h| h.points).sum()
}

/// Evaluate the challenge against the habits, then derive progress.
///
/// The challenge sees the total without its own bonus.
pub fn recompute(habits: &[Habit], challenge: Option<&mut Challenge>, goal: u32) -> Progress {
    let base = base_points(habits);
    let bonus = match challenge {
        Some(challenge) => {
            if challenge.evaluate(habits, base) {
                tracing::debug!(challenge = challenge.description(), "daily challenge completed");
            }
            challenge.earned_bonus()
        }
        None => 0,
    };
    Progress {
        base_points: base,
        bonus_points: bonus,
        goal,
    }
}

/// `min(100, points * 100 / goal)`; a zero goal yields 0.
pub fn percentage(points: u32, goal: u32) -> f64 {
    if goal == 0 {
        return 0.0;
    }
    (f64::from(points) * 100.0 / f64::from(goal)).min(100.0)
}

/// Record newly crossed milestones and return them in threshold order.
///
/// Each threshold is checked independently; one already in `shown` is never
/// returned again.
pub fn check_milestones(percentage: f64, shown: &mut BTreeSet<Milestone>) -> Vec<Milestone> {
    Milestone::ALL
        .into_iter()
        .filter(|m| percentage >= f64::from(m.threshold()))
        .filter(|m| shown.insert(*m))
        .collect()
}
