use serde::{Deserialize, Serialize};

use crate::day::DaySummary;
use crate::error::Field;
use crate::progress::Milestone;

/// Every state change in the engine produces Events.
/// Operations return them in order; the presentation layer renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    DayStarted {
        challenge: String,
        goal: u32,
    },
    ProgressChanged {
        points: u32,
        goal: u32,
        percentage: f64,
        challenge: Option<ChallengeStatus>,
    },
    /// A completion threshold was crossed for the first time this session.
    Milestone {
        milestone: Milestone,
        message: String,
    },
    DayEnded {
        summary: DaySummary,
    },
    ValidationFailed {
        field: Field,
        message: String,
    },
    /// Saving failed; in-memory state is still authoritative.
    PersistenceFailed {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeStatus {
    pub description: String,
    pub completed: bool,
}
