//! Daily challenge drawing and evaluation.
//!
//! One challenge is drawn uniformly from the catalog at every day start.
//! Evaluation is monotonic: once a challenge completes it stays completed
//! for the rest of the session.

mod catalog;

pub use catalog::ChallengeKind;

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::habit::Habit;

/// Bonus awarded when the daily challenge completes.
pub const CHALLENGE_BONUS_POINTS: u32 = 200;

/// The active challenge of a day-session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChallengeRecord", into = "ChallengeRecord")]
pub struct Challenge {
    kind: ChallengeKind,
    completed: bool,
}

impl Challenge {
    pub fn new(kind: ChallengeKind) -> Self {
        Self {
            kind,
            completed: false,
        }
    }

    /// Draw uniformly from the catalog.
    pub fn draw<R: Rng>(rng: &mut R) -> Self {
        let index = rng.gen_range(0..ChallengeKind::ALL.len());
        Self::new(ChallengeKind::ALL[index])
    }

    pub fn kind(&self) -> ChallengeKind {
        self.kind
    }

    pub fn description(&self) -> &'static str {
        self.kind.description()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn bonus_points(&self) -> u32 {
        CHALLENGE_BONUS_POINTS
    }

    /// Bonus to add to the day's points: the full bonus once completed.
    pub fn earned_bonus(&self) -> u32 {
        if self.completed {
            CHALLENGE_BONUS_POINTS
        } else {
            0
        }
    }

    /// Test the predicate against the current habits.
    ///
    /// No-op once completed. Returns `true` only on the call that flips the
    /// challenge to completed.
    pub fn evaluate(&mut self, habits: &[Habit], total_points: u32) -> bool {
        if self.completed {
            return false;
        }
        if self.kind.is_satisfied(habits, total_points) {
            self.completed = true;
            return true;
        }
        false
    }

    pub fn status_label(&self) -> &'static str {
        if self.completed {
            "[COMPLETED]"
        } else {
            "[In Progress]"
        }
    }
}

/// Snapshot form of a challenge: the catalog text plus its state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChallengeRecord {
    description: String,
    #[serde(default)]
    completed: bool,
    #[serde(default = "default_bonus")]
    bonus_points: u32,
}

fn default_bonus() -> u32 {
    CHALLENGE_BONUS_POINTS
}

impl TryFrom<ChallengeRecord> for Challenge {
    type Error = StorageError;

    fn try_from(record: ChallengeRecord) -> Result<Self, Self::Error> {
        let kind = ChallengeKind::from_description(&record.description)
            .ok_or(StorageError::UnknownChallenge(record.description))?;
        Ok(Self {
            kind,
            completed: record.completed,
        })
    }
}

impl From<Challenge> for ChallengeRecord {
    fn from(challenge: Challenge) -> Self {
        Self {
            description: challenge.description().to_string(),
            completed: challenge.completed,
            bonus_points: CHALLENGE_BONUS_POINTS,
        }
    }
}

/// Source of daily challenges.
///
/// Seeded drawers produce a reproducible sequence.
#[derive(Debug, Clone)]
pub struct ChallengeDrawer {
    rng: Mcg128Xsl64,
}

impl ChallengeDrawer {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self { rng }
    }

    pub fn draw(&mut self) -> Challenge {
        Challenge::draw(&mut self.rng)
    }
}

impl Default for ChallengeDrawer {
    fn default() -> Self {
        Self::new(None)
    }
}
