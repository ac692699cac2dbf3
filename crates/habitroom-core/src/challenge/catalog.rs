//! The fixed catalog of daily challenges and their completion predicates.

use serde::{Deserialize, Serialize};

use crate::habit::{Category, Habit, Priority};

/// One of the fifteen daily challenges.
///
/// Each variant carries its own predicate over the current habit snapshot;
/// see [`ChallengeKind::is_satisfied`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    ThreeHighPriority,
    FiftyHealthPoints,
    FiveCompleted,
    AllStudy,
    HundredTotalPoints,
    TwoBigStudy,
    ThreeHundredTotalPoints,
    AllHighPriority,
    SevenCompleted,
    SeventyFiveSportsPoints,
    OneOfEachCategory,
    TenCompleted,
    TwoHundredStudyHealthPoints,
    FourMediumOrHigh,
    HalfCompleted,
}

impl ChallengeKind {
    pub const ALL: [ChallengeKind; 15] = [
        ChallengeKind::ThreeHighPriority,
        ChallengeKind::FiftyHealthPoints,
        ChallengeKind::FiveCompleted,
        ChallengeKind::AllStudy,
        ChallengeKind::HundredTotalPoints,
        ChallengeKind::TwoBigStudy,
        ChallengeKind::ThreeHundredTotalPoints,
        ChallengeKind::AllHighPriority,
        ChallengeKind::SevenCompleted,
        ChallengeKind::SeventyFiveSportsPoints,
        ChallengeKind::OneOfEachCategory,
        ChallengeKind::TenCompleted,
        ChallengeKind::TwoHundredStudyHealthPoints,
        ChallengeKind::FourMediumOrHigh,
        ChallengeKind::HalfCompleted,
    ];

    /// User-facing text. These strings are part of the snapshot format.
    pub fn description(&self) -> &'static str {
        match self {
            ChallengeKind::ThreeHighPriority => "Complete 3 High Priority Habits",
            ChallengeKind::FiftyHealthPoints => "Earn 50 points from Health",
            ChallengeKind::FiveCompleted => "Mark 5 habits complete",
            ChallengeKind::AllStudy => "Complete all Study habits",
            ChallengeKind::HundredTotalPoints => "Earn 100 total points",
            ChallengeKind::TwoBigStudy => "Complete 2 Study habits with 100+ points",
            ChallengeKind::ThreeHundredTotalPoints => "Achieve 300 points from mixed categories",
            ChallengeKind::AllHighPriority => "Mark all High Priority habits today",
            ChallengeKind::SevenCompleted => "Complete 7 habits regardless of priority",
            ChallengeKind::SeventyFiveSportsPoints => "Earn 75 points from Sports and Hobbies",
            ChallengeKind::OneOfEachCategory => "Complete one habit from each category",
            ChallengeKind::TenCompleted => "Mark 10 habits complete total",
            ChallengeKind::TwoHundredStudyHealthPoints => {
                "Earn 200 points combined from Study and Health"
            }
            ChallengeKind::FourMediumOrHigh => "Maintain Medium or High priority on 4 habits",
            ChallengeKind::HalfCompleted => "Complete 50% of total habit goals",
        }
    }

    /// Exact-match lookup of a catalog description.
    pub fn from_description(description: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.description() == description)
    }

    /// Test the predicate against the current habits.
    ///
    /// `total_points` is the habit-derived total without any challenge bonus.
    pub fn is_satisfied(&self, habits: &[Habit], total_points: u32) -> bool {
        let done = || habits.iter().filter(|h| h.completed);

        match self {
            ChallengeKind::ThreeHighPriority => {
                done().filter(|h| h.priority == Priority::High).count() >= 3
            }
            ChallengeKind::FiftyHealthPoints => points_in(habits, &[Category::Health]) >= 50,
            ChallengeKind::FiveCompleted => done().count() >= 5,
            ChallengeKind::AllStudy => all_completed(habits, |h| h.category == Category::Study),
            ChallengeKind::HundredTotalPoints => total_points >= 100,
            ChallengeKind::TwoBigStudy => {
                done()
                    .filter(|h| h.category == Category::Study && h.points >= 100)
                    .count()
                    >= 2
            }
            ChallengeKind::ThreeHundredTotalPoints => total_points >= 300,
            ChallengeKind::AllHighPriority => {
                all_completed(habits, |h| h.priority == Priority::High)
            }
            ChallengeKind::SevenCompleted => done().count() >= 7,
            ChallengeKind::SeventyFiveSportsPoints => {
                points_in(habits, &[Category::SportsHobby]) >= 75
            }
            ChallengeKind::OneOfEachCategory => Category::ALL
                .iter()
                .all(|c| done().any(|h| h.category == *c)),
            ChallengeKind::TenCompleted => done().count() >= 10,
            ChallengeKind::TwoHundredStudyHealthPoints => {
                points_in(habits, &[Category::Study, Category::Health]) >= 200
            }
            ChallengeKind::FourMediumOrHigh => {
                done()
                    .filter(|h| matches!(h.priority, Priority::Medium | Priority::High))
                    .count()
                    >= 4
            }
            // Count-based: completed >= total / 2 without rounding.
            ChallengeKind::HalfCompleted => {
                !habits.is_empty() && done().count() * 2 >= habits.len()
            }
        }
    }
}

/// Points of completed habits in the given categories.
fn points_in(habits: &[Habit], categories: &[Category]) -> u32 {
    habits
        .iter()
        .filter(|h| h.completed && categories.contains(&h.category))
        .map(|h| h.points)
        .sum()
}

/// At least one habit matches `select` and every such habit is completed.
fn all_completed(habits: &[Habit], select: impl Fn(&Habit) -> bool) -> bool {
    let mut selected = habits.iter().filter(|h| select(*h)).peekable();
    selected.peek().is_some() && selected.all(|h| h.completed)
}
