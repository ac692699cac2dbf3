//! All-time statistics over the day history.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::day::{Badge, Profile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub active_days: u32,
    pub total_points: u64,
    pub total_goal_points: u64,
    /// `min(100, total_points * 100 / total_goal_points)`, 0 without history.
    pub average_completion: f64,
    pub current_streak: u32,
    pub best_streak: u32,
    pub badges: Vec<Badge>,
}

impl OverallStats {
    pub fn from_profile(profile: &Profile) -> Self {
        let total_points: u64 = profile
            .history
            .iter()
            .map(|d| u64::from(d.points_earned))
            .sum();
        let total_goal_points: u64 = profile
            .history
            .iter()
            .map(|d| u64::from(d.goal_points))
            .sum();

        let average_completion = if total_goal_points > 0 {
            (total_points as f64 * 100.0 / total_goal_points as f64).min(100.0)
        } else {
            0.0
        };

        Self {
            active_days: profile.active_days,
            total_points,
            total_goal_points,
            average_completion,
            current_streak: profile.current_streak,
            best_streak: profile.best_streak,
            badges: profile.badges.iter().copied().collect(),
        }
    }
}

const RULE: &str = "  ===========================================";

impl fmt::Display for OverallStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        indoc::writedoc!(
            f,
            "

                {rule}
                               OVERALL PROGRESS
                {rule}

                  Total Active Days:          {active}

                  Total Points Earned:        {points}
                  Total Goal Points:          {goals}
                  Average Completion:         {avg:.2}%

                  Current Streak:             {current} days
                  Best Streak:                {best} days

            ",
            rule = RULE,
            active = self.active_days,
            points = self.total_points,
            goals = self.total_goal_points,
            avg = self.average_completion,
            current = self.current_streak,
            best = self.best_streak,
        )?;

        if self.badges.is_empty() {
            writeln!(f, "  No badges unlocked yet")?;
        } else {
            writeln!(f, "  BADGES UNLOCKED:")?;
            for badge in &self.badges {
                writeln!(f, "     {badge}")?;
            }
        }

        writeln!(f)?;
        writeln!(f, "{RULE}")
    }
}
