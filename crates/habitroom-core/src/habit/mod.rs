//! Habits and their validation rules.
//!
//! A habit lives only for one day-session. The registry owns the list; this
//! module defines the value types and the per-category point ceilings.

mod registry;

pub use registry::HabitRegistry;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Field, FieldError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Health,
    Study,
    SportsHobby,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Health, Category::Study, Category::SportsHobby];

    pub fn max_points(&self) -> u32 {
        match self {
            Category::Health => 200,
            Category::Study => 500,
            Category::SportsHobby => 100,
        }
    }

    /// Wire label, e.g. `SPORTS_HOBBY`.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Health => "HEALTH",
            Category::Study => "STUDY",
            Category::SportsHobby => "SPORTS_HOBBY",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Health => "Health",
            Category::Study => "Study",
            Category::SportsHobby => "Sports & Hobby",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "HEALTH" => Ok(Category::Health),
            "STUDY" => Ok(Category::Study),
            "SPORTS_HOBBY" => Ok(Category::SportsHobby),
            other => Err(ValidationError::single(
                Field::Category,
                format!("Unknown category '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Sort weight: HIGH 3, MEDIUM 2, LOW 1.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            other => Err(ValidationError::single(
                Field::Priority,
                format!("Unknown priority '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A tracked habit for the current day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub name: String,
    pub category: Category,
    pub priority: Priority,
    pub points: u32,
    #[serde(default)]
    pub completed: bool,
}

/// User-submitted habit fields, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitDraft {
    pub name: String,
    pub category: Category,
    pub priority: Priority,
    /// Signed so that out-of-range form input reaches validation.
    pub points: i64,
}

impl HabitDraft {
    pub fn new(name: impl Into<String>, category: Category, priority: Priority, points: i64) -> Self {
        Self {
            name: name.into(),
            category,
            priority,
            points,
        }
    }

    /// Validate every field and build an uncompleted habit.
    ///
    /// The name is trimmed. Name and points are checked independently so
    /// both messages can be reported together.
    pub fn validate(&self) -> Result<Habit, ValidationError> {
        let mut fields = Vec::new();
        let name = self.name.trim();

        if name.is_empty() {
            fields.push(FieldError {
                field: Field::Name,
                message: "Habit name cannot be empty!".to_string(),
            });
        }

        let max = self.category.max_points();
        if self.points < 1 || self.points > i64::from(max) {
            fields.push(FieldError {
                field: Field::Points,
                message: format!("Points must be between 1 and {max}"),
            });
        }

        if !fields.is_empty() {
            return Err(ValidationError { fields });
        }

        Ok(Habit {
            name: name.to_string(),
            category: self.category,
            priority: self.priority,
            // Range-checked above.
            points: self.points as u32,
            completed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ceilings() {
        assert_eq!(Category::Health.max_points(), 200);
        assert_eq!(Category::Study.max_points(), 500);
        assert_eq!(Category::SportsHobby.max_points(), 100);
        assert!("GARDENING".parse::<Category>().unwrap_err().has_field(Field::Category));
    }

    #[test]
    fn draft_trims_name() {
        let habit = HabitDraft::new("  Read  ", Category::Study, Priority::High, 120)
            .validate()
            .unwrap();
        assert_eq!(habit.name, "Read");
        assert!(!habit.completed);
    }

    #[test]
    fn draft_reports_name_and_points_together() {
        let err = HabitDraft::new("   ", Category::Health, Priority::Low, 201)
            .validate()
            .unwrap_err();
        assert!(err.has_field(Field::Name));
        assert!(err.has_field(Field::Points));
        assert!(err.to_string().contains("between 1 and 200"));
    }

    #[test]
    fn draft_points_bounds_are_inclusive() {
        assert!(HabitDraft::new("Run", Category::SportsHobby, Priority::Low, 1)
            .validate()
            .is_ok());
        assert!(HabitDraft::new("Run", Category::SportsHobby, Priority::Low, 100)
            .validate()
            .is_ok());
        assert!(HabitDraft::new("Run", Category::SportsHobby, Priority::Low, 0)
            .validate()
            .is_err());
        assert!(HabitDraft::new("Run", Category::SportsHobby, Priority::Low, -5)
            .validate()
            .is_err());
    }

    #[test]
    fn labels_parse_and_serialize() {
        assert_eq!("SPORTS_HOBBY".parse::<Category>().unwrap(), Category::SportsHobby);
        assert_eq!("MEDIUM".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("URGENT".parse::<Priority>().unwrap_err().has_field(Field::Priority));
        assert_eq!(
            serde_json::to_string(&Category::SportsHobby).unwrap(),
            "\"SPORTS_HOBBY\""
        );
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"HIGH\"");
        assert_eq!(Category::SportsHobby.to_string(), "Sports & Hobby");
    }
}
