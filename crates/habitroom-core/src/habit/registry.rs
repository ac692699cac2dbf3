//! Today's habit list.

use std::cmp::Ordering;

use super::{Habit, HabitDraft};
use crate::error::{CoreError, Result};

/// Ordered set of habits for one day-session.
///
/// After every add/edit the list is kept sorted by priority (highest first),
/// then by points (highest first). The sort is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitRegistry {
    habits: Vec<Habit>,
}

impl HabitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted habits.
    pub fn from_habits(habits: Vec<Habit>) -> Self {
        let mut registry = Self { habits };
        registry.sort();
        registry
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, index: usize) -> Option<&Habit> {
        self.habits.get(index)
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    /// Validate and add a habit at its sorted position.
    ///
    /// Returns the index the habit landed at. Equal habits keep insertion
    /// order, same as appending and re-sorting.
    pub fn add(&mut self, draft: &HabitDraft) -> Result<usize> {
        let habit = draft.validate()?;
        let index = self
            .habits
            .partition_point(|h| compare_habits(h, &habit) != Ordering::Greater);
        self.habits.insert(index, habit);
        Ok(index)
    }

    /// Replace the habit at `index`, then re-sort.
    ///
    /// The replacement starts uncompleted.
    pub fn edit(&mut self, index: usize, draft: &HabitDraft) -> Result<()> {
        self.check_index(index)?;
        let habit = draft.validate()?;
        self.habits[index] = habit;
        self.sort();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Habit> {
        self.check_index(index)?;
        Ok(self.habits.remove(index))
    }

    /// Flip the completion flag and return the new value.
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        let habit = &mut self.habits[index];
        habit.completed = !habit.completed;
        Ok(habit.completed)
    }

    pub fn reset_for_new_day(&mut self) {
        self.habits.clear();
    }

    /// Sum of points of completed habits.
    pub fn completed_points(&self) -> u32 {
        self.habits
            .iter()
            .filter(|h| h.completed)
            .map(|h| h.points)
            .sum()
    }

    pub fn into_habits(self) -> Vec<Habit> {
        self.habits
    }

    fn sort(&mut self) {
        self.habits.sort_by(compare_habits);
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.habits.len() {
            return Err(CoreError::NotFound {
                index,
                len: self.habits.len(),
            });
        }
        Ok(())
    }
}

/// Priority descending, then points descending.
pub(crate) fn compare_habits(a: &Habit, b: &Habit) -> Ordering {
    b.priority
        .rank()
        .cmp(&a.priority.rank())
        .then_with(|| b.points.cmp(&a.points))
}
