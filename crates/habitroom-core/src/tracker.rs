//! The habit tracker session object.
//!
//! `HabitTracker` owns the profile, the current day and a persistence
//! gateway. The presentation layer holds one tracker, forwards user intents
//! to it and renders the events each call returns.
//!
//! ## Usage
//!
//! ```ignore
//! let mut tracker = HabitTracker::open(JsonFileStore::new(path), ChallengeDrawer::default())?;
//! tracker.start_day(2000)?;
//! tracker.add_habit(&HabitDraft::new("Read", Category::Study, Priority::High, 300))?;
//! let events = tracker.toggle_habit(0)?;
//! ```

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::challenge::{Challenge, ChallengeDrawer};
use crate::day::{DaySession, DaySummary, HistoryRecord, Profile};
use crate::error::Result;
use crate::events::{ChallengeStatus, Event};
use crate::habit::{Habit, HabitDraft};
use crate::progress::{self, Progress};
use crate::stats::OverallStats;
use crate::storage::{self, Config, Snapshot, SnapshotStore};

/// What the progress panel shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub points: u32,
    pub goal: u32,
    pub percentage: f64,
    pub challenge: Option<ChallengeStatus>,
    pub current_streak: u32,
    pub best_streak: u32,
}

pub struct HabitTracker<S> {
    store: S,
    drawer: ChallengeDrawer,
    profile: Profile,
    session: DaySession,
}

impl<S: SnapshotStore> HabitTracker<S> {
    /// Load the last snapshot from `store`, or start fresh on first run.
    ///
    /// # Errors
    /// Returns an error if a snapshot exists but cannot be read.
    pub fn open(store: S, drawer: ChallengeDrawer) -> Result<Self> {
        let (profile, mut session) = match store.load()? {
            Some(snapshot) => snapshot.restore(),
            None => {
                tracing::info!("no snapshot found, starting with an empty profile");
                (Profile::default(), DaySession::default())
            }
        };
        if session.active {
            let restored = session.recompute();
            tracing::debug!(points = restored.points(), "resumed active day");
        }
        Ok(Self {
            store,
            drawer,
            profile,
            session,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn session(&self) -> &DaySession {
        &self.session
    }

    pub fn habits(&self) -> &[Habit] {
        self.session.habits.habits()
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        self.session.challenge.as_ref()
    }

    pub fn is_day_active(&self) -> bool {
        self.session.active
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn progress(&self) -> ProgressReport {
        let progress = self.session.progress();
        ProgressReport {
            points: progress.points(),
            goal: progress.goal,
            percentage: progress.percentage(),
            challenge: self.challenge_status(),
            current_streak: self.profile.current_streak,
            best_streak: self.profile.best_streak,
        }
    }

    pub fn stats(&self) -> OverallStats {
        OverallStats::from_profile(&self.profile)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new day with a goal in 1000..=9999 and a fresh challenge.
    pub fn start_day(&mut self, goal: i64) -> Result<Vec<Event>> {
        let goal = DaySession::validate_goal(goal)?;
        let challenge = self.drawer.draw();
        self.session.start(goal, challenge)?;
        self.profile.active_days += 1;

        tracing::info!(
            goal,
            challenge = challenge.description(),
            active_days = self.profile.active_days,
            "day started"
        );

        let mut events = vec![Event::DayStarted {
            challenge: challenge.description().to_string(),
            goal,
        }];
        self.refresh(&mut events);
        self.persist(&mut events);
        Ok(events)
    }

    pub fn add_habit(&mut self, draft: &HabitDraft) -> Result<Vec<Event>> {
        self.session.ensure_active()?;
        let index = self.session.habits.add(draft)?;
        tracing::debug!(index, name = %draft.name.trim(), "habit added");
        self.after_change()
    }

    pub fn edit_habit(&mut self, index: usize, draft: &HabitDraft) -> Result<Vec<Event>> {
        self.session.ensure_active()?;
        self.session.habits.edit(index, draft)?;
        tracing::debug!(index, "habit edited");
        self.after_change()
    }

    /// Remove a habit. Confirmation is the caller's job.
    pub fn remove_habit(&mut self, index: usize) -> Result<Vec<Event>> {
        self.session.ensure_active()?;
        let removed = self.session.habits.remove(index)?;
        tracing::debug!(index, name = %removed.name, "habit removed");
        self.after_change()
    }

    pub fn toggle_habit(&mut self, index: usize) -> Result<Vec<Event>> {
        self.session.ensure_active()?;
        let completed = self.session.habits.toggle(index)?;
        tracing::debug!(index, completed, "habit toggled");
        self.after_change()
    }

    /// Close the active day, dated today (UTC).
    pub fn end_day(&mut self) -> Result<Vec<Event>> {
        self.end_day_on(Utc::now().date_naive())
    }

    /// Close the active day with an explicit history date.
    pub fn end_day_on(&mut self, date: NaiveDate) -> Result<Vec<Event>> {
        self.session.ensure_active()?;

        let progress = self.session.recompute();
        let new_badge = self.profile.record_day(HistoryRecord {
            date,
            points_earned: progress.points(),
            goal_points: progress.goal,
        });
        self.session.active = false;

        let summary = self.summarize(date, &progress, new_badge);
        tracing::info!(
            points = summary.points,
            goal = summary.goal,
            streak = summary.current_streak,
            badge = ?new_badge,
            "day ended"
        );

        let mut events = vec![Event::DayEnded { summary }];
        self.persist(&mut events);
        Ok(events)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn after_change(&mut self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        self.refresh(&mut events);
        self.persist(&mut events);
        Ok(events)
    }

    /// Recompute progress, then report it and any new milestones.
    fn refresh(&mut self, events: &mut Vec<Event>) {
        let current = self.session.recompute();
        let percentage = current.percentage();
        tracing::debug!(points = current.points(), percentage, "progress recomputed");

        events.push(Event::ProgressChanged {
            points: current.points(),
            goal: current.goal,
            percentage,
            challenge: self.challenge_status(),
        });

        for milestone in progress::check_milestones(percentage, &mut self.session.shown_milestones)
        {
            tracing::info!(%milestone, "milestone reached");
            events.push(Event::Milestone {
                milestone,
                message: milestone.message().to_string(),
            });
        }
    }

    /// Save a snapshot. Failures are reported, never fatal.
    fn persist(&mut self, events: &mut Vec<Event>) {
        let snapshot = Snapshot::capture(&self.profile, &self.session);
        if let Err(e) = self.store.save(&snapshot) {
            tracing::warn!(error = %e, "failed to save snapshot");
            events.push(Event::PersistenceFailed {
                message: e.to_string(),
            });
        }
    }

    fn challenge_status(&self) -> Option<ChallengeStatus> {
        self.session.challenge.map(|c| ChallengeStatus {
            description: c.description().to_string(),
            completed: c.is_completed(),
        })
    }

    fn summarize(
        &self,
        date: NaiveDate,
        progress: &Progress,
        new_badge: Option<crate::day::Badge>,
    ) -> DaySummary {
        let challenge_bonus = self
            .session
            .challenge
            .filter(Challenge::is_completed)
            .map(|c| c.bonus_points());
        DaySummary {
            date,
            points: progress.points(),
            goal: progress.goal,
            completion_pct: progress.percentage(),
            goal_met: progress.goal_met(),
            current_streak: self.profile.current_streak,
            best_streak: self.profile.best_streak,
            challenge_bonus,
            badges: self.profile.badges.iter().copied().collect(),
            new_badge,
        }
    }
}

impl HabitTracker<Box<dyn SnapshotStore>> {
    /// Open the configured backend under the data directory, drawing
    /// challenges with the configured seed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = storage::open_configured(config)?;
        Self::open(store, ChallengeDrawer::new(config.challenge.seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::ChallengeKind;
    use crate::day::Badge;
    use crate::error::{CoreError, Field, InvalidStateError, StorageError};
    use crate::habit::{Category, Priority};
    use crate::progress::Milestone;
    use crate::storage::MemoryStore;

    struct FailingStore;

    impl SnapshotStore for FailingStore {
        fn load(&self) -> std::result::Result<Option<Snapshot>, StorageError> {
            Ok(None)
        }

        fn save(&self, _: &Snapshot) -> std::result::Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    fn tracker() -> HabitTracker<MemoryStore> {
        HabitTracker::open(MemoryStore::new(), ChallengeDrawer::new(Some(1))).unwrap()
    }

    /// Pin the challenge so bonus points do not depend on the draw.
    fn pin_challenge<S>(tracker: &mut HabitTracker<S>, kind: ChallengeKind) {
        tracker.session.challenge = Some(Challenge::new(kind));
    }

    fn milestones(events: &[Event]) -> Vec<Milestone> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Milestone { milestone, .. } => Some(*milestone),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn operations_require_an_active_day() {
        let mut tracker = tracker();
        let draft = HabitDraft::new("Read", Category::Study, Priority::High, 100);
        assert!(matches!(
            tracker.add_habit(&draft),
            Err(CoreError::InvalidState(InvalidStateError::DayNotActive))
        ));
        assert!(matches!(
            tracker.end_day(),
            Err(CoreError::InvalidState(InvalidStateError::DayNotActive))
        ));
        assert!(tracker.store().json().is_none());
    }

    #[test]
    fn goal_validation() {
        let mut tracker = tracker();
        match tracker.start_day(500) {
            Err(CoreError::Validation(e)) => assert!(e.has_field(Field::Goal)),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(tracker.profile().active_days, 0);

        tracker.start_day(1000).unwrap();
        tracker.end_day().unwrap();
        tracker.start_day(9999).unwrap();
        assert_eq!(tracker.profile().active_days, 2);
    }

    #[test]
    fn start_day_emits_challenge_and_counts_day() {
        let mut tracker = tracker();
        let events = tracker.start_day(2000).unwrap();
        match &events[0] {
            Event::DayStarted { challenge, goal } => {
                assert_eq!(*goal, 2000);
                assert!(ChallengeKind::from_description(challenge).is_some());
            }
            other => panic!("unexpected first event {other:?}"),
        }
        assert!(matches!(events[1], Event::ProgressChanged { points: 0, .. }));
        assert!(matches!(
            tracker.start_day(2000),
            Err(CoreError::InvalidState(InvalidStateError::DayAlreadyActive))
        ));
    }

    #[test]
    fn milestone_fires_once_per_threshold() {
        let mut tracker = tracker();
        tracker.start_day(1000).unwrap();
        pin_challenge(&mut tracker, ChallengeKind::TenCompleted);
        tracker
            .add_habit(&HabitDraft::new("Deep work", Category::Study, Priority::High, 500))
            .unwrap();
        tracker
            .add_habit(&HabitDraft::new("Walk", Category::Health, Priority::Low, 100))
            .unwrap();

        assert_eq!(milestones(&tracker.toggle_habit(0).unwrap()), vec![Milestone::Half]);
        assert!(milestones(&tracker.toggle_habit(0).unwrap()).is_empty());
        assert!(milestones(&tracker.toggle_habit(0).unwrap()).is_empty());
        assert_eq!(tracker.progress().points, 500);
    }

    #[test]
    fn challenge_bonus_counts_toward_points() {
        let mut tracker = tracker();
        tracker.start_day(1000).unwrap();
        pin_challenge(&mut tracker, ChallengeKind::HundredTotalPoints);
        tracker
            .add_habit(&HabitDraft::new("Read", Category::Study, Priority::High, 120))
            .unwrap();
        tracker.toggle_habit(0).unwrap();

        let report = tracker.progress();
        assert_eq!(report.points, 320);
        assert!(report.challenge.unwrap().completed);

        // Un-toggling drops habit points; the bonus stays.
        tracker.toggle_habit(0).unwrap();
        assert_eq!(tracker.progress().points, 200);
    }

    #[test]
    fn end_day_updates_streak_and_badges() {
        let mut tracker = tracker();
        tracker.profile.current_streak = 2;
        tracker.profile.best_streak = 2;
        tracker.start_day(1000).unwrap();
        pin_challenge(&mut tracker, ChallengeKind::TenCompleted);
        for name in ["Thesis", "Exam prep"] {
            tracker
                .add_habit(&HabitDraft::new(name, Category::Study, Priority::High, 500))
                .unwrap();
        }
        tracker.toggle_habit(0).unwrap();
        tracker.toggle_habit(1).unwrap();
        assert_eq!(tracker.progress().points, 1000);

        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let events = tracker.end_day_on(date).unwrap();
        let Event::DayEnded { summary } = &events[0] else {
            panic!("expected DayEnded");
        };
        assert!(summary.goal_met);
        assert_eq!(summary.current_streak, 3);
        assert_eq!(summary.new_badge, Some(Badge::Bronze));
        assert_eq!(summary.challenge_bonus, None);
        assert!(!tracker.is_day_active());
        assert_eq!(tracker.profile().history.last().unwrap().date, date);

        // A missed day resets the streak but keeps the badge.
        tracker.start_day(1000).unwrap();
        tracker.end_day_on(date.succ_opt().unwrap()).unwrap();
        assert_eq!(tracker.profile().current_streak, 0);
        assert_eq!(tracker.profile().best_streak, 3);
        assert!(tracker.profile().badges.contains(&Badge::Bronze));
    }

    #[test]
    fn failed_save_is_reported_not_fatal() {
        let mut tracker = HabitTracker::open(FailingStore, ChallengeDrawer::new(Some(3))).unwrap();
        let events = tracker.start_day(1500).unwrap();
        assert!(matches!(events.last(), Some(Event::PersistenceFailed { .. })));
        assert!(tracker.is_day_active());
        assert_eq!(tracker.profile().active_days, 1);
    }

    #[test]
    fn reopening_an_active_day_reevaluates_the_challenge() {
        let json = r#"{
            "habits": [
                {"name": "Read", "category": "STUDY", "priority": "HIGH", "points": 120, "completed": true}
            ],
            "dailyChallenge": {"description": "Complete all Study habits", "completed": false},
            "dailyGoal": 1000,
            "dayStarted": true,
            "activeDays": 1
        }"#;
        let tracker =
            HabitTracker::open(MemoryStore::with_json(json), ChallengeDrawer::new(None)).unwrap();
        assert!(tracker.challenge().unwrap().is_completed());
        assert_eq!(tracker.progress().points, 320);

        // An ended day is left as stored.
        let ended = json.replace(r#""dayStarted": true"#, r#""dayStarted": false"#);
        let tracker =
            HabitTracker::open(MemoryStore::with_json(ended), ChallengeDrawer::new(None)).unwrap();
        assert!(!tracker.challenge().unwrap().is_completed());
    }

    #[test]
    fn state_survives_reopen() {
        let store = MemoryStore::new();
        {
            let mut tracker = HabitTracker::open(&store, ChallengeDrawer::new(Some(9))).unwrap();
            tracker.start_day(3000).unwrap();
            tracker
                .add_habit(&HabitDraft::new("Swim", Category::SportsHobby, Priority::Medium, 80))
                .unwrap();
            tracker.toggle_habit(0).unwrap();
        }
        let tracker = HabitTracker::open(&store, ChallengeDrawer::new(None)).unwrap();
        assert!(tracker.is_day_active());
        assert_eq!(tracker.habits().len(), 1);
        assert!(tracker.habits()[0].completed);
        assert_eq!(tracker.profile().active_days, 1);
    }
}
