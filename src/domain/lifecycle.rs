/// Habit lifecycle state machine
///
/// Pure transitions over a single habit, parameterized by the current period
/// key so callers (and tests) control time. The rollover check runs before
/// any other transition and also as an explicit sweep at startup.

use tracing::debug;

use crate::domain::{Habit, Status};

/// Result of an increment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOutcome {
    /// Habit was paused or already completed; nothing changed
    Ignored,
    /// Progress advanced but the target was not reached
    Progressed,
    /// Progress reached the target on this increment; streak was bumped and
    /// the habit transitioned to Completed
    Completed,
}

/// Reset a habit's progress if its period key is stale
///
/// If the stored key differs from `current_key`: a streak that didn't reach
/// the target is broken, progress goes back to zero, a Completed habit
/// becomes Active again, and the habit is stamped with the new key. Returns
/// whether anything changed; re-running with the same key is a no-op.
pub fn rollover(habit: &mut Habit, current_key: &str) -> bool {
    if habit.period_key == current_key {
        return false;
    }
    if habit.progress < habit.target {
        habit.streak = 0;
    }
    habit.progress = 0;
    if habit.status == Status::Completed {
        habit.status = Status::Active;
    }
    habit.period_key = current_key.to_string();
    debug!(id = %habit.id, key = current_key, "rolled habit over to new period");
    true
}

/// Advance a habit's progress by one within the current period
///
/// Runs the rollover check first, then ignores paused and completed habits.
/// Progress is clamped at the target; reaching it bumps the streak and marks
/// the habit Completed, reported exactly once via the outcome.
pub fn increment(habit: &mut Habit, current_key: &str) -> IncrementOutcome {
    rollover(habit, current_key);

    match habit.status {
        Status::Paused | Status::Completed => return IncrementOutcome::Ignored,
        Status::Active => {}
    }

    habit.progress = (habit.progress + 1).min(habit.target);
    if habit.progress >= habit.target {
        habit.streak += 1;
        habit.status = Status::Completed;
        return IncrementOutcome::Completed;
    }
    IncrementOutcome::Progressed
}

/// Flip a habit between Active and Paused
///
/// Completed habits can't be paused; returns the new status, or None when
/// nothing changed.
pub fn toggle_pause(habit: &mut Habit) -> Option<Status> {
    match habit.status {
        Status::Completed => None,
        Status::Paused => {
            habit.status = Status::Active;
            Some(Status::Active)
        }
        Status::Active => {
            habit.status = Status::Paused;
            Some(Status::Paused)
        }
    }
}
