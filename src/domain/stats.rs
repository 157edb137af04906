/// Stats aggregator
///
/// Derives the counter-card numbers from the full habit set, not the
/// filtered view.

use serde::{Deserialize, Serialize};

use crate::domain::HabitStore;

/// Aggregate statistics over all habits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Number of habits in the store
    pub total: u32,
    /// Habits whose progress has reached their target this period
    pub completed: u32,
    /// `completed / total` as a rounded percentage, 0 when the store is empty
    pub completion_rate: u32,
    /// Best streak across all habits, 0 when the store is empty
    pub longest_streak: u32,
}

/// Compute stats for the current habit set
pub fn compute(store: &HabitStore) -> Stats {
    let total = store.len() as u32;
    let completed = store.iter().filter(|h| h.is_complete()).count() as u32;
    let completion_rate = if total > 0 {
        (f64::from(completed) / f64::from(total) * 100.0).round() as u32
    } else {
        0
    };
    let longest_streak = store.iter().map(|h| h.streak).max().unwrap_or(0);

    Stats {
        total,
        completed,
        completion_rate,
        longest_streak,
    }
}
