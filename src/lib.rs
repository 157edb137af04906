/// Public library interface for the Smart Tracker
///
/// This crate implements a local-first habit tracker: habits with per-period
/// targets, streaks that survive rollovers, a reorderable filtered list, and
/// debounced SQLite persistence. The [`SmartTracker`] controller is the
/// command surface any presentation layer drives.

use thiserror::Error;

pub mod app;
pub mod domain;
pub mod storage;

// Re-export the main entry points
pub use app::{AddHabitParams, CommandOutcome, Notice, NoticeLevel, SmartTracker, ViewModel};
pub use domain::{
    DomainError, Frequency, Habit, HabitId, Position, Priority, Stats, Status, StatusFilter, Theme,
};
pub use storage::{SqliteStorage, StorageError, TrackerStorage};

/// Errors that can occur while operating the tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Database error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("{0}")]
    Domain(#[from] domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
