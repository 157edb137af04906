/// Response types handed to the presentation layer
///
/// Every command returns a [`CommandOutcome`] carrying the refreshed view and
/// an optional user-facing notice, so any frontend (web, terminal, test
/// harness) can re-render without further queries.

use serde::{Deserialize, Serialize};

use crate::domain::{Habit, Stats, StatusFilter};

/// Severity of a user-facing notice, mirroring toast styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    /// Warning-style notices, e.g. a deletion that can still be undone
    Attention,
    Error,
}

/// A transient message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, text: text.into() }
    }

    pub fn attention(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Attention, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

/// Read-only snapshot of the current display state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    /// Habits passing the active filter and query, sorted by display order
    pub habits: Vec<Habit>,
    /// Aggregates over the full habit set, not the filtered view
    pub stats: Stats,
    pub filter: StatusFilter,
    pub query: String,
}

/// Result of a successfully applied command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutcome {
    /// Message to surface to the user, already filtered by the
    /// notifications preference
    pub notice: Option<Notice>,
    pub view: ViewModel,
}
