/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents a recurring
/// habit with a per-period progress target, along with validation and the
/// factory that defaults the mutable fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Frequency, HabitId, IdGenerator, Priority, Status};

/// Maximum length of a habit name, after trimming
pub const NAME_MAX_LEN: usize = 30;
/// Minimum length of a habit name, after trimming
pub const NAME_MIN_LEN: usize = 3;

/// A habit the user wants to perform `target` times per period
///
/// This is the core entity in the system. The mutable fields (`progress`,
/// `streak`, `status`, `order`, `period_key`) are only ever changed through
/// the lifecycle engine and the reorder algorithm; everything else is fixed
/// at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier, derived from the creation timestamp
    pub id: HabitId,
    /// Display name (e.g., "Morning Run")
    pub name: String,
    /// Trimmed, lowercased form of `name`; the uniqueness key
    pub clean_name: String,
    /// Progress goal per period, always >= 1
    pub target: u32,
    /// Daily or weekly period
    pub frequency: Frequency,
    /// Cosmetic priority label
    pub priority: Priority,
    /// Normalized tags, cosmetic and searchable
    pub tags: Vec<String>,
    /// Progress within the current period, clamped to 0..=target
    pub progress: u32,
    /// Consecutive periods in which the target was reached
    pub streak: u32,
    /// Lifecycle state for the current period
    pub status: Status,
    /// Sort key for display; dense-reassigned after any reorder
    pub order: i64,
    /// Period the current progress/status apply to (YYYY-MM-DD)
    pub period_key: String,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// `period_key` must be the current period key for `frequency`, computed
    /// by the caller so that tests can control time. Tags are normalized
    /// (trimmed, lowercased, empties dropped) before being stored.
    pub fn create(
        ids: &mut IdGenerator,
        name: &str,
        target: u32,
        frequency: Frequency,
        priority: Priority,
        tags: Vec<String>,
        period_key: String,
    ) -> Result<Self, DomainError> {
        let name = name.trim().to_string();
        Self::validate_name(&name)?;
        Self::validate_target(target)?;

        let clean_name = clean_name(&name);
        let tags = normalize_tags(tags);
        let id = ids.next_id();

        Ok(Self {
            id,
            name,
            clean_name,
            target,
            frequency,
            priority,
            tags,
            progress: 0,
            streak: 0,
            status: Status::Active,
            order: id.as_millis(),
            period_key,
            created_at: Utc::now(),
        })
    }

    /// Whether the target has been reached within the current period
    pub fn is_complete(&self) -> bool {
        self.progress >= self.target
    }

    /// Validate a habit name: 3-30 characters, ASCII letters/digits/spaces only
    pub fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.len() < NAME_MIN_LEN || trimmed.len() > NAME_MAX_LEN {
            return Err(DomainError::InvalidHabitName(format!(
                "Habit name must be {}-{} characters long",
                NAME_MIN_LEN, NAME_MAX_LEN
            )));
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ')
        {
            return Err(DomainError::InvalidHabitName(
                "Habit name may only contain letters, digits, and spaces".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_target(target: u32) -> Result<(), DomainError> {
        if target == 0 {
            return Err(DomainError::Validation {
                message: "Target must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Normalized (trimmed, lowercased) form of a habit name
pub fn clean_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize a tag list: trim, lowercase, drop empties
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Parse a comma-separated tag string the way the input form does
pub fn parse_tags(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(',').map(str::to_string).collect())
}
