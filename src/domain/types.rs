/// Core types and enums used throughout the domain layer
///
/// This module defines the fundamental types like HabitId, Frequency, Priority,
/// and Status that are used by the Habit entity and the lifecycle engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// This is a wrapper around a millisecond timestamp to provide type safety -
/// you can't accidentally pass an order key where a habit ID is expected.
/// IDs are produced by [`IdGenerator`], which guarantees they are strictly
/// increasing even when two habits are created within the same clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HabitId(pub i64);

impl HabitId {
    /// Raw millisecond value backing this ID
    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HabitId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Monotonic source of habit IDs
///
/// The original data model uses creation timestamps as IDs, which collide when
/// two habits are created within the same millisecond. This generator keeps the
/// timestamp semantics but bumps past the last issued value on collision.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator that will never issue an ID at or below `floor`
    ///
    /// Used after loading persisted habits so new IDs can't collide with
    /// existing ones.
    pub fn starting_after(floor: i64) -> Self {
        Self { last: floor }
    }

    /// Issue the next ID: the current wall clock in milliseconds, or
    /// `last + 1` when the clock hasn't advanced past the previous issue.
    pub fn next_id(&mut self) -> HabitId {
        let now = chrono::Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        HabitId(self.last)
    }
}

/// How often a habit's progress target applies
///
/// The frequency decides which period key a habit is stamped with and
/// therefore when its progress rolls over. It is fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Target applies per calendar day
    Daily,
    /// Target applies per Sunday-anchored week
    Weekly,
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Daily
    }
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        }
    }
}

impl FromStr for Frequency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            other => Err(DomainError::Validation {
                message: format!("Invalid frequency '{}'. Valid options: daily, weekly", other),
            }),
        }
    }
}

/// Cosmetic priority label, no behavioral effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Low
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(DomainError::Validation {
                message: format!("Invalid priority '{}'. Valid options: low, medium, high", other),
            }),
        }
    }
}

/// Lifecycle state of a habit within the current period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Paused,
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Paused => "paused",
            Status::Completed => "completed",
        }
    }
}

impl FromStr for Status {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "paused" => Ok(Status::Paused),
            "completed" => Ok(Status::Completed),
            other => Err(DomainError::Validation {
                message: format!(
                    "Invalid status '{}'. Valid options: active, paused, completed",
                    other
                ),
            }),
        }
    }
}

/// Status filter applied to the habit list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    All,
    Active,
    Paused,
    Completed,
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::All
    }
}

impl StatusFilter {
    /// Whether a habit with the given status passes this filter
    pub fn matches(&self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == Status::Active,
            StatusFilter::Paused => status == Status::Paused,
            StatusFilter::Completed => status == Status::Completed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Paused => "paused",
            StatusFilter::Completed => "completed",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "paused" => Ok(StatusFilter::Paused),
            "completed" => Ok(StatusFilter::Completed),
            other => Err(DomainError::Validation {
                message: format!(
                    "Invalid filter '{}'. Valid options: all, active, paused, completed",
                    other
                ),
            }),
        }
    }
}

/// UI theme preference, persisted with the rest of the settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(DomainError::Validation {
                message: format!("Invalid theme '{}'. Valid options: light, dark", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generator_is_strictly_monotonic() {
        let mut generator = IdGenerator::new();
        let a = generator.next_id();
        let b = generator.next_id();
        let c = generator.next_id();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_id_generator_respects_floor() {
        let floor = chrono::Utc::now().timestamp_millis() + 60_000;
        let mut generator = IdGenerator::starting_after(floor);
        assert!(generator.next_id().as_millis() > floor);
    }

    #[test]
    fn test_status_filter_matches() {
        assert!(StatusFilter::All.matches(Status::Paused));
        assert!(StatusFilter::Completed.matches(Status::Completed));
        assert!(!StatusFilter::Active.matches(Status::Paused));
    }

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!("Daily".parse::<Frequency>().unwrap(), Frequency::Daily);
        assert_eq!(" HIGH ".parse::<Priority>().unwrap(), Priority::High);
        assert!("hourly".parse::<Frequency>().is_err());
    }
}
