/// Domain module containing core business logic and data types
///
/// This module defines the habit entity, the in-memory store with its
/// clean-name uniqueness index, the lifecycle state machine, and the pure
/// view/stats derivations. Nothing in here touches the database or the UI.

pub mod habit;
pub mod lifecycle;
pub mod period;
pub mod query;
pub mod reorder;
pub mod stats;
pub mod store;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use lifecycle::*;
pub use query::*;
pub use reorder::*;
pub use stats::*;
pub use store::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("A habit named '{clean_name}' already exists")]
    DuplicateName { clean_name: String },

    #[error("Habit not found: {id}")]
    NotFound { id: HabitId },
}
