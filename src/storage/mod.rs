/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides a
/// key-value style interface for the habit collection and the meta (settings)
/// store. Persistence is best-effort: callers treat in-memory state as the
/// source of truth and never roll back on a failed write.

pub mod migrations;
pub mod sqlite;

// Re-export the main storage types
pub use sqlite::*;

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::domain::{Habit, HabitId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the storage interface for the tracker
///
/// This trait allows swapping SQLite for another backend (or an in-memory
/// fake in tests) while keeping the same interface. All habit writes are
/// upserts keyed by ID.
pub trait TrackerStorage {
    /// Load every persisted habit
    fn load_all_habits(&self) -> Result<Vec<Habit>, StorageError>;

    /// Upsert a single habit
    fn put_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Upsert the full habit set in one transaction
    fn put_habits_bulk(&mut self, habits: &[Habit]) -> Result<(), StorageError>;

    /// Delete a habit by ID; deleting a missing ID is not an error
    fn delete_habit(&self, id: HabitId) -> Result<(), StorageError>;

    /// Remove every habit
    fn clear_habits(&self) -> Result<(), StorageError>;

    /// Fetch the requested meta entries; missing keys are simply absent
    /// from the result
    fn get_meta(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError>;

    /// Upsert meta entries
    fn set_meta(&mut self, entries: &HashMap<String, Value>) -> Result<(), StorageError>;
}
