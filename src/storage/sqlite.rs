/// SQLite implementation of the tracker storage interface
///
/// This module provides the concrete SQLite implementation for persisting
/// habits and meta entries. It handles all SQL queries and data conversion.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde_json::Value;

use crate::domain::{Frequency, Habit, HabitId, Priority, Status};
use crate::storage::{migrations, StorageError, TrackerStorage};

const HABIT_COLUMNS: &str = "id, name, clean_name, target, frequency, priority, tags, \
                             progress, streak, status, sort_order, period_key, created_at";

/// SQLite-based storage implementation
///
/// Holds a connection to the SQLite database and implements all the storage
/// operations defined in the [`TrackerStorage`] trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// Opens the database file and runs any necessary migrations to ensure
    /// the schema is up to date.
    pub fn new(db_path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        migrations::initialize_database(&conn)?;

        tracing::info!("SQLite storage initialized at: {:?}", db_path);

        Ok(Self { conn })
    }

    /// In-memory database, used by tests
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        migrations::initialize_database(&conn)?;
        Ok(Self { conn })
    }

    fn row_to_habit(row: &Row<'_>) -> Result<Habit, rusqlite::Error> {
        let id: i64 = row.get(0)?;
        let frequency_str: String = row.get(4)?;
        let priority_str: String = row.get(5)?;
        let tags_json: String = row.get(6)?;
        let status_str: String = row.get(9)?;
        let created_at_str: String = row.get(12)?;

        let corrupt = |column: usize, what: &str| {
            rusqlite::Error::InvalidColumnType(
                column,
                what.to_string(),
                rusqlite::types::Type::Text,
            )
        };

        let frequency =
            Frequency::from_str(&frequency_str).map_err(|_| corrupt(4, "Invalid frequency"))?;
        let priority =
            Priority::from_str(&priority_str).map_err(|_| corrupt(5, "Invalid priority"))?;
        let tags: Vec<String> =
            serde_json::from_str(&tags_json).map_err(|_| corrupt(6, "Invalid tags"))?;
        let status = Status::from_str(&status_str).map_err(|_| corrupt(9, "Invalid status"))?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|_| corrupt(12, "Invalid datetime"))?
            .with_timezone(&Utc);

        Ok(Habit {
            id: HabitId(id),
            name: row.get(1)?,
            clean_name: row.get(2)?,
            target: row.get(3)?,
            frequency,
            priority,
            tags,
            progress: row.get(7)?,
            streak: row.get(8)?,
            status,
            order: row.get(10)?,
            period_key: row.get(11)?,
            created_at,
        })
    }

    fn upsert_habit(conn: &Connection, habit: &Habit) -> Result<(), StorageError> {
        let tags_json = serde_json::to_string(&habit.tags)?;

        conn.execute(
            "INSERT OR REPLACE INTO habits (
                id, name, clean_name, target, frequency, priority, tags,
                progress, streak, status, sort_order, period_key, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                habit.id.as_millis(),
                habit.name,
                habit.clean_name,
                habit.target,
                habit.frequency.as_str(),
                habit.priority.as_str(),
                tags_json,
                habit.progress,
                habit.streak,
                habit.status.as_str(),
                habit.order,
                habit.period_key,
                habit.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }
}

impl TrackerStorage for SqliteStorage {
    /// Load every persisted habit
    fn load_all_habits(&self) -> Result<Vec<Habit>, StorageError> {
        let sql = format!("SELECT {} FROM habits ORDER BY id", HABIT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let habit_iter = stmt.query_map([], Self::row_to_habit)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }

        Ok(habits)
    }

    /// Upsert a single habit
    fn put_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        Self::upsert_habit(&self.conn, habit)?;
        tracing::debug!("Persisted habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    /// Upsert the full habit set in one transaction
    fn put_habits_bulk(&mut self, habits: &[Habit]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        for habit in habits {
            Self::upsert_habit(&tx, habit)?;
        }
        tx.commit()?;

        tracing::debug!("Persisted {} habits in bulk", habits.len());
        Ok(())
    }

    /// Delete a habit by ID
    fn delete_habit(&self, id: HabitId) -> Result<(), StorageError> {
        let rows = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1", params![id.as_millis()])?;

        if rows == 0 {
            tracing::debug!("Delete of missing habit {} ignored", id);
        }
        Ok(())
    }

    /// Remove every habit
    fn clear_habits(&self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM habits", [])?;
        Ok(())
    }

    /// Fetch the requested meta entries
    fn get_meta(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM meta WHERE key = ?1")?;
        let mut result = HashMap::new();

        for key in keys {
            let row: Option<String> = stmt
                .query_row(params![key], |row| row.get(0))
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;

            if let Some(json) = row {
                result.insert(key.to_string(), serde_json::from_str(&json)?);
            }
        }

        Ok(result)
    }

    /// Upsert meta entries
    fn set_meta(&mut self, entries: &HashMap<String, Value>) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
                params![key, serde_json::to_string(value)?],
            )?;
        }
        tx.commit()?;

        tracing::debug!("Persisted {} meta entries", entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{period, IdGenerator};
    use serde_json::json;

    fn sample_habit(ids: &mut IdGenerator, name: &str) -> Habit {
        Habit::create(
            ids,
            name,
            3,
            Frequency::Weekly,
            Priority::High,
            vec!["fitness".to_string(), "morning".to_string()],
            period::week_key(),
        )
        .unwrap()
    }

    #[test]
    fn test_habit_round_trip() {
        let mut ids = IdGenerator::new();
        let storage = SqliteStorage::in_memory().unwrap();

        let mut habit = sample_habit(&mut ids, "Morning Run");
        habit.progress = 2;
        habit.streak = 4;
        habit.status = Status::Paused;
        storage.put_habit(&habit).unwrap();

        let loaded = storage.load_all_habits().unwrap();
        assert_eq!(loaded, vec![habit]);
    }

    #[test]
    fn test_bulk_upsert_overwrites_by_id() {
        let mut ids = IdGenerator::new();
        let mut storage = SqliteStorage::in_memory().unwrap();

        let mut habit = sample_habit(&mut ids, "Read");
        storage.put_habit(&habit).unwrap();

        habit.progress = 1;
        let other = sample_habit(&mut ids, "Meditate");
        storage.put_habits_bulk(&[habit.clone(), other.clone()]).unwrap();

        let mut loaded = storage.load_all_habits().unwrap();
        loaded.sort_by_key(|h| h.id);
        assert_eq!(loaded, vec![habit, other]);
    }

    #[test]
    fn test_delete_missing_habit_is_not_an_error() {
        let storage = SqliteStorage::in_memory().unwrap();
        assert!(storage.delete_habit(HabitId(12345)).is_ok());
    }

    #[test]
    fn test_delete_and_clear() {
        let mut ids = IdGenerator::new();
        let storage = SqliteStorage::in_memory().unwrap();

        let a = sample_habit(&mut ids, "Aaa");
        let b = sample_habit(&mut ids, "Bbb");
        storage.put_habit(&a).unwrap();
        storage.put_habit(&b).unwrap();

        storage.delete_habit(a.id).unwrap();
        assert_eq!(storage.load_all_habits().unwrap(), vec![b]);

        storage.clear_habits().unwrap();
        assert!(storage.load_all_habits().unwrap().is_empty());
    }

    #[test]
    fn test_meta_round_trip_and_missing_keys() {
        let mut storage = SqliteStorage::in_memory().unwrap();

        let mut entries = HashMap::new();
        entries.insert("lastActiveDate".to_string(), json!("2026-08-30"));
        entries.insert("ui".to_string(), json!({"theme": "dark", "notifications": false}));
        storage.set_meta(&entries).unwrap();

        let loaded = storage
            .get_meta(&["lastActiveDate", "ui", "doesNotExist"])
            .unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["lastActiveDate"], json!("2026-08-30"));
        assert_eq!(loaded["ui"]["theme"], json!("dark"));
        assert!(!loaded.contains_key("doesNotExist"));
    }
}
