/// In-memory habit store with a clean-name uniqueness index
///
/// The store owns every habit exclusively and keeps a normalized-name index
/// strictly consistent with membership: add/remove/restore update both in the
/// same call, so no caller ever observes one without the other.

use std::collections::{BTreeMap, HashSet};

use crate::domain::{clean_name, DomainError, Habit, HabitId};

/// Ordered collection of habits keyed by ID
///
/// Iteration order is ascending by ID (insertion order, since IDs are
/// monotonic); display order is derived separately from the `order` field
/// by the query engine.
#[derive(Debug, Default)]
pub struct HabitStore {
    habits: BTreeMap<HabitId, Habit>,
    names: HashSet<String>,
}

impl HabitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted habits
    ///
    /// Later entries win on a clean-name clash, which cannot happen with data
    /// written by this crate (the database enforces uniqueness too).
    pub fn from_habits(habits: Vec<Habit>) -> Self {
        let mut store = Self::new();
        for habit in habits {
            store.names.insert(habit.clean_name.clone());
            store.habits.insert(habit.id, habit);
        }
        store
    }

    /// Insert a new habit, failing if its clean name is already taken
    pub fn add(&mut self, habit: Habit) -> Result<(), DomainError> {
        if self.names.contains(&habit.clean_name) {
            return Err(DomainError::DuplicateName {
                clean_name: habit.clean_name,
            });
        }
        self.names.insert(habit.clean_name.clone());
        self.habits.insert(habit.id, habit);
        Ok(())
    }

    /// Remove a habit, returning it for potential undo
    pub fn remove(&mut self, id: HabitId) -> Result<Habit, DomainError> {
        match self.habits.remove(&id) {
            Some(habit) => {
                self.names.remove(&habit.clean_name);
                Ok(habit)
            }
            None => Err(DomainError::NotFound { id }),
        }
    }

    /// Re-insert a previously removed habit (undo path)
    ///
    /// Fails with `DuplicateName` if the name was reused since the removal,
    /// returning the habit so the caller can keep it for a later retry.
    pub fn restore(&mut self, habit: Habit) -> Result<(), (Habit, DomainError)> {
        if self.names.contains(&habit.clean_name) {
            let err = DomainError::DuplicateName {
                clean_name: habit.clean_name.clone(),
            };
            return Err((habit, err));
        }
        self.names.insert(habit.clean_name.clone());
        self.habits.insert(habit.id, habit);
        Ok(())
    }

    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.get(&id)
    }

    pub fn get_mut(&mut self, id: HabitId) -> Option<&mut Habit> {
        self.habits.get_mut(&id)
    }

    /// Whether a display name (after normalization) is already taken
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(&clean_name(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Habit> {
        self.habits.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Habit> {
        self.habits.values_mut()
    }

    /// Snapshot of all habits, in ID order
    pub fn list(&self) -> Vec<Habit> {
        self.habits.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    /// Largest ID currently in the store, used to seed the ID generator
    pub fn max_id(&self) -> Option<HabitId> {
        self.habits.keys().next_back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{period, Frequency, IdGenerator, Priority};

    fn habit(ids: &mut IdGenerator, name: &str) -> Habit {
        Habit::create(
            ids,
            name,
            1,
            Frequency::Daily,
            Priority::Low,
            vec![],
            period::today_key(),
        )
        .unwrap()
    }

    #[test]
    fn test_add_rejects_duplicate_clean_name() {
        let mut ids = IdGenerator::new();
        let mut store = HabitStore::new();
        store.add(habit(&mut ids, "Morning Run")).unwrap();

        // Differs only in case and surrounding whitespace
        let result = store.add(habit(&mut ids, "  morning RUN "));
        assert!(matches!(result, Err(DomainError::DuplicateName { .. })));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_returns_habit_and_frees_name() {
        let mut ids = IdGenerator::new();
        let mut store = HabitStore::new();
        let h = habit(&mut ids, "Read");
        let id = h.id;
        store.add(h).unwrap();

        let removed = store.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(!store.contains_name("Read"));

        // Name is available again
        store.add(habit(&mut ids, "Read")).unwrap();
    }

    #[test]
    fn test_remove_missing_id() {
        let mut store = HabitStore::new();
        assert!(matches!(
            store.remove(HabitId(42)),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn test_restore_rejects_reused_name() {
        let mut ids = IdGenerator::new();
        let mut store = HabitStore::new();
        let h = habit(&mut ids, "Read");
        let id = h.id;
        store.add(h).unwrap();

        let removed = store.remove(id).unwrap();
        store.add(habit(&mut ids, "read")).unwrap();

        let (returned, err) = store.restore(removed).unwrap_err();
        assert_eq!(returned.id, id);
        assert!(matches!(err, DomainError::DuplicateName { .. }));
    }

    #[test]
    fn test_restore_reestablishes_index() {
        let mut ids = IdGenerator::new();
        let mut store = HabitStore::new();
        let h = habit(&mut ids, "Read");
        let id = h.id;
        store.add(h).unwrap();

        let removed = store.remove(id).unwrap();
        store.restore(removed).unwrap();
        assert!(store.contains_name("READ"));
        assert!(store.get(id).is_some());
    }

    #[test]
    fn test_from_habits_rebuilds_index() {
        let mut ids = IdGenerator::new();
        let habits = vec![habit(&mut ids, "One more"), habit(&mut ids, "Two more")];
        let store = HabitStore::from_habits(habits);
        assert_eq!(store.len(), 2);
        assert!(store.contains_name("one MORE"));
    }
}
