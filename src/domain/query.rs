/// Filter/query engine
///
/// Pure derivation of the display list: status filter, free-text search over
/// clean names and tags, sorted ascending by `order`. Never mutates the store.

use crate::domain::{Habit, HabitStore, StatusFilter};

/// Derive the filtered, sorted view of the store
///
/// `query` is normalized (trimmed, lowercased) before matching; an empty
/// query matches everything. Ties on `order` break by ID so the result is
/// deterministic.
pub fn view<'a>(store: &'a HabitStore, filter: StatusFilter, query: &str) -> Vec<&'a Habit> {
    let query = query.trim().to_lowercase();

    let mut habits: Vec<&Habit> = store
        .iter()
        .filter(|habit| filter.matches(habit.status))
        .filter(|habit| {
            query.is_empty()
                || habit.clean_name.contains(&query)
                || habit.tags.iter().any(|tag| tag.contains(&query))
        })
        .collect();

    habits.sort_by_key(|habit| (habit.order, habit.id));
    habits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{period, Frequency, IdGenerator, Priority, Status};

    fn sample_store() -> HabitStore {
        let mut ids = IdGenerator::new();
        let mut store = HabitStore::new();
        let specs = [
            ("Morning Run", vec!["fitness"], Status::Active, 2_i64),
            ("Read a Book", vec!["focus", "evening"], Status::Completed, 0),
            ("Meditate", vec!["focus"], Status::Paused, 1),
        ];
        for (name, tags, status, order) in specs {
            let mut habit = Habit::create(
                &mut ids,
                name,
                1,
                Frequency::Daily,
                Priority::Low,
                tags.into_iter().map(str::to_string).collect(),
                period::today_key(),
            )
            .unwrap();
            habit.status = status;
            if status == Status::Completed {
                habit.progress = habit.target;
            }
            habit.order = order;
            store.add(habit).unwrap();
        }
        store
    }

    fn names(habits: &[&Habit]) -> Vec<String> {
        habits.iter().map(|h| h.name.clone()).collect()
    }

    #[test]
    fn test_all_filter_sorts_by_order() {
        let store = sample_store();
        let result = view(&store, StatusFilter::All, "");
        assert_eq!(result.len(), 3);
        assert_eq!(names(&result), vec!["Read a Book", "Meditate", "Morning Run"]);
    }

    #[test]
    fn test_status_filter() {
        let store = sample_store();
        let completed = view(&store, StatusFilter::Completed, "");
        assert_eq!(names(&completed), vec!["Read a Book"]);
        assert!(completed.iter().all(|h| h.status == Status::Completed));
    }

    #[test]
    fn test_query_matches_name_substring() {
        let store = sample_store();
        let result = view(&store, StatusFilter::All, "  RUN ");
        assert_eq!(names(&result), vec!["Morning Run"]);
    }

    #[test]
    fn test_query_matches_tags() {
        let store = sample_store();
        let result = view(&store, StatusFilter::All, "focus");
        assert_eq!(names(&result), vec!["Read a Book", "Meditate"]);
    }

    #[test]
    fn test_filter_and_query_combine() {
        let store = sample_store();
        let result = view(&store, StatusFilter::Paused, "focus");
        assert_eq!(names(&result), vec!["Meditate"]);
        assert!(view(&store, StatusFilter::Active, "focus").is_empty());
    }
}
