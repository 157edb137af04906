/// List reordering after a drag-and-drop move
///
/// The algorithm mirrors a splice-based move: remove the dragged habit from
/// the sequence sorted by `order`, compute the insertion index next to the
/// target (adjusted for the shift caused by the removal), insert, then
/// dense-reassign `order = index` for every habit. All non-moved habits keep
/// their relative order.

use crate::domain::{HabitId, HabitStore};

/// Where the dragged habit lands relative to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Before,
    After,
}

/// Move `dragged` next to `target` and reindex the whole sequence
///
/// Operates on the full habit set sorted by `order`. No-op (returns false)
/// when the two IDs are equal or either is missing.
pub fn reorder(
    store: &mut HabitStore,
    dragged: HabitId,
    target: HabitId,
    position: Position,
) -> bool {
    if dragged == target {
        return false;
    }

    let mut sequence: Vec<HabitId> = {
        let mut habits: Vec<_> = store.iter().map(|h| (h.order, h.id)).collect();
        habits.sort();
        habits.into_iter().map(|(_, id)| id).collect()
    };

    let Some(dragged_index) = sequence.iter().position(|&id| id == dragged) else {
        return false;
    };
    let Some(target_index) = sequence.iter().position(|&id| id == target) else {
        return false;
    };

    let moved = sequence.remove(dragged_index);
    // Indexes below refer to the sequence after removal, hence the
    // asymmetric adjustment depending on which side the drag started from.
    let insert_index = match position {
        Position::After => target_index + if dragged_index < target_index { 0 } else { 1 },
        Position::Before => target_index - if dragged_index < target_index { 1 } else { 0 },
    };
    sequence.insert(insert_index, moved);

    for (index, id) in sequence.iter().enumerate() {
        if let Some(habit) = store.get_mut(*id) {
            habit.order = index as i64;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{period, Frequency, Habit, IdGenerator, Priority};

    fn store_with(names: &[&str]) -> (HabitStore, Vec<HabitId>) {
        let mut ids = IdGenerator::new();
        let mut store = HabitStore::new();
        let mut habit_ids = Vec::new();
        for (index, name) in names.iter().enumerate() {
            let mut habit = Habit::create(
                &mut ids,
                name,
                1,
                Frequency::Daily,
                Priority::Low,
                vec![],
                period::today_key(),
            )
            .unwrap();
            habit.order = index as i64;
            habit_ids.push(habit.id);
            store.add(habit).unwrap();
        }
        (store, habit_ids)
    }

    fn display_order(store: &HabitStore) -> Vec<String> {
        let mut habits: Vec<_> = store.iter().collect();
        habits.sort_by_key(|h| h.order);
        habits.iter().map(|h| h.name.clone()).collect()
    }

    #[test]
    fn test_drag_first_after_last() {
        let (mut store, ids) = store_with(&["Aaa", "Bbb", "Ccc"]);
        assert!(reorder(&mut store, ids[0], ids[2], Position::After));
        assert_eq!(display_order(&store), vec!["Bbb", "Ccc", "Aaa"]);

        // Orders are dense-reindexed to 0..n
        let mut orders: Vec<_> = store.iter().map(|h| h.order).collect();
        orders.sort();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_drag_last_before_first() {
        let (mut store, ids) = store_with(&["Aaa", "Bbb", "Ccc"]);
        assert!(reorder(&mut store, ids[2], ids[0], Position::Before));
        assert_eq!(display_order(&store), vec!["Ccc", "Aaa", "Bbb"]);
    }

    #[test]
    fn test_drag_forward_before_target() {
        let (mut store, ids) = store_with(&["Aaa", "Bbb", "Ccc", "Ddd"]);
        assert!(reorder(&mut store, ids[0], ids[2], Position::Before));
        assert_eq!(display_order(&store), vec!["Bbb", "Aaa", "Ccc", "Ddd"]);
    }

    #[test]
    fn test_drag_backward_after_target() {
        let (mut store, ids) = store_with(&["Aaa", "Bbb", "Ccc", "Ddd"]);
        assert!(reorder(&mut store, ids[3], ids[0], Position::After));
        assert_eq!(display_order(&store), vec!["Aaa", "Ddd", "Bbb", "Ccc"]);
    }

    #[test]
    fn test_noop_on_self_or_missing() {
        let (mut store, ids) = store_with(&["Aaa", "Bbb"]);
        assert!(!reorder(&mut store, ids[0], ids[0], Position::After));
        assert!(!reorder(&mut store, HabitId(1), ids[0], Position::After));
        assert!(!reorder(&mut store, ids[0], HabitId(1), Position::Before));
        assert_eq!(display_order(&store), vec!["Aaa", "Bbb"]);
    }
}
