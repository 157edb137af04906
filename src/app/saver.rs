/// Debounced persistence scheduler
///
/// Mutations apply to in-memory state synchronously; durable writes are
/// coalesced per category on a background task so rapid-fire actions (e.g.
/// repeated increments) produce one store write. The last snapshot scheduled
/// within a window wins. A failed write is logged and surfaced as a notice,
/// never rolled back into memory.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::time::Instant;
use tracing::{debug, error};

use crate::app::view::Notice;
use crate::domain::{Habit, HabitId};
use crate::storage::{SqliteStorage, TrackerStorage};

/// Quiet window for habit-set writes
pub const HABITS_DEBOUNCE: Duration = Duration::from_millis(200);
/// Quiet window for settings writes
pub const META_DEBOUNCE: Duration = Duration::from_millis(250);

enum SaveRequest {
    Habits(Vec<Habit>),
    Meta(HashMap<String, Value>),
    /// Point delete, applied immediately rather than debounced
    Delete(HabitId),
    Flush(oneshot::Sender<()>),
}

/// Handle for scheduling debounced saves
///
/// Dropping the handle closes the channel; the background task flushes any
/// pending snapshots before exiting.
pub struct DebouncedSaver {
    tx: mpsc::UnboundedSender<SaveRequest>,
}

impl DebouncedSaver {
    /// Spawn the background save task
    ///
    /// Persistence failures are reported through `notices`.
    pub fn spawn(
        storage: Arc<Mutex<SqliteStorage>>,
        notices: mpsc::UnboundedSender<Notice>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, storage, notices));
        Self { tx }
    }

    /// Replace any pending habit snapshot and restart its quiet window
    pub fn schedule_habits(&self, snapshot: Vec<Habit>) {
        let _ = self.tx.send(SaveRequest::Habits(snapshot));
    }

    /// Replace any pending meta snapshot and restart its quiet window
    pub fn schedule_meta(&self, snapshot: HashMap<String, Value>) {
        let _ = self.tx.send(SaveRequest::Meta(snapshot));
    }

    /// Delete a habit row without waiting for the next debounced flush
    pub fn delete_now(&self, id: HabitId) {
        let _ = self.tx.send(SaveRequest::Delete(id));
    }

    /// Write both pending categories immediately and wait for the ack
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(SaveRequest::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

/// One debounce channel: the latest pending snapshot and its deadline
struct Pending<T> {
    value: Option<T>,
    deadline: Option<Instant>,
    window: Duration,
}

impl<T> Pending<T> {
    fn new(window: Duration) -> Self {
        Self { value: None, deadline: None, window }
    }

    fn schedule(&mut self, value: T) {
        self.value = Some(value);
        self.deadline = Some(Instant::now() + self.window);
    }

    fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                self.value.take()
            }
            _ => None,
        }
    }

    fn take(&mut self) -> Option<T> {
        self.deadline = None;
        self.value.take()
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<SaveRequest>,
    storage: Arc<Mutex<SqliteStorage>>,
    notices: mpsc::UnboundedSender<Notice>,
) {
    let mut habits = Pending::new(HABITS_DEBOUNCE);
    let mut meta = Pending::new(META_DEBOUNCE);

    loop {
        let next_deadline = [habits.deadline, meta.deadline]
            .into_iter()
            .flatten()
            .min();

        let request = match next_deadline {
            Some(deadline) => tokio::select! {
                request = rx.recv() => request,
                _ = tokio::time::sleep_until(deadline) => {
                    let now = Instant::now();
                    if let Some(snapshot) = habits.take_due(now) {
                        write_habits(&storage, &notices, snapshot).await;
                    }
                    if let Some(snapshot) = meta.take_due(now) {
                        write_meta(&storage, &notices, snapshot).await;
                    }
                    continue;
                }
            },
            None => rx.recv().await,
        };

        match request {
            Some(SaveRequest::Habits(snapshot)) => habits.schedule(snapshot),
            Some(SaveRequest::Meta(snapshot)) => meta.schedule(snapshot),
            Some(SaveRequest::Delete(id)) => {
                if let Err(err) = storage.lock().await.delete_habit(id) {
                    error!("Failed to delete habit {}: {}", id, err);
                    let _ = notices.send(Notice::error("Failed to save changes. Please try again."));
                }
            }
            Some(SaveRequest::Flush(ack)) => {
                if let Some(snapshot) = habits.take() {
                    write_habits(&storage, &notices, snapshot).await;
                }
                if let Some(snapshot) = meta.take() {
                    write_meta(&storage, &notices, snapshot).await;
                }
                let _ = ack.send(());
            }
            None => {
                // Handle dropped: flush whatever is still pending and stop
                if let Some(snapshot) = habits.take() {
                    write_habits(&storage, &notices, snapshot).await;
                }
                if let Some(snapshot) = meta.take() {
                    write_meta(&storage, &notices, snapshot).await;
                }
                debug!("Save task shutting down");
                return;
            }
        }
    }
}

async fn write_habits(
    storage: &Arc<Mutex<SqliteStorage>>,
    notices: &mpsc::UnboundedSender<Notice>,
    snapshot: Vec<Habit>,
) {
    if let Err(err) = storage.lock().await.put_habits_bulk(&snapshot) {
        error!("Failed to save habits: {}", err);
        let _ = notices.send(Notice::error("Failed to save habits. Please try again."));
    }
}

async fn write_meta(
    storage: &Arc<Mutex<SqliteStorage>>,
    notices: &mpsc::UnboundedSender<Notice>,
    snapshot: HashMap<String, Value>,
) {
    if let Err(err) = storage.lock().await.set_meta(&snapshot) {
        error!("Failed to save settings: {}", err);
        let _ = notices.send(Notice::error("Failed to save settings."));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{period, Frequency, IdGenerator, Priority};

    fn sample_habit(name: &str) -> Habit {
        let mut ids = IdGenerator::new();
        Habit::create(
            &mut ids,
            name,
            1,
            Frequency::Daily,
            Priority::Low,
            vec![],
            period::today_key(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_last_scheduled_snapshot_wins() {
        let storage = Arc::new(Mutex::new(SqliteStorage::in_memory().unwrap()));
        let (notice_tx, _notice_rx) = mpsc::unbounded_channel();
        let saver = DebouncedSaver::spawn(storage.clone(), notice_tx);

        let mut habit = sample_habit("Read");
        saver.schedule_habits(vec![habit.clone()]);
        habit.progress = 1;
        saver.schedule_habits(vec![habit.clone()]);
        saver.flush().await;

        let loaded = storage.lock().await.load_all_habits().unwrap();
        assert_eq!(loaded, vec![habit]);
    }

    #[tokio::test]
    async fn test_debounce_writes_after_quiet_window() {
        let storage = Arc::new(Mutex::new(SqliteStorage::in_memory().unwrap()));
        let (notice_tx, _notice_rx) = mpsc::unbounded_channel();
        let saver = DebouncedSaver::spawn(storage.clone(), notice_tx);

        saver.schedule_habits(vec![sample_habit("Read")]);
        assert!(storage.lock().await.load_all_habits().unwrap().is_empty());

        tokio::time::sleep(HABITS_DEBOUNCE + Duration::from_millis(100)).await;
        assert_eq!(storage.lock().await.load_all_habits().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_now_is_immediate() {
        let storage = Arc::new(Mutex::new(SqliteStorage::in_memory().unwrap()));
        let habit = sample_habit("Read");
        storage.lock().await.put_habit(&habit).unwrap();

        let (notice_tx, _notice_rx) = mpsc::unbounded_channel();
        let saver = DebouncedSaver::spawn(storage.clone(), notice_tx);
        saver.delete_now(habit.id);
        saver.flush().await;

        assert!(storage.lock().await.load_all_habits().unwrap().is_empty());
    }
}
