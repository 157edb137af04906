/// Application controller wiring the domain to persistence
///
/// [`SmartTracker`] owns the single `AppState`, applies every command to
/// in-memory state synchronously, and schedules debounced best-effort writes
/// through the storage gateway. There is exactly one logical writer, so no
/// locking is needed around the state itself.

pub mod saver;
pub mod view;

pub use saver::DebouncedSaver;
pub use view::{CommandOutcome, Notice, NoticeLevel, ViewModel};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::domain::{
    lifecycle, period, query, reorder, stats, Frequency, Habit, HabitId, HabitStore, IdGenerator,
    IncrementOutcome, Position, Priority, Stats, Status, StatusFilter, Theme,
};
use crate::storage::{SqliteStorage, TrackerStorage};
use crate::TrackerError;

const META_FILTERS: &str = "filters";
const META_LAST_ACTIVE: &str = "lastActiveDate";
const META_UI: &str = "ui";

/// Process-wide mutable state, loaded once at startup
#[derive(Debug)]
pub struct AppState {
    pub store: HabitStore,
    pub filter: StatusFilter,
    pub query: String,
    pub last_active_date: Option<String>,
    pub theme: Theme,
    pub notifications: bool,
}

/// Persisted shape of the active filters
#[derive(Debug, Serialize, Deserialize)]
struct FiltersMeta {
    status: StatusFilter,
    q: String,
}

/// Persisted shape of the UI preferences
#[derive(Debug, Serialize, Deserialize)]
struct UiMeta {
    theme: Theme,
    notifications: bool,
}

/// Input for the add-habit command
#[derive(Debug, Clone, Deserialize)]
pub struct AddHabitParams {
    pub name: String,
    #[serde(default = "default_target")]
    pub target: u32,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_target() -> u32 {
    1
}

/// The habit tracker controller
///
/// Exposes the command surface consumed by any presentation layer and a
/// read-only view of the filtered list plus stats. Commands that can fail
/// validation return `Err` without touching state; missing-ID commands are
/// silent no-ops, matching the engine's original behavior.
pub struct SmartTracker {
    state: AppState,
    ids: IdGenerator,
    /// Single-slot undo buffer; a second deletion overwrites the first
    undo: Option<Habit>,
    saver: DebouncedSaver,
    storage: Arc<Mutex<SqliteStorage>>,
    notice_rx: mpsc::UnboundedReceiver<Notice>,
}

impl SmartTracker {
    /// Open the tracker against a database file
    ///
    /// Runs migrations, loads habits and settings, rebuilds the uniqueness
    /// index, and applies the period rollover sweep before the first render.
    pub async fn open(db_path: &Path) -> Result<Self, TrackerError> {
        let storage = SqliteStorage::new(db_path)?;
        Self::with_storage(storage).await
    }

    /// Open the tracker on an already-initialized storage backend
    pub async fn with_storage(storage: SqliteStorage) -> Result<Self, TrackerError> {
        let habits = storage.load_all_habits()?;
        let meta = storage.get_meta(&[META_FILTERS, META_LAST_ACTIVE, META_UI])?;

        let store = HabitStore::from_habits(habits);
        let ids = IdGenerator::starting_after(store.max_id().map_or(0, |id| id.as_millis()));

        let mut state = AppState {
            store,
            filter: StatusFilter::All,
            query: String::new(),
            last_active_date: None,
            theme: Theme::Light,
            notifications: true,
        };
        apply_meta(&mut state, meta);

        info!("Loaded {} habits", state.store.len());

        let storage = Arc::new(Mutex::new(storage));
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let saver = DebouncedSaver::spawn(storage.clone(), notice_tx);

        let mut tracker = Self {
            state,
            ids,
            undo: None,
            saver,
            storage,
            notice_rx,
        };
        tracker.sweep_rollovers();
        Ok(tracker)
    }

    /// Read-only snapshot of the current display state
    pub fn view(&self) -> ViewModel {
        ViewModel {
            habits: query::view(&self.state.store, self.state.filter, &self.state.query)
                .into_iter()
                .cloned()
                .collect(),
            stats: stats::compute(&self.state.store),
            filter: self.state.filter,
            query: self.state.query.clone(),
        }
    }

    /// Aggregates over the full habit set
    pub fn stats(&self) -> Stats {
        stats::compute(&self.state.store)
    }

    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    pub fn notifications_enabled(&self) -> bool {
        self.state.notifications
    }

    /// Look up a habit ID by exact (normalized) display name
    pub fn find_by_name(&self, name: &str) -> Option<HabitId> {
        let clean = crate::domain::clean_name(name);
        self.state
            .store
            .iter()
            .find(|h| h.clean_name == clean)
            .map(|h| h.id)
    }

    /// Create and insert a new habit
    pub fn add_habit(&mut self, params: AddHabitParams) -> Result<CommandOutcome, TrackerError> {
        let period_key = period::key_for(params.frequency);
        let habit = Habit::create(
            &mut self.ids,
            &params.name,
            params.target,
            params.frequency,
            params.priority,
            params.tags,
            period_key,
        )?;
        self.state.store.add(habit)?;

        self.schedule_habits_save();
        Ok(self.outcome(self.notice(Notice::info("Habit added successfully."))))
    }

    /// Advance a habit's progress by one
    ///
    /// Runs the rollover check first. Unknown IDs are ignored.
    pub fn increment_habit(&mut self, id: HabitId) -> CommandOutcome {
        let result = match self.state.store.get_mut(id) {
            Some(habit) => {
                let key = period::key_for(habit.frequency);
                Some(lifecycle::increment(habit, &key))
            }
            None => {
                debug!("Increment of missing habit {} ignored", id);
                None
            }
        };

        let notice = match result {
            Some(IncrementOutcome::Completed) => {
                self.notice(Notice::success("Congratulations! Habit completed."))
            }
            _ => None,
        };

        self.schedule_habits_save();
        self.outcome(notice)
    }

    /// Flip a habit between active and paused; completed habits are left alone
    pub fn toggle_pause(&mut self, id: HabitId) -> CommandOutcome {
        let toggled = match self.state.store.get_mut(id) {
            Some(habit) => lifecycle::toggle_pause(habit),
            None => {
                debug!("Pause toggle of missing habit {} ignored", id);
                None
            }
        };

        let notice = match toggled {
            Some(Status::Paused) => self.notice(Notice::info("Habit paused")),
            Some(_) => self.notice(Notice::info("Habit resumed")),
            None => None,
        };

        self.schedule_habits_save();
        self.outcome(notice)
    }

    /// Remove a habit, retaining it in the single undo slot
    pub fn delete_habit(&mut self, id: HabitId) -> CommandOutcome {
        match self.state.store.remove(id) {
            Ok(habit) => {
                if self.undo.is_some() {
                    debug!("Undo slot overwritten by a newer deletion");
                }
                self.undo = Some(habit);
                self.saver.delete_now(id);
                self.schedule_habits_save();
                self.outcome(self.notice(Notice::attention("Habit removed successfully.")))
            }
            Err(_) => {
                debug!("Delete of missing habit {} ignored", id);
                self.outcome(None)
            }
        }
    }

    /// Re-insert the most recently deleted habit
    ///
    /// Fails with `DuplicateName` if the name was reused since the deletion;
    /// the undo slot is kept in that case so a retry stays possible.
    pub fn undo_delete(&mut self) -> Result<CommandOutcome, TrackerError> {
        let Some(habit) = self.undo.take() else {
            return Ok(self.outcome(None));
        };

        match self.state.store.restore(habit) {
            Ok(()) => {
                self.schedule_habits_save();
                Ok(self.outcome(self.notice(Notice::info("Habit restored."))))
            }
            Err((habit, err)) => {
                self.undo = Some(habit);
                Err(err.into())
            }
        }
    }

    /// Move a habit next to another one and reindex the display order
    pub fn reorder(
        &mut self,
        dragged: HabitId,
        target: HabitId,
        position: Position,
    ) -> CommandOutcome {
        if reorder::reorder(&mut self.state.store, dragged, target, position) {
            self.schedule_habits_save();
        }
        self.outcome(None)
    }

    /// Change the status filter applied to the view
    pub fn set_filter(&mut self, filter: StatusFilter) -> CommandOutcome {
        self.state.filter = filter;
        self.schedule_meta_save();
        self.outcome(None)
    }

    /// Change the free-text query applied to the view
    pub fn set_query(&mut self, text: &str) -> CommandOutcome {
        self.state.query = text.trim().to_lowercase();
        self.schedule_meta_save();
        self.outcome(None)
    }

    /// Clear both the status filter and the query
    pub fn clear_filters(&mut self) -> CommandOutcome {
        self.state.filter = StatusFilter::All;
        self.state.query.clear();
        self.schedule_meta_save();
        self.outcome(None)
    }

    pub fn set_theme(&mut self, theme: Theme) -> CommandOutcome {
        self.state.theme = theme;
        self.schedule_meta_save();
        let text = match theme {
            Theme::Dark => "Dark theme enabled.",
            Theme::Light => "Light theme enabled.",
        };
        self.outcome(self.notice(Notice::info(text)))
    }

    pub fn set_notifications(&mut self, enabled: bool) -> CommandOutcome {
        // The disable notice is still delivered; suppression applies from the
        // next command on.
        let notice = if enabled {
            self.state.notifications = true;
            Some(Notice::info("Notifications enabled."))
        } else {
            let notice = self.notice(Notice::info("Notifications disabled."));
            self.state.notifications = false;
            notice
        };
        self.schedule_meta_save();
        self.outcome(notice)
    }

    /// Reset progress for every habit whose period key is stale
    ///
    /// Run at startup and safe to call periodically; idempotent within a
    /// period.
    pub fn sweep_rollovers(&mut self) -> CommandOutcome {
        let mut did_reset = false;
        for habit in self.state.store.iter_mut() {
            let key = period::key_for(habit.frequency);
            if lifecycle::rollover(habit, &key) {
                did_reset = true;
            }
        }

        let notice = if did_reset {
            self.state.last_active_date = Some(period::today_key());
            self.schedule_meta_save();
            self.notice(Notice::info("Habits progress reset"))
        } else {
            None
        };
        self.schedule_habits_save();
        self.outcome(notice)
    }

    /// Drain any notices produced by background persistence failures
    pub fn take_background_notices(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(notice) = self.notice_rx.try_recv() {
            notices.push(notice);
        }
        notices
    }

    /// Write all pending debounced saves now
    ///
    /// Call before process exit; in-memory state is the source of truth until
    /// this completes.
    pub async fn flush(&self) {
        self.saver.flush().await;
    }

    /// Direct handle to the storage backend (useful for tests)
    pub fn storage(&self) -> Arc<Mutex<SqliteStorage>> {
        self.storage.clone()
    }

    fn outcome(&self, notice: Option<Notice>) -> CommandOutcome {
        CommandOutcome {
            notice,
            view: self.view(),
        }
    }

    /// Apply the notifications preference; errors always get through
    fn notice(&self, notice: Notice) -> Option<Notice> {
        if self.state.notifications || notice.level == NoticeLevel::Error {
            Some(notice)
        } else {
            None
        }
    }

    fn schedule_habits_save(&self) {
        self.saver.schedule_habits(self.state.store.list());
    }

    fn schedule_meta_save(&self) {
        let mut entries: HashMap<String, Value> = HashMap::new();
        let filters = FiltersMeta {
            status: self.state.filter,
            q: self.state.query.clone(),
        };
        let ui = UiMeta {
            theme: self.state.theme,
            notifications: self.state.notifications,
        };
        // Serializing plain structs with derived impls can't fail
        if let (Ok(filters), Ok(ui)) = (
            serde_json::to_value(&filters),
            serde_json::to_value(&ui),
        ) {
            entries.insert(META_FILTERS.to_string(), filters);
            entries.insert(META_UI.to_string(), ui);
        }
        entries.insert(
            META_LAST_ACTIVE.to_string(),
            self.state
                .last_active_date
                .as_deref()
                .map_or(Value::Null, Value::from),
        );
        self.saver.schedule_meta(entries);
    }
}

/// Fold loaded meta entries into the default state, tolerating missing or
/// malformed values (a wiped settings row shouldn't brick startup)
fn apply_meta(state: &mut AppState, meta: HashMap<String, Value>) {
    if let Some(value) = meta.get(META_FILTERS) {
        match serde_json::from_value::<FiltersMeta>(value.clone()) {
            Ok(filters) => {
                state.filter = filters.status;
                state.query = filters.q;
            }
            Err(err) => warn!("Ignoring malformed filters meta: {}", err),
        }
    }
    if let Some(value) = meta.get(META_UI) {
        match serde_json::from_value::<UiMeta>(value.clone()) {
            Ok(ui) => {
                state.theme = ui.theme;
                state.notifications = ui.notifications;
            }
            Err(err) => warn!("Ignoring malformed ui meta: {}", err),
        }
    }
    if let Some(Value::String(date)) = meta.get(META_LAST_ACTIVE) {
        state.last_active_date = Some(date.clone());
    }
}
