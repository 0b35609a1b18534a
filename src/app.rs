use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate, Utc};
use ratatui::widgets::TableState;
use tracing::{error, info};
use tui_input::Input;

use crate::args::TopLevelCmd;
use crate::errors::AppError;
use crate::graph::surface::{DrawCommand, Viewport};
use crate::graph::{self, GraphStyle};
use crate::sessions::export;
use crate::sessions::filter::{filter_by_window, FilterWindow};
use crate::sessions::store::{JsonSessionStore, SessionStore};
use crate::sessions::{Reading, Session, ValidationError, MAX_READINGS_PER_SESSION};
use crate::settings::{resolve_config_path, Settings};

/// How long a resize burst must be quiet before the graph is rebuilt.
const RESIZE_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Entry,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPopup {
    Fatal(String),
    Intermittent(String),
    UserMustDismiss(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    DeleteSession(i64),
    ClearAll,
    ClearBatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    Systolic,
    Diastolic,
    Pulse,
    Notes,
}

impl EntryField {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Systolic => "Systolic (mmHg)",
            Self::Diastolic => "Diastolic (mmHg)",
            Self::Pulse => "Pulse (bpm, optional)",
            Self::Notes => "Notes (optional)",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Systolic => Self::Diastolic,
            Self::Diastolic => Self::Pulse,
            Self::Pulse => Self::Notes,
            Self::Notes => Self::Systolic,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Systolic => Self::Notes,
            Self::Diastolic => Self::Systolic,
            Self::Pulse => Self::Diastolic,
            Self::Notes => Self::Pulse,
        }
    }
}

/// The unsaved batch being assembled on the entry view.
pub struct EntryForm {
    pub systolic: Input,
    pub diastolic: Input,
    pub pulse: Input,
    pub notes: Input,
    pub focus: EntryField,
    pub pending: Vec<Reading>,
    pub pending_state: TableState,
}

impl EntryForm {
    fn new() -> Self {
        Self {
            systolic: Input::default(),
            diastolic: Input::default(),
            pulse: Input::default(),
            notes: Input::default(),
            focus: EntryField::Systolic,
            pending: Vec::new(),
            pending_state: TableState::default(),
        }
    }

    pub fn focused_input_mut(&mut self) -> &mut Input {
        match self.focus {
            EntryField::Systolic => &mut self.systolic,
            EntryField::Diastolic => &mut self.diastolic,
            EntryField::Pulse => &mut self.pulse,
            EntryField::Notes => &mut self.notes,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Validate the three numeric fields into a reading.
    pub fn parse_reading(&self) -> Result<Reading, ValidationError> {
        let systolic = parse_field(&self.systolic)?;
        let diastolic = parse_field(&self.diastolic)?;
        let raw_pulse = self.pulse.value().trim();
        let pulse = if raw_pulse.is_empty() {
            None
        } else {
            Some(
                raw_pulse
                    .parse::<u16>()
                    .map_err(|_| ValidationError::NotANumber)?,
            )
        };
        Reading::new(systolic, diastolic, pulse)
    }

    fn clear_reading_fields(&mut self) {
        self.systolic.reset();
        self.diastolic.reset();
        self.pulse.reset();
        self.focus = EntryField::Systolic;
    }

    fn reset(&mut self) {
        self.clear_reading_fields();
        self.notes.reset();
        self.pending.clear();
        self.pending_state = TableState::default();
    }

    pub fn select_next_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let next = match self.pending_state.selected() {
            Some(selected) if selected >= self.pending.len() - 1 => 0,
            Some(selected) => selected + 1,
            None => 0,
        };
        self.pending_state.select(Some(next));
    }

    pub fn select_prev_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let previous = match self.pending_state.selected() {
            Some(0) | None => self.pending.len() - 1,
            Some(selected) => selected - 1,
        };
        self.pending_state.select(Some(previous));
    }
}

fn parse_field(input: &Input) -> Result<u16, ValidationError> {
    input
        .value()
        .trim()
        .parse::<u16>()
        .map_err(|_| ValidationError::NotANumber)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChoice {
    Days7,
    Days30,
    Days90,
    Custom,
}

impl FilterChoice {
    pub const ALL: [FilterChoice; 4] = [
        FilterChoice::Days7,
        FilterChoice::Days30,
        FilterChoice::Days90,
        FilterChoice::Custom,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Days7 => "7 Days",
            Self::Days30 => "30 Days",
            Self::Days90 => "90 Days",
            Self::Custom => "Custom",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0)
    }
}

/// Filter controls on the history view. The active window is an immutable
/// value replaced wholesale on each interaction.
pub struct FilterBar {
    pub choice: FilterChoice,
    pub window: FilterWindow,
    pub start: Input,
    pub end: Input,
    pub editing_custom: bool,
    pub end_focused: bool,
}

impl FilterBar {
    fn new(today: NaiveDate) -> Self {
        let default_start = today - chrono::Days::new(30);
        Self {
            choice: FilterChoice::Days7,
            window: FilterWindow::default(),
            start: Input::default().with_value(default_start.format("%Y-%m-%d").to_string()),
            end: Input::default().with_value(today.format("%Y-%m-%d").to_string()),
            editing_custom: false,
            end_focused: false,
        }
    }

    /// Unparseable or empty bounds become `None`, and the filter fails open.
    pub fn custom_window(&self) -> FilterWindow {
        FilterWindow::Explicit {
            start: NaiveDate::parse_from_str(self.start.value().trim(), "%Y-%m-%d").ok(),
            end: NaiveDate::parse_from_str(self.end.value().trim(), "%Y-%m-%d").ok(),
        }
    }

    pub fn focused_input_mut(&mut self) -> &mut Input {
        if self.end_focused {
            &mut self.end
        } else {
            &mut self.start
        }
    }
}

/// Cached graph commands plus the debounce state driving rebuilds.
#[derive(Default)]
pub struct GraphCache {
    commands: Option<Vec<DrawCommand>>,
    viewport: Option<Viewport>,
    dirty: bool,
    resize_deadline: Option<Instant>,
}

pub struct App {
    pub settings: Settings,
    pub config_path: PathBuf,
    pub store: Box<dyn SessionStore>,
    /// Newest-first, mirroring the persisted collection.
    pub sessions: Vec<Session>,
    /// The sessions inside the current filter window, newest-first.
    pub filtered: Vec<Session>,
    pub view: View,
    pub entry: EntryForm,
    pub filter: FilterBar,
    pub history_table: TableState,
    pub prompt: Option<Prompt>,
    pub prompt_state: TableState,
    pub error_message: Option<ErrorPopup>,
    pub graph: GraphCache,
    pub should_quit: bool,
}

impl App {
    pub fn build(arg_config: &TopLevelCmd) -> Result<Self, AppError> {
        let config_path = resolve_config_path(arg_config.config_override.as_deref());
        let settings = Settings::load(&config_path, arg_config.config_required)?;
        let store = Box::new(JsonSessionStore::new(settings.storage.data_file.clone()));
        Ok(Self {
            config_path,
            store,
            sessions: Vec::new(),
            filtered: Vec::new(),
            view: View::Entry,
            entry: EntryForm::new(),
            filter: FilterBar::new(Local::now().date_naive()),
            history_table: TableState::default(),
            prompt: None,
            prompt_state: TableState::default(),
            error_message: None,
            graph: GraphCache::default(),
            should_quit: false,
            settings,
        })
    }

    pub fn save_settings(&self, arg_config: &TopLevelCmd) -> Result<(), AppError> {
        if arg_config.no_save {
            return Ok(());
        }
        self.settings.save(&self.config_path)
    }

    /// Prune expired sessions, then load the collection.
    pub fn init(&mut self) {
        let retention = self.settings.storage.retention_days;
        if let Err(e) = self.store.prune_older_than(retention, Utc::now()) {
            error!("Startup prune failed: {e}");
        }
        self.sessions = self.store.load();
        info!("Loaded {} session(s)", self.sessions.len());
        self.refresh_filtered();
    }

    pub fn refresh_filtered(&mut self) {
        self.filtered = filter_by_window(&self.sessions, &self.filter.window, Utc::now());
        self.graph.dirty = true;
        if self.filtered.is_empty() {
            self.history_table.select(None);
        } else {
            let selected = self.history_table.selected().unwrap_or(0);
            self.history_table
                .select(Some(selected.min(self.filtered.len() - 1)));
        }
    }

    // ─── Entry view ──────────────────────────────────────────────

    pub fn add_reading(&mut self) {
        if self.entry.pending.len() >= MAX_READINGS_PER_SESSION {
            self.notify_error(ValidationError::BatchFull.to_string());
            return;
        }
        match self.entry.parse_reading() {
            Ok(reading) => {
                self.entry.pending.push(reading);
                self.entry
                    .pending_state
                    .select(Some(self.entry.pending.len() - 1));
                self.entry.clear_reading_fields();
            }
            Err(e) => self.notify_error(e.to_string()),
        }
    }

    pub fn remove_selected_reading(&mut self) {
        let Some(index) = self.entry.pending_state.selected() else {
            return;
        };
        if index >= self.entry.pending.len() {
            return;
        }
        self.entry.pending.remove(index);
        if self.entry.pending.is_empty() {
            self.entry.pending_state.select(None);
        } else {
            self.entry
                .pending_state
                .select(Some(index.min(self.entry.pending.len() - 1)));
        }
    }

    pub fn save_session(&mut self) {
        if self.entry.pending.is_empty() {
            self.notify_error(ValidationError::EmptyBatch.to_string());
            return;
        }
        let notes = Some(self.entry.notes.value().to_owned());
        let session = match Session::new(self.entry.pending.clone(), notes, Utc::now()) {
            Ok(session) => session,
            Err(e) => {
                self.notify_error(e.to_string());
                return;
            }
        };

        // The write must land before the UI adopts the new collection; on
        // failure the in-memory state stays at the persisted truth.
        let mut updated = self.sessions.clone();
        updated.insert(0, session.clone());
        match self.store.save(&updated) {
            Ok(()) => {
                info!(
                    "Saved session {} ({} readings)",
                    session.id,
                    session.readings.len()
                );
                self.sessions = updated;
                self.entry.reset();
                self.refresh_filtered();
                self.error_message = Some(ErrorPopup::Intermittent(format!(
                    "Session saved! Average: {}",
                    session.average.display()
                )));
            }
            Err(e) => {
                error!("Failed to save session: {e}");
                self.notify_error(format!("Failed to save data. Storage might be full.\n{e}"));
            }
        }
    }

    // ─── History view ────────────────────────────────────────────

    /// Rolling windows are anchored to "now", so entering the view
    /// re-evaluates the filter.
    pub fn show_history(&mut self) {
        self.view = View::History;
        self.refresh_filtered();
    }

    pub fn set_filter_choice(&mut self, choice: FilterChoice) {
        self.filter.choice = choice;
        self.filter.editing_custom = matches!(choice, FilterChoice::Custom);
        self.filter.window = match choice {
            FilterChoice::Days7 => FilterWindow::Rolling { days: 7 },
            FilterChoice::Days30 => FilterWindow::Rolling { days: 30 },
            FilterChoice::Days90 => FilterWindow::Rolling { days: 90 },
            FilterChoice::Custom => self.filter.custom_window(),
        };
        self.refresh_filtered();
    }

    pub fn apply_custom_range(&mut self) {
        self.filter.window = self.filter.custom_window();
        self.filter.editing_custom = false;
        self.refresh_filtered();
    }

    pub fn history_scroll_down(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        let next = match self.history_table.selected() {
            Some(selected) if selected >= self.filtered.len() - 1 => 0,
            Some(selected) => selected + 1,
            None => 0,
        };
        self.history_table.select(Some(next));
    }

    pub fn history_scroll_up(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        let previous = match self.history_table.selected() {
            Some(0) | None => self.filtered.len() - 1,
            Some(selected) => selected - 1,
        };
        self.history_table.select(Some(previous));
    }

    pub fn export_data(&mut self) {
        if self.sessions.is_empty() {
            self.notify_error("No data to export.".to_owned());
            return;
        }
        let dir = self.export_dir();
        match export::write_report(
            &self.sessions,
            &dir,
            self.settings.misc.use_12hr_time,
            Local::now(),
        ) {
            Ok(path) => {
                info!("Exported {} session(s) to {}", self.sessions.len(), path.display());
                self.error_message = Some(ErrorPopup::Intermittent(format!(
                    "Exported {} session(s) to {}",
                    self.sessions.len(),
                    path.display()
                )));
            }
            Err(e) => {
                error!("Export failed: {e}");
                self.notify_error(format!("Export failed.\n{e}"));
            }
        }
    }

    fn export_dir(&self) -> PathBuf {
        if self.settings.export.dir.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.settings.export.dir)
        }
    }

    // ─── Prompts & popups ────────────────────────────────────────

    pub fn request_clear_batch(&mut self) {
        if self.entry.pending.is_empty() {
            return;
        }
        self.open_prompt(Prompt::ClearBatch);
    }

    pub fn request_delete_selected(&mut self) {
        let Some(index) = self.history_table.selected() else {
            return;
        };
        let Some(session) = self.filtered.get(index) else {
            return;
        };
        self.open_prompt(Prompt::DeleteSession(session.id));
    }

    pub fn request_clear_all(&mut self) {
        if self.sessions.is_empty() {
            self.notify_error("No data to clear.".to_owned());
            return;
        }
        self.open_prompt(Prompt::ClearAll);
    }

    fn open_prompt(&mut self, prompt: Prompt) {
        self.prompt = Some(prompt);
        // Defaults to "No".
        self.prompt_state.select(Some(1));
    }

    pub fn prompt_title(&self, prompt: Prompt) -> String {
        match prompt {
            Prompt::ClearBatch => "Clear all readings in this session?".to_owned(),
            Prompt::DeleteSession(_) => "Delete this session?".to_owned(),
            Prompt::ClearAll => format!(
                "Delete ALL {} session(s)? This cannot be undone.",
                self.sessions.len()
            ),
        }
    }

    pub fn confirm_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        match prompt {
            Prompt::ClearBatch => self.entry.reset(),
            Prompt::DeleteSession(id) => match self.store.delete_one(id) {
                Ok(()) => {
                    info!("Deleted session {id}");
                    self.sessions = self.store.load();
                    self.refresh_filtered();
                }
                Err(e) => {
                    error!("Failed to delete session {id}: {e}");
                    self.notify_error(format!("Failed to delete session.\n{e}"));
                }
            },
            Prompt::ClearAll => match self.store.clear_all() {
                Ok(()) => {
                    info!("Cleared all session data");
                    self.sessions.clear();
                    self.refresh_filtered();
                    self.error_message = Some(ErrorPopup::Intermittent(
                        "All session data has been cleared.".to_owned(),
                    ));
                }
                Err(e) => {
                    error!("Failed to clear session data: {e}");
                    self.notify_error(format!("Failed to clear session data.\n{e}"));
                }
            },
        }
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    pub fn toggle_prompt_selection(&mut self) {
        let current = self.prompt_state.selected().unwrap_or(1);
        self.prompt_state.select(Some(1 - current.min(1)));
    }

    pub fn dismiss_popup(&mut self) {
        if matches!(self.error_message, Some(ErrorPopup::Fatal(_))) {
            self.should_quit = true;
        }
        self.error_message = None;
    }

    fn notify_error(&mut self, message: String) {
        self.error_message = Some(ErrorPopup::UserMustDismiss(message));
    }

    // ─── Graph cache & timing ────────────────────────────────────

    /// A resize arms (or re-arms) the debounce deadline; the pending render
    /// is superseded, not queued.
    pub fn on_resize(&mut self) {
        self.graph.resize_deadline = Some(Instant::now() + RESIZE_DEBOUNCE);
    }

    pub fn term_tick(&mut self) {
        if let Some(deadline) = self.graph.resize_deadline {
            if Instant::now() >= deadline {
                self.graph.resize_deadline = None;
                self.graph.dirty = true;
            }
        }
    }

    /// The command list for the current viewport, rebuilt when the data,
    /// filter, or (debounced) surface size changed. `None` means no data.
    pub fn graph_commands(&mut self, viewport: Viewport) -> Option<&[DrawCommand]> {
        if self.graph.viewport != Some(viewport) {
            self.graph.viewport = Some(viewport);
            // First draw renders immediately; a live resize waits out the
            // debounce window with the stale frame.
            if self.graph.resize_deadline.is_none() {
                self.graph.dirty = true;
            }
        }
        if self.graph.dirty {
            self.rebuild_graph();
        }
        self.graph.commands.as_deref()
    }

    fn rebuild_graph(&mut self) {
        self.graph.dirty = false;
        let Some(viewport) = self.graph.viewport else {
            return;
        };
        let style = GraphStyle {
            pulse_enabled: self.settings.graph.pulse_enabled,
            max_x_labels: self.settings.graph.max_x_labels,
            ..GraphStyle::compact()
        };
        self.graph.commands = graph::render(&self.filtered, &viewport, &style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::surface::Insets;
    use crate::sessions::store::StoreError;

    /// A store whose writes always fail, as if the disk were full.
    struct RejectingStore;

    impl SessionStore for RejectingStore {
        fn load(&self) -> Vec<Session> {
            Vec::new()
        }
        fn save(&self, _sessions: &[Session]) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
        fn delete_one(&self, _id: i64) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
        fn clear_all(&self) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
        fn prune_older_than(
            &self,
            _days: i64,
            _now: chrono::DateTime<Utc>,
        ) -> Result<usize, StoreError> {
            Ok(0)
        }
    }

    fn test_app(store: Box<dyn SessionStore>) -> App {
        App {
            settings: Settings::default(),
            config_path: PathBuf::new(),
            store,
            sessions: Vec::new(),
            filtered: Vec::new(),
            view: View::Entry,
            entry: EntryForm::new(),
            filter: FilterBar::new(Local::now().date_naive()),
            history_table: TableState::default(),
            prompt: None,
            prompt_state: TableState::default(),
            error_message: None,
            graph: GraphCache::default(),
            should_quit: false,
        }
    }

    fn reading() -> Reading {
        Reading::new(132, 85, Some(70)).unwrap()
    }

    fn viewport(width: f64, height: f64) -> Viewport {
        Viewport::new(
            width,
            height,
            1.0,
            Insets {
                top: 4.0,
                right: 14.0,
                bottom: 9.0,
                left: 10.0,
            },
        )
    }

    #[test]
    fn failed_save_rolls_back_the_in_memory_collection() {
        let mut app = test_app(Box::new(RejectingStore));
        app.entry.pending.push(reading());

        app.save_session();

        // The persisted truth wins: no session appears, and the unsaved
        // batch survives for a retry.
        assert!(app.sessions.is_empty());
        assert_eq!(app.entry.pending.len(), 1);
        assert!(matches!(
            app.error_message,
            Some(ErrorPopup::UserMustDismiss(_))
        ));
    }

    #[test]
    fn successful_save_prepends_and_resets_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::sessions::store::JsonSessionStore::new(dir.path().join("s.json"));
        let mut app = test_app(Box::new(store));
        app.entry.pending.push(reading());

        app.save_session();

        assert_eq!(app.sessions.len(), 1);
        assert!(app.entry.pending.is_empty());
        assert!(matches!(
            app.error_message,
            Some(ErrorPopup::Intermittent(_))
        ));
        assert_eq!(app.store.load(), app.sessions);
    }

    #[test]
    fn invalid_input_is_rejected_without_state_change() {
        let mut app = test_app(Box::new(RejectingStore));
        app.entry.systolic = Input::default().with_value("300".to_owned());
        app.entry.diastolic = Input::default().with_value("80".to_owned());

        app.add_reading();

        assert!(app.entry.pending.is_empty());
        assert!(matches!(
            app.error_message,
            Some(ErrorPopup::UserMustDismiss(_))
        ));
    }

    #[test]
    fn batch_is_capped_at_ten_readings() {
        let mut app = test_app(Box::new(RejectingStore));
        app.entry.pending = vec![reading(); MAX_READINGS_PER_SESSION];
        app.entry.systolic = Input::default().with_value("120".to_owned());
        app.entry.diastolic = Input::default().with_value("80".to_owned());

        app.add_reading();

        assert_eq!(app.entry.pending.len(), MAX_READINGS_PER_SESSION);
        assert!(app.error_message.is_some());
    }

    #[test]
    fn resize_debounce_defers_the_graph_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::sessions::store::JsonSessionStore::new(dir.path().join("s.json"));
        let mut app = test_app(Box::new(store));
        app.entry.pending.push(reading());
        app.save_session();
        app.dismiss_popup();

        let small = viewport(100.0, 60.0);
        let large = viewport(200.0, 120.0);

        let initial = app.graph_commands(small).map(<[DrawCommand]>::to_vec);
        assert!(initial.is_some());

        // Mid-burst the stale frame is kept, even at the new size.
        app.on_resize();
        let during = app.graph_commands(large).map(<[DrawCommand]>::to_vec);
        assert_eq!(during, initial);

        // Once the burst has been quiet for the debounce window, the next
        // tick triggers a fresh render at the new viewport.
        std::thread::sleep(RESIZE_DEBOUNCE + Duration::from_millis(20));
        app.term_tick();
        let settled = app.graph_commands(large).map(<[DrawCommand]>::to_vec);
        assert!(settled.is_some());
        assert_ne!(settled, initial);
    }

    #[test]
    fn clearing_all_data_empties_the_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::sessions::store::JsonSessionStore::new(dir.path().join("s.json"));
        let mut app = test_app(Box::new(store));
        app.entry.pending.push(reading());
        app.save_session();
        app.dismiss_popup();

        app.request_clear_all();
        assert!(app.prompt.is_some());
        app.confirm_prompt();

        assert!(app.sessions.is_empty());
        assert!(app.store.load().is_empty());
    }
}
