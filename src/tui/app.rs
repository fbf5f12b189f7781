use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Position, Rect};

use crate::io::lock::FileLock;
use crate::io::recovery::log_rejected_drop;
use crate::io::settings::{APPLICATION, BoardPosition, ORGANIZATION, Settings, settings_path};
use crate::io::store_io::{self, LoadSource};
use crate::io::watcher::StoreWatcher;
use crate::model::config::{Configuration, DEFAULT_EVENT_NAME, DEFAULT_TITLE};
use crate::model::store::TaskStore;
use crate::model::task::{Quadrant, now_stamp};
use crate::ops::countdown::Countdown;
use crate::ops::drag::{DragPayload, complete_drop};
use crate::ops::export::{DEFAULT_EXPORT_NAME, export_csv};
use crate::ops::task_ops;

use super::input;
use super::render;
use super::theme::Theme;

/// How often the countdown is recomputed
const COUNTDOWN_REFRESH: Duration = Duration::from_secs(60);

/// Settings key remembering where the last export went
const LAST_EXPORT_KEY: &str = "last_export";

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing into the status row
    Edit,
    /// Keyboard drag: a task is picked up and a drop spot is being chosen
    Grab,
}

/// What the edit buffer will be written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    NewTask(Quadrant),
    Title,
    EventName,
    TargetDate,
}

impl EditTarget {
    pub fn prompt(self) -> String {
        match self {
            EditTarget::NewTask(q) => format!("新增任务 ({})", q.label()),
            EditTarget::Title => "标题".to_string(),
            EditTarget::EventName => "事件".to_string(),
            EditTarget::TargetDate => "日期 (YYYY-MM-DD)".to_string(),
        }
    }

    /// Longest text accepted, in characters
    pub fn max_chars(self) -> Option<usize> {
        match self {
            EditTarget::NewTask(_) => None,
            EditTarget::Title => Some(7),
            EditTarget::EventName => Some(6),
            EditTarget::TargetDate => Some(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditState {
    pub target: EditTarget,
    pub buffer: String,
    /// Byte offset into `buffer`
    pub cursor: usize,
}

#[derive(Debug, Clone)]
pub struct GrabState {
    /// Encoded drag payload
    pub payload: String,
    pub origin: (Quadrant, usize),
    pub target: Quadrant,
    /// Drop spot: the task is placed before this row (`len` = end of list)
    pub row: usize,
}

/// Left button held on a task
#[derive(Debug, Clone)]
pub struct MouseDrag {
    pub payload: String,
    pub origin: (Quadrant, usize),
    pub start: (u16, u16),
    pub moved: bool,
    /// Pane (and row) currently under the pointer
    pub hover: Option<(Quadrant, Option<usize>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

/// Main application state
pub struct App {
    pub store: TaskStore,
    pub config: Configuration,
    pub data_path: PathBuf,
    /// Key-value store for position and last export; None disables it
    pub settings_path: Option<PathBuf>,
    pub mode: Mode,
    pub focus: Quadrant,
    /// Selected row per quadrant
    pub cursors: [usize; 4],
    /// First visible row per quadrant
    pub scroll: [usize; 4],
    /// Pane rectangles as last rendered
    pub pane_areas: [Rect; 4],
    /// Task list rectangles (inside the borders) as last rendered
    pub list_areas: [Rect; 4],
    pub edit: Option<EditState>,
    pub grab: Option<GrabState>,
    pub mouse_drag: Option<MouseDrag>,
    pub today: NaiveDate,
    pub status: Option<Status>,
    pub should_quit: bool,
    pub theme: Theme,
    /// Document text as last loaded or saved by us
    last_synced: Option<String>,
}

impl App {
    pub fn new(store: TaskStore, config: Configuration, data_path: PathBuf) -> Self {
        let last_synced = store_io::render_document(&store, &config).ok();
        App {
            store,
            config,
            data_path,
            settings_path: None,
            mode: Mode::Navigate,
            focus: Quadrant::UrgentImportant,
            cursors: [0; 4],
            scroll: [0; 4],
            pane_areas: [Rect::default(); 4],
            list_areas: [Rect::default(); 4],
            edit: None,
            grab: None,
            mouse_drag: None,
            today: Local::now().date_naive(),
            status: None,
            should_quit: false,
            theme: Theme::default(),
            last_synced,
        }
    }

    /// Load the board from `data_path`. An unreadable file is kept in the
    /// recovery log and the board starts empty, as on a fresh install.
    pub fn open(data_path: &Path) -> Self {
        let loaded = store_io::load_or_recover(data_path);
        let corrupt = matches!(loaded.source, LoadSource::Corrupt { .. });
        let mut app = App::new(loaded.store, loaded.config, data_path.to_path_buf());
        app.settings_path = Some(settings_path(ORGANIZATION, APPLICATION));
        if corrupt {
            app.last_synced = None;
        }
        app
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn cursor(&self) -> usize {
        self.cursors[self.focus.index()]
    }

    pub fn select(&mut self, quadrant: Quadrant, row: usize) {
        self.focus = quadrant;
        self.cursors[quadrant.index()] = row;
        self.clamp_cursors();
    }

    pub fn clamp_cursors(&mut self) {
        for q in Quadrant::ALL {
            let last = self.store.len(q).saturating_sub(1);
            let cursor = &mut self.cursors[q.index()];
            *cursor = (*cursor).min(last);
        }
    }

    /// Pane and task row at a screen cell. The row is None over empty space.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<(Quadrant, Option<usize>)> {
        let pos = Position::new(column, row);
        Quadrant::ALL
            .into_iter()
            .find(|q| self.pane_areas[q.index()].contains(pos))
            .map(|q| {
                let list = self.list_areas[q.index()];
                let task_row = list
                    .contains(pos)
                    .then(|| self.scroll[q.index()] + usize::from(row - list.y))
                    .filter(|&r| r < self.store.len(q));
                (q, task_row)
            })
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: true,
        });
    }

    pub fn countdown(&self) -> Countdown {
        Countdown::between(self.today, self.config.target_date)
    }

    pub fn refresh_today(&mut self) {
        self.today = Local::now().date_naive();
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Save the board. A failed save is kept in the recovery log; the board
    /// in memory stays authoritative.
    pub fn persist(&mut self) {
        if let Ok(text) = store_io::save_or_log(&self.data_path, &self.store, &self.config) {
            self.last_synced = Some(text);
        }
    }

    /// Pick up a change made to the data file by another process. Our own
    /// saves and unreadable content are ignored.
    pub fn reload_if_changed(&mut self) {
        let Ok(text) = std::fs::read_to_string(&self.data_path) else {
            return;
        };
        if self.last_synced.as_deref() == Some(text.as_str()) {
            return;
        }
        let loaded = store_io::load(&self.data_path);
        if loaded.source != LoadSource::File {
            return;
        }
        self.store = loaded.store;
        self.config = loaded.config;
        self.last_synced = Some(text);
        self.clamp_cursors();
        self.set_info("reloaded: data file changed on disk");
    }

    fn open_settings(&self) -> Option<Settings> {
        let path = self.settings_path.as_deref()?;
        match Settings::open(path) {
            Ok(s) => Some(s),
            Err(e) => {
                eprintln!("warning: {}", e);
                None
            }
        }
    }

    /// Restore the focused quadrant and row from the settings store
    pub fn restore_position(&mut self) {
        if let Some(pos) = self.open_settings().and_then(|s| s.position()) {
            self.select(pos.quadrant, pos.row);
        }
    }

    /// Store the focused quadrant and row. A locked board keeps the pinned one.
    pub fn remember_position(&self) {
        if self.config.is_locked {
            return;
        }
        if let Some(mut settings) = self.open_settings() {
            settings.set_position(BoardPosition {
                quadrant: self.focus,
                row: self.cursor(),
            });
            if let Err(e) = settings.save() {
                eprintln!("warning: {}", e);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Task actions
    // -----------------------------------------------------------------------

    /// Add a task at the end of `quadrant` and select it. Blank text is ignored.
    pub fn add_task(&mut self, quadrant: Quadrant, content: &str) -> bool {
        if task_ops::add_task(&mut self.store, quadrant, content, now_stamp()).is_err() {
            return false;
        }
        let last = self.store.len(quadrant) - 1;
        self.select(quadrant, last);
        self.persist();
        true
    }

    pub fn toggle_at(&mut self, quadrant: Quadrant, row: usize) {
        if task_ops::toggle_task(&mut self.store, quadrant, row, now_stamp()).is_ok() {
            self.persist();
        }
    }

    pub fn toggle_selected(&mut self) {
        self.toggle_at(self.focus, self.cursor());
    }

    pub fn delete_selected(&mut self) {
        let (focus, cursor) = (self.focus, self.cursor());
        if task_ops::delete_task(&mut self.store, focus, cursor).is_ok() {
            self.clamp_cursors();
            self.persist();
        }
    }

    /// Reorder the selected task one step
    pub fn move_selected(&mut self, offset: isize) {
        let (focus, cursor) = (self.focus, self.cursor());
        if let Ok(row) = task_ops::move_within_quadrant(&mut self.store, focus, cursor, offset) {
            self.select(focus, row);
            self.persist();
        }
    }

    /// Pin the board. While locked the remembered position is left as it
    /// was when the lock was set.
    pub fn toggle_lock(&mut self) {
        if !self.config.is_locked {
            self.remember_position();
        }
        self.config.is_locked = !self.config.is_locked;
        self.persist();
        if self.config.is_locked {
            self.set_info("locked: position pinned");
        } else {
            self.set_info("unlocked");
        }
    }

    // -----------------------------------------------------------------------
    // Drag and drop
    // -----------------------------------------------------------------------

    /// Pick up the selected task for a keyboard move
    pub fn begin_grab(&mut self) {
        let row = self.cursor();
        let Some(payload) = DragPayload::capture(&self.store, self.focus, row) else {
            return;
        };
        self.grab = Some(GrabState {
            payload: payload.encode(),
            origin: (self.focus, row),
            target: self.focus,
            row,
        });
        self.mode = Mode::Grab;
    }

    pub fn cancel_grab(&mut self) {
        self.grab = None;
        self.mode = Mode::Navigate;
    }

    /// Drop the grabbed task at the chosen slot. Putting it back on its own
    /// slot leaves the board as it was.
    pub fn finish_grab(&mut self) {
        self.mode = Mode::Navigate;
        if let Some(grab) = self.grab.take() {
            if (grab.target, grab.row) == grab.origin {
                return;
            }
            self.drop_payload(grab.target, Some(grab.row), &grab.payload);
        }
    }

    /// Drop a dragged task onto `dest`. A payload that is malformed or no
    /// longer matches the board is logged and dropped; the board is unchanged.
    pub fn drop_payload(&mut self, dest: Quadrant, row: Option<usize>, payload: &str) {
        match complete_drop(&mut self.store, dest, row, payload) {
            Ok((quadrant, placed)) => {
                self.clamp_cursors();
                self.select(quadrant, placed);
                self.persist();
            }
            Err(e) => log_rejected_drop(&self.data_path, &e.to_string(), payload),
        }
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    pub fn begin_edit(&mut self, target: EditTarget) {
        let buffer = match target {
            EditTarget::NewTask(_) => String::new(),
            EditTarget::Title => self.config.main_title.clone(),
            EditTarget::EventName => self.config.event_name.clone(),
            EditTarget::TargetDate => self.config.target_date.format("%Y-%m-%d").to_string(),
        };
        self.edit = Some(EditState {
            target,
            cursor: buffer.len(),
            buffer,
        });
        self.mode = Mode::Edit;
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
        self.mode = Mode::Navigate;
    }

    /// Apply the edit buffer. An invalid date keeps the editor open.
    pub fn commit_edit(&mut self) {
        let Some(edit) = self.edit.take() else {
            self.mode = Mode::Navigate;
            return;
        };
        self.mode = Mode::Navigate;
        let text = edit.buffer.trim();
        match edit.target {
            EditTarget::NewTask(q) => {
                self.add_task(q, text);
            }
            EditTarget::Title => {
                self.config.main_title = non_empty_or(text, DEFAULT_TITLE);
                self.persist();
            }
            EditTarget::EventName => {
                self.config.event_name = non_empty_or(text, DEFAULT_EVENT_NAME);
                self.persist();
            }
            EditTarget::TargetDate => match self.config.set("target_date", text) {
                Ok(()) => self.persist(),
                Err(e) => {
                    self.set_error(e.to_string());
                    self.edit = Some(edit);
                    self.mode = Mode::Edit;
                }
            },
        }
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    /// Export finished tasks to the last export location, or
    /// `已完成事项.csv` in the working directory.
    pub fn export(&mut self) {
        let mut settings = self.open_settings();
        let path = settings
            .as_ref()
            .and_then(|s| s.get_str(LAST_EXPORT_KEY))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_NAME));
        if self.export_to(&path)
            && let Some(settings) = settings.as_mut()
        {
            settings.set_str(LAST_EXPORT_KEY, &path.to_string_lossy());
            let _ = settings.save();
        }
    }

    pub fn export_to(&mut self, path: &Path) -> bool {
        match export_csv(&self.store, path) {
            Ok(rows) => {
                self.set_info(format!("exported {} finished tasks to {}", rows, path.display()));
                true
            }
            Err(e) => {
                self.set_error(format!("export failed: {}", e));
                false
            }
        }
    }
}

fn non_empty_or(text: &str, default: &str) -> String {
    if text.is_empty() {
        default.to_string()
    } else {
        text.to_string()
    }
}

/// Run the TUI on the board stored at `data_path`
pub fn run(data_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = data_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let _instance = FileLock::single_instance(data_path)?;

    let mut app = App::open(data_path);
    app.restore_position();
    let watcher = StoreWatcher::start(data_path).ok();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.remember_position();
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&StoreWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= COUNTDOWN_REFRESH {
            app.refresh_today();
            last_tick = Instant::now();
        }
        if watcher.is_some_and(|w| w.poll()) {
            app.reload_if_changed();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::recovery::{RecoveryCategory, read_recovery_entries};
    use crate::tui::render::test_helpers::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const DO: Quadrant = Quadrant::UrgentImportant;
    const SCHEDULE: Quadrant = Quadrant::ImportantNotUrgent;

    #[test]
    fn add_selects_and_saves() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(DO, "a")]);
        assert!(app.add_task(DO, "  buy milk  "));
        assert_eq!(app.cursor(), 1);
        assert_eq!(app.store.task(DO, 1).unwrap().content, "buy milk");

        let saved = store_io::load(&app.data_path);
        assert_eq!(saved.store, app.store);
    }

    #[test]
    fn blank_add_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[]);
        assert!(!app.add_task(DO, "   "));
        assert!(app.store.is_empty());
        assert!(!app.data_path.exists());
    }

    #[test]
    fn toggle_and_delete_selected() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(DO, "a"), (DO, "b")]);
        app.select(DO, 1);
        app.toggle_selected();
        assert!(app.store.task(DO, 1).unwrap().is_done());

        app.delete_selected();
        assert_eq!(app.store.len(DO), 1);
        assert_eq!(app.cursor(), 0);
        assert_eq!(store_io::load(&app.data_path).store.len(DO), 1);
    }

    #[test]
    fn reorder_follows_the_task() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(DO, "a"), (DO, "b"), (DO, "c")]);
        app.select(DO, 0);
        app.move_selected(1);
        assert_eq!(contents(&app, DO), vec!["b", "a", "c"]);
        assert_eq!(app.cursor(), 1);

        // top row cannot move up
        app.select(DO, 0);
        app.move_selected(-1);
        assert_eq!(contents(&app, DO), vec!["b", "a", "c"]);
    }

    #[test]
    fn locked_board_still_moves_tasks() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(DO, "a"), (DO, "b")]);
        app.toggle_lock();
        assert!(app.config.is_locked);
        assert!(store_io::load(&app.data_path).config.is_locked);

        app.select(DO, 0);
        app.move_selected(1);
        assert_eq!(contents(&app, DO), vec!["b", "a"]);

        app.begin_grab();
        assert_eq!(app.mode, Mode::Grab);
        if let Some(grab) = app.grab.as_mut() {
            grab.target = SCHEDULE;
            grab.row = 0;
        }
        app.finish_grab();
        assert_eq!(contents(&app, DO), vec!["b"]);
        assert_eq!(contents(&app, SCHEDULE), vec!["a"]);
    }

    #[test]
    fn lock_pins_the_remembered_position() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(SCHEDULE, "a"), (DO, "b"), (DO, "c")]);
        app.settings_path = Some(tmp.path().join("settings.toml"));
        app.select(SCHEDULE, 0);
        app.toggle_lock();

        app.select(DO, 1);
        app.remember_position();

        let mut fresh = app_with_tasks(tmp.path(), &[(SCHEDULE, "a"), (DO, "b"), (DO, "c")]);
        fresh.settings_path = app.settings_path.clone();
        fresh.restore_position();
        assert_eq!((fresh.focus, fresh.cursor()), (SCHEDULE, 0));

        app.toggle_lock();
        app.remember_position();
        fresh.restore_position();
        assert_eq!((fresh.focus, fresh.cursor()), (DO, 1));
    }

    #[test]
    fn grab_put_back_in_place_changes_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(DO, "a"), (DO, "b"), (DO, "c")]);
        app.select(DO, 1);
        app.begin_grab();
        app.finish_grab();

        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(contents(&app, DO), vec!["a", "b", "c"]);
        assert_eq!((app.focus, app.cursor()), (DO, 1));
        assert!(!app.data_path.exists());
    }

    #[test]
    fn keyboard_grab_moves_across_quadrants() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(
            tmp.path(),
            &[(DO, "a0"), (DO, "a1"), (DO, "a2"), (SCHEDULE, "b0"), (SCHEDULE, "b1")],
        );
        app.select(DO, 0);
        app.begin_grab();
        assert_eq!(app.mode, Mode::Grab);
        if let Some(grab) = app.grab.as_mut() {
            grab.target = SCHEDULE;
            grab.row = 1;
        }
        app.finish_grab();

        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(contents(&app, DO), vec!["a1", "a2"]);
        assert_eq!(contents(&app, SCHEDULE), vec!["b0", "a0", "b1"]);
        assert_eq!((app.focus, app.cursor()), (SCHEDULE, 1));
        assert_eq!(store_io::load(&app.data_path).store, app.store);
    }

    #[test]
    fn rejected_drop_is_logged_and_changes_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(DO, "a")]);
        let before = app.store.clone();
        app.drop_payload(SCHEDULE, None, "{not a payload");
        assert_eq!(app.store, before);

        let entries = read_recovery_entries(&app.data_path, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Drop);
    }

    #[test]
    fn edit_title_and_date() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[]);
        app.begin_edit(EditTarget::Title);
        assert_eq!(app.edit.as_ref().unwrap().buffer, "计划");
        app.edit.as_mut().unwrap().buffer = "本周".into();
        app.commit_edit();
        assert_eq!(app.config.main_title, "本周");

        app.begin_edit(EditTarget::TargetDate);
        app.edit.as_mut().unwrap().buffer = "2026-13-40".into();
        app.commit_edit();
        assert_eq!(app.mode, Mode::Edit);
        assert_eq!(app.config.target_date, NaiveDate::from_ymd_opt(2026, 2, 6).unwrap());

        app.edit.as_mut().unwrap().buffer = "2026-03-01".into();
        app.commit_edit();
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.config.target_date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(store_io::load(&app.data_path).config, app.config);
    }

    #[test]
    fn empty_title_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[]);
        app.config.main_title = "x".into();
        app.begin_edit(EditTarget::Title);
        app.edit.as_mut().unwrap().buffer.clear();
        app.commit_edit();
        assert_eq!(app.config.main_title, DEFAULT_TITLE);
    }

    #[test]
    fn external_change_is_reloaded_once() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(DO, "a")]);
        app.persist();

        // our own save is not a change
        app.reload_if_changed();
        assert_eq!(app.status, None);

        let mut other = app.store.clone();
        task_ops::add_task(&mut other, SCHEDULE, "from cli", now_stamp()).unwrap();
        store_io::save(&app.data_path, &other, &app.config).unwrap();
        app.reload_if_changed();
        assert_eq!(app.store, other);
        assert!(app.status.is_some());
    }

    #[test]
    fn unreadable_external_change_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(DO, "a")]);
        std::fs::write(&app.data_path, "{ half written").unwrap();
        app.reload_if_changed();
        assert_eq!(app.store.len(DO), 1);
    }

    #[test]
    fn open_corrupt_file_starts_empty_and_quiet() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks_data.json");
        std::fs::write(&path, "not json at all").unwrap();
        let app = App::open(&path);
        assert!(app.store.is_empty());
        assert_eq!(app.status, None);
        assert_eq!(read_recovery_entries(&path, None).len(), 1);
    }

    #[test]
    fn failed_save_is_logged_not_shown() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(DO, "a")]);
        // a directory where the data file should be makes every save fail
        std::fs::create_dir(&app.data_path).unwrap();
        app.toggle_selected();

        assert!(app.store.task(DO, 0).unwrap().is_done());
        assert_eq!(app.status, None);
        let entries = read_recovery_entries(&app.data_path, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Write);
    }

    #[test]
    fn export_to_writes_csv() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(DO, "a"), (DO, "b")]);
        app.toggle_at(DO, 1);
        let out = tmp.path().join("done.csv");
        assert!(app.export_to(&out));
        let csv = std::fs::read_to_string(&out).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains("b,紧急重要,"));
    }

    #[test]
    fn position_round_trips_through_settings() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_tasks(tmp.path(), &[(SCHEDULE, "a"), (SCHEDULE, "b")]);
        app.settings_path = Some(tmp.path().join("settings.toml"));
        app.select(SCHEDULE, 1);
        app.remember_position();

        let mut fresh = app_with_tasks(tmp.path(), &[(SCHEDULE, "a"), (SCHEDULE, "b")]);
        fresh.settings_path = app.settings_path.clone();
        fresh.restore_position();
        assert_eq!((fresh.focus, fresh.cursor()), (SCHEDULE, 1));
    }
}
