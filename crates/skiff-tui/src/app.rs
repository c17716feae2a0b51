//! Application state and async event loop.

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{Event, KeyEventKind};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use ratatui::widgets::TableState;
use strum::{Display, EnumIter, FromRepr, IntoEnumIterator};
use tracing::debug;

use skiff_core::{Entry, ListingOptions, ScanError};
use skiff_scan::{BackendMode, BackendRegistry, ScanProgress, ScanTask};

use crate::event::KeyAction;
use crate::theme::Theme;
use crate::ui;

/// Result type for the TUI.
pub type AppResult<T> = color_eyre::eyre::Result<T>;

/// Redraw/progress tick interval.
const TICK_INTERVAL_MS: u64 = 100;

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, FromRepr)]
pub enum SortMode {
    /// Name ascending (A-Z).
    #[default]
    #[strum(to_string = "Name ↓")]
    NameAscending,
    /// Name descending (Z-A).
    #[strum(to_string = "Name ↑")]
    NameDescending,
    /// Size descending (largest first).
    #[strum(to_string = "Size ↓")]
    SizeDescending,
    /// Size ascending (smallest first).
    #[strum(to_string = "Size ↑")]
    SizeAscending,
    /// Modified date descending (newest first).
    #[strum(to_string = "Date ↓")]
    ModifiedDescending,
    /// Modified date ascending (oldest first).
    #[strum(to_string = "Date ↑")]
    ModifiedAscending,
}

impl SortMode {
    /// Cycle to the next sort mode.
    pub fn next(self) -> Self {
        let next = (self as usize + 1) % Self::iter().count();
        Self::from_repr(next).unwrap_or_default()
    }

    /// Sort entries in place according to this mode.
    pub fn sort(self, entries: &mut [Entry]) {
        match self {
            SortMode::NameAscending => entries.sort_by(|a, b| a.name.cmp(&b.name)),
            SortMode::NameDescending => entries.sort_by(|a, b| b.name.cmp(&a.name)),
            SortMode::SizeDescending => entries.sort_by(|a, b| b.size.cmp(&a.size)),
            SortMode::SizeAscending => entries.sort_by(|a, b| a.size.cmp(&b.size)),
            SortMode::ModifiedDescending => entries.sort_by(|a, b| b.modified.cmp(&a.modified)),
            SortMode::ModifiedAscending => entries.sort_by(|a, b| a.modified.cmp(&b.modified)),
        }
    }
}

/// The file manager application.
pub struct App {
    pub(crate) registry: BackendRegistry,
    pub(crate) cwd: PathBuf,
    /// Raw scan snapshot of the current directory.
    snapshot: Vec<Entry>,
    /// Snapshot after hidden filtering, sorting and grouping.
    pub(crate) visible: Vec<Entry>,
    pub(crate) selected: usize,
    pub(crate) table_state: TableState,
    pub(crate) options: ListingOptions,
    pub(crate) sort: SortMode,
    task: Option<ScanTask>,
    pub(crate) progress: Option<ScanProgress>,
    pub(crate) error: Option<String>,
    pub(crate) theme: Theme,
    pub(crate) show_help: bool,
    should_quit: bool,
    needs_redraw: bool,
}

impl App {
    /// Create the application rooted at `path`.
    pub fn new(path: PathBuf, registry: BackendRegistry) -> Self {
        Self {
            registry,
            cwd: path,
            snapshot: Vec::new(),
            visible: Vec::new(),
            selected: 0,
            table_state: TableState::default(),
            options: ListingOptions::default(),
            sort: SortMode::default(),
            task: None,
            progress: None,
            error: None,
            theme: Theme::default(),
            show_help: false,
            should_quit: false,
            needs_redraw: true,
        }
    }

    /// Run the application with the async event loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> AppResult<()> {
        self.start_scan();

        let mut interval = tokio::time::interval(Duration::from_millis(TICK_INTERVAL_MS));
        let mut events = crossterm::event::EventStream::new();

        while !self.should_quit {
            if self.needs_redraw {
                terminal.draw(|frame| ui::render(frame, &mut self))?;
                self.needs_redraw = false;
            }

            tokio::select! {
                biased;

                Some(Ok(event)) = events.next() => {
                    if let Event::Key(key_event) = event {
                        if key_event.kind == KeyEventKind::Press {
                            let action = KeyAction::from_key_event(key_event);
                            self.handle_action(action);
                        }
                    }
                    self.needs_redraw = true;
                }

                result = async {
                    match self.task.as_mut() {
                        Some(task) => task.wait().await,
                        None => std::future::pending().await,
                    }
                } => {
                    self.finish_scan(result);
                }

                _ = interval.tick() => {
                    if let Some(task) = &self.task {
                        self.progress = Some(task.progress());
                        self.needs_redraw = true;
                    }
                }
            }
        }

        Ok(())
    }

    /// Start (or restart) a scan of the current directory.
    pub(crate) fn start_scan(&mut self) {
        if let Some(task) = self.task.take() {
            task.close();
        }
        self.error = None;
        match ScanTask::spawn(&self.registry, self.cwd.clone()) {
            Ok(task) => {
                self.progress = Some(task.progress());
                self.task = Some(task);
            }
            Err(err) => {
                self.snapshot.clear();
                self.error = Some(err.to_string());
                self.apply_listing();
            }
        }
        self.needs_redraw = true;
    }

    /// Fold a finished scan into the listing. A failure leaves an empty
    /// listing with the error shown in the status bar.
    pub(crate) fn finish_scan(&mut self, result: Result<Vec<Entry>, ScanError>) {
        if let Some(task) = self.task.take() {
            task.close();
        }
        self.progress = None;
        match result {
            Ok(entries) => {
                debug!(path = %self.cwd.display(), entries = entries.len(), "listing updated");
                self.snapshot = entries;
                self.error = None;
            }
            Err(err) => {
                debug!(path = %self.cwd.display(), error = %err, "listing failed");
                self.snapshot.clear();
                self.error = Some(err.to_string());
            }
        }
        self.apply_listing();
        self.needs_redraw = true;
    }

    /// Recompute the visible listing from the snapshot.
    pub(crate) fn apply_listing(&mut self) {
        let mut entries = self.snapshot.clone();
        if !self.options.show_hidden {
            entries.retain(|e| !e.hidden);
        }
        self.sort.sort(&mut entries);
        if self.options.dirs_first {
            entries.sort_by_key(|e| !e.is_dir());
        }
        self.visible = entries;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.visible.len().saturating_sub(1));
        self.table_state.select(if self.visible.is_empty() {
            None
        } else {
            Some(self.selected)
        });
    }

    /// Dispatch one key action.
    pub(crate) fn handle_action(&mut self, action: KeyAction) {
        if self.show_help && action != KeyAction::None {
            // Any key closes the help overlay.
            self.show_help = false;
            if !matches!(action, KeyAction::Cancel | KeyAction::ToggleHelp) {
                self.dispatch(action);
            }
            return;
        }
        self.dispatch(action);
    }

    fn dispatch(&mut self, action: KeyAction) {
        match action {
            KeyAction::MoveUp => self.move_selection(-1),
            KeyAction::MoveDown => self.move_selection(1),
            KeyAction::JumpToTop => {
                self.selected = 0;
                self.clamp_selection();
            }
            KeyAction::JumpToBottom => {
                self.selected = self.visible.len().saturating_sub(1);
                self.clamp_selection();
            }
            KeyAction::PageUp => self.move_selection(-10),
            KeyAction::PageDown => self.move_selection(10),

            KeyAction::DrillDown => self.drill_down(),
            KeyAction::NavigateBack => self.navigate_back(),

            KeyAction::ToggleHidden => {
                self.options.show_hidden = !self.options.show_hidden;
                self.apply_listing();
            }
            KeyAction::CycleSort => {
                self.sort = self.sort.next();
                self.apply_listing();
            }
            KeyAction::CycleBackend => {
                let next = next_mode(self.registry.mode());
                self.registry.set_mode(next);
                self.start_scan();
            }
            KeyAction::Refresh => self.start_scan(),

            KeyAction::ToggleHelp => self.show_help = !self.show_help,
            KeyAction::ToggleTheme => self.theme = self.theme.toggle(),

            KeyAction::Cancel => {
                if let Some(task) = &self.task {
                    task.cancel();
                }
            }

            KeyAction::Quit | KeyAction::ForceQuit => self.should_quit = true,
            KeyAction::None => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() - 1;
        self.selected = self
            .selected
            .saturating_add_signed(delta)
            .min(last);
        self.clamp_selection();
    }

    fn drill_down(&mut self) {
        let Some(entry) = self.visible.get(self.selected) else {
            return;
        };
        if !entry.is_dir() {
            return;
        }
        self.cwd = self.cwd.join(entry.name.as_str());
        self.selected = 0;
        self.start_scan();
    }

    fn navigate_back(&mut self) {
        if let Some(parent) = self.cwd.parent() {
            self.cwd = parent.to_path_buf();
            self.selected = 0;
            self.start_scan();
        }
    }
}

/// Cycle through backend modes.
fn next_mode(mode: BackendMode) -> BackendMode {
    match mode {
        BackendMode::Auto => BackendMode::Portable,
        BackendMode::Portable => BackendMode::Getdents,
        BackendMode::Getdents => BackendMode::Jwalk,
        BackendMode::Jwalk => BackendMode::Auto,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_core::EntryKind;
    use std::time::UNIX_EPOCH;

    fn app_with_entries(entries: Vec<Entry>) -> App {
        let mut app = App::new(PathBuf::from("/tmp"), BackendRegistry::default());
        app.snapshot = entries;
        app.apply_listing();
        app
    }

    fn sample_entries() -> Vec<Entry> {
        vec![
            Entry::new("zebra.txt", EntryKind::File, 30, UNIX_EPOCH),
            Entry::new(".hidden", EntryKind::File, 5, UNIX_EPOCH),
            Entry::new("apps", EntryKind::Directory, 0, UNIX_EPOCH),
            Entry::new("alpha.txt", EntryKind::File, 10, UNIX_EPOCH),
        ]
    }

    #[test]
    fn test_listing_hides_dotfiles_and_groups_dirs() {
        let app = app_with_entries(sample_entries());
        let names: Vec<&str> = app.visible.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["apps", "alpha.txt", "zebra.txt"]);
    }

    #[test]
    fn test_toggle_hidden_reveals_dotfiles() {
        let mut app = app_with_entries(sample_entries());
        app.handle_action(KeyAction::ToggleHidden);
        assert_eq!(app.visible.len(), 4);
        assert!(app.visible.iter().any(|e| e.hidden));
    }

    #[test]
    fn test_sort_cycle_changes_order() {
        let mut app = app_with_entries(sample_entries());
        // Name ↓ → Name ↑
        app.handle_action(KeyAction::CycleSort);
        let names: Vec<&str> = app.visible.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["apps", "zebra.txt", "alpha.txt"]);
    }

    #[test]
    fn test_selection_clamped_to_listing() {
        let mut app = app_with_entries(sample_entries());
        app.handle_action(KeyAction::JumpToBottom);
        assert_eq!(app.selected, 2);
        app.handle_action(KeyAction::MoveDown);
        assert_eq!(app.selected, 2);
        app.handle_action(KeyAction::JumpToTop);
        assert_eq!(app.selected, 0);
        app.handle_action(KeyAction::MoveUp);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_failed_scan_shows_empty_listing_and_error() {
        let mut app = app_with_entries(sample_entries());
        app.finish_scan(Err(ScanError::NotFound {
            path: PathBuf::from("/gone"),
        }));
        assert!(app.visible.is_empty());
        assert!(app.error.as_deref().unwrap_or("").contains("/gone"));
    }

    #[test]
    fn test_successful_scan_clears_error() {
        let mut app = app_with_entries(Vec::new());
        app.error = Some("old error".into());
        app.finish_scan(Ok(sample_entries()));
        assert!(app.error.is_none());
        assert_eq!(app.visible.len(), 3);
    }

    #[test]
    fn test_backend_cycle_wraps() {
        let mut mode = BackendMode::Auto;
        for _ in 0..4 {
            mode = next_mode(mode);
        }
        assert_eq!(mode, BackendMode::Auto);
    }

    #[test]
    fn test_sort_mode_cycle_wraps() {
        let mut sort = SortMode::default();
        for _ in 0..SortMode::iter().count() {
            sort = sort.next();
        }
        assert_eq!(sort, SortMode::default());
    }
}
