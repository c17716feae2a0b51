//! Terminal user interface for skiff.
//!
//! A compact file-manager front end over the `skiff-scan` engine: one
//! listing pane with live scan progress, a status line that surfaces
//! scan errors, and vim-style navigation.
//!
//! # Usage
//!
//! ```rust,no_run
//! use skiff_scan::BackendRegistry;
//! use std::path::PathBuf;
//!
//! skiff_tui::run(PathBuf::from("/path/to/browse"), BackendRegistry::default()).unwrap();
//! ```
//!
//! # Keyboard Navigation
//!
//! - `j`/`k` - Move down/up
//! - `Enter`/`Backspace` - Enter/leave directory
//! - `.` - Toggle hidden files
//! - `s` - Cycle sort order
//! - `b` - Cycle scan backend
//! - `Esc` - Cancel a running scan
//! - `?` - Help
//! - `q` - Quit

pub mod app;
mod event;
mod theme;
mod ui;

pub use app::{App, AppResult, SortMode};
pub use theme::Theme;

use skiff_scan::BackendRegistry;

/// Run the TUI application.
pub fn run(path: std::path::PathBuf, registry: BackendRegistry) -> AppResult<()> {
    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    let terminal = ratatui::init();
    let result = rt.block_on(App::new(path, registry).run(terminal));
    ratatui::restore();

    // Shutdown runtime immediately to cancel background tasks
    rt.shutdown_timeout(std::time::Duration::from_millis(100));

    result
}
