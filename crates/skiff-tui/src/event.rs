//! Event handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key action that can be performed in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    // Navigation
    MoveUp,
    MoveDown,
    JumpToTop,
    JumpToBottom,
    PageUp,
    PageDown,

    // Directory navigation
    DrillDown,
    NavigateBack,

    // Listing controls
    ToggleHidden,
    CycleSort,
    CycleBackend,
    Refresh,

    // UI toggles
    ToggleHelp,
    ToggleTheme,

    // Cancellation (scan or overlay)
    Cancel,

    // Application
    Quit,
    ForceQuit,

    // No action
    None,
}

impl KeyAction {
    /// Convert a key event to an action.
    pub fn from_key_event(event: KeyEvent) -> Self {
        match (event.code, event.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::ForceQuit,
            (KeyCode::Esc, _) => KeyAction::Cancel,

            // Navigation - vim style
            (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::MoveDown,
            (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::MoveUp,
            (KeyCode::Char('h'), KeyModifiers::NONE) => KeyAction::NavigateBack,
            (KeyCode::Char('l'), KeyModifiers::NONE) => KeyAction::DrillDown,

            // Navigation - arrow keys
            (KeyCode::Down, _) => KeyAction::MoveDown,
            (KeyCode::Up, _) => KeyAction::MoveUp,
            (KeyCode::Left, _) => KeyAction::NavigateBack,
            (KeyCode::Right, _) => KeyAction::DrillDown,

            // Jump
            (KeyCode::Char('g'), KeyModifiers::NONE) => KeyAction::JumpToTop,
            (KeyCode::Char('G'), KeyModifiers::SHIFT) => KeyAction::JumpToBottom,
            (KeyCode::Home, _) => KeyAction::JumpToTop,
            (KeyCode::End, _) => KeyAction::JumpToBottom,

            // Page navigation
            (KeyCode::PageUp, _) => KeyAction::PageUp,
            (KeyCode::PageDown, _) => KeyAction::PageDown,
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => KeyAction::PageUp,
            (KeyCode::Char('d'), KeyModifiers::CONTROL) => KeyAction::PageDown,

            // Directory navigation
            (KeyCode::Enter, _) => KeyAction::DrillDown,
            (KeyCode::Backspace, _) => KeyAction::NavigateBack,
            (KeyCode::Char('-'), KeyModifiers::NONE) => KeyAction::NavigateBack,

            // Listing controls
            (KeyCode::Char('.'), KeyModifiers::NONE) => KeyAction::ToggleHidden,
            (KeyCode::Char('s'), KeyModifiers::NONE) => KeyAction::CycleSort,
            (KeyCode::Char('b'), KeyModifiers::NONE) => KeyAction::CycleBackend,
            (KeyCode::Char('R'), KeyModifiers::SHIFT) => KeyAction::Refresh,
            (KeyCode::Char('r'), KeyModifiers::NONE) => KeyAction::Refresh,

            // UI toggles
            (KeyCode::Char('?'), KeyModifiers::NONE) => KeyAction::ToggleHelp,
            (KeyCode::Char('t'), KeyModifiers::NONE) => KeyAction::ToggleTheme,

            _ => KeyAction::None,
        }
    }
}

/// Key binding for display in help.
pub struct KeyBinding {
    pub keys: &'static str,
    pub description: &'static str,
}

/// Key bindings shown in the help overlay.
pub fn help_bindings() -> Vec<KeyBinding> {
    vec![
        KeyBinding { keys: "j/k ↑/↓", description: "Move up/down" },
        KeyBinding { keys: "Enter/l", description: "Enter directory" },
        KeyBinding { keys: "Backspace/h", description: "Parent directory" },
        KeyBinding { keys: "g/G", description: "Jump to top/bottom" },
        KeyBinding { keys: "Ctrl-u/d", description: "Page up/down" },
        KeyBinding { keys: ".", description: "Toggle hidden files" },
        KeyBinding { keys: "s", description: "Cycle sort order" },
        KeyBinding { keys: "b", description: "Cycle scan backend" },
        KeyBinding { keys: "r", description: "Rescan directory" },
        KeyBinding { keys: "t", description: "Toggle dark/light theme" },
        KeyBinding { keys: "Esc", description: "Cancel scan / close help" },
        KeyBinding { keys: "?", description: "Show this help" },
        KeyBinding { keys: "q", description: "Quit" },
    ]
}
