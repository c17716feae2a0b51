//! Color theme for the TUI.

use ratatui::style::{Color, Modifier, Style};

use skiff_core::EntryKind;

/// Theme variant (dark or light).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

/// Color theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Current theme variant.
    pub variant: ThemeVariant,

    pub foreground: Color,
    pub muted: Color,

    pub selected: Style,
    pub error: Color,
    pub info: Color,

    pub directory: Style,
    pub file: Style,
    pub symlink: Style,
    pub executable: Style,

    pub header: Style,
    pub footer: Style,
    pub help_key: Style,
    pub help_desc: Style,
    pub border: Style,
}

impl Theme {
    /// Dark theme using a slate-based palette.
    pub fn dark() -> Self {
        let slate_50 = Color::Rgb(248, 250, 252);
        let slate_100 = Color::Rgb(241, 245, 249);
        let slate_400 = Color::Rgb(148, 163, 184);
        let slate_500 = Color::Rgb(100, 116, 139);
        let slate_600 = Color::Rgb(71, 85, 105);
        let slate_700 = Color::Rgb(51, 65, 85);

        let blue_400 = Color::Rgb(96, 165, 250);
        let green_500 = Color::Rgb(34, 197, 94);
        let cyan_400 = Color::Rgb(34, 211, 238);
        let red_500 = Color::Rgb(239, 68, 68);

        Self {
            variant: ThemeVariant::Dark,
            foreground: slate_100,
            muted: slate_500,

            selected: Style::new()
                .bg(slate_700)
                .fg(slate_50)
                .add_modifier(Modifier::BOLD),
            error: red_500,
            info: blue_400,

            directory: Style::new().fg(blue_400).add_modifier(Modifier::BOLD),
            file: Style::new().fg(slate_100),
            symlink: Style::new().fg(cyan_400),
            executable: Style::new().fg(green_500),

            header: Style::new().fg(slate_400).add_modifier(Modifier::BOLD),
            footer: Style::new().fg(slate_400),
            help_key: Style::new().fg(blue_400).add_modifier(Modifier::BOLD),
            help_desc: Style::new().fg(slate_100),
            border: Style::new().fg(slate_600),
        }
    }

    /// Light theme for bright terminals.
    pub fn light() -> Self {
        let slate_900 = Color::Rgb(15, 23, 42);
        let slate_700 = Color::Rgb(51, 65, 85);
        let slate_500 = Color::Rgb(100, 116, 139);
        let slate_200 = Color::Rgb(226, 232, 240);

        let blue_600 = Color::Rgb(37, 99, 235);
        let green_600 = Color::Rgb(22, 163, 74);
        let cyan_600 = Color::Rgb(8, 145, 178);
        let red_600 = Color::Rgb(220, 38, 38);

        Self {
            variant: ThemeVariant::Light,
            foreground: slate_900,
            muted: slate_500,

            selected: Style::new()
                .bg(slate_200)
                .fg(slate_900)
                .add_modifier(Modifier::BOLD),
            error: red_600,
            info: blue_600,

            directory: Style::new().fg(blue_600).add_modifier(Modifier::BOLD),
            file: Style::new().fg(slate_900),
            symlink: Style::new().fg(cyan_600),
            executable: Style::new().fg(green_600),

            header: Style::new().fg(slate_700).add_modifier(Modifier::BOLD),
            footer: Style::new().fg(slate_700),
            help_key: Style::new().fg(blue_600).add_modifier(Modifier::BOLD),
            help_desc: Style::new().fg(slate_900),
            border: Style::new().fg(slate_500),
        }
    }

    /// Switch between dark and light.
    pub fn toggle(&self) -> Self {
        match self.variant {
            ThemeVariant::Dark => Self::light(),
            ThemeVariant::Light => Self::dark(),
        }
    }

    /// Style for an entry of the given kind.
    pub fn for_kind(&self, kind: EntryKind) -> Style {
        match kind {
            EntryKind::Directory => self.directory,
            EntryKind::File => self.file,
            EntryKind::Symlink => self.symlink,
            EntryKind::Executable => self.executable,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
