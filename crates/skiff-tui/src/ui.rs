//! Rendering for the file manager.

use chrono::{DateTime, Local};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table};

use skiff_core::{Entry, EntryKind};

use crate::app::App;
use crate::event::help_bindings;

/// Draw the whole application.
pub fn render(frame: &mut Frame, app: &mut App) {
    let [header, main, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, app, header);
    render_listing(frame, app, main);
    render_status(frame, app, footer);

    if app.show_help {
        render_help(frame, app, frame.area());
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" skiff ", app.theme.header),
        Span::styled(app.cwd.display().to_string(), Style::new().fg(app.theme.foreground)),
        Span::styled(
            format!("  [{}]", app.registry.mode()),
            Style::new().fg(app.theme.muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_listing(frame: &mut Frame, app: &mut App, area: Rect) {
    let rows: Vec<Row> = app
        .visible
        .iter()
        .map(|entry| {
            let style = app.theme.for_kind(entry.kind);
            Row::new(vec![
                Span::styled(format!("{} {}", kind_marker(entry.kind), entry.name), style),
                Span::styled(format_entry_size(entry), Style::new().fg(app.theme.muted)),
                Span::styled(format_mtime(entry), Style::new().fg(app.theme.muted)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(24),
            Constraint::Length(10),
            Constraint::Length(16),
        ],
    )
    .header(
        Row::new(vec!["  Name", "Size", "Modified"]).style(app.theme.header),
    )
    .row_highlight_style(app.theme.selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(message) = &app.error {
        Line::from(Span::styled(
            format!(" {message}"),
            Style::new().fg(app.theme.error),
        ))
    } else if let Some(progress) = &app.progress {
        let total = if progress.has_known_total() {
            progress.total.to_string()
        } else {
            "?".to_string()
        };
        Line::from(Span::styled(
            format!(" Scanning… {}/{total}", progress.current),
            Style::new().fg(app.theme.info),
        ))
    } else {
        Line::from(vec![
            Span::styled(
                format!(" {} entries", app.visible.len()),
                Style::new().fg(app.theme.foreground),
            ),
            Span::styled(
                format!(
                    " · {} · hidden: {} · ? for help",
                    app.sort,
                    if app.options.show_hidden { "on" } else { "off" }
                ),
                app.theme.footer,
            ),
        ])
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let bindings = help_bindings();
    let height = (bindings.len() + 2).min(area.height as usize) as u16;
    let popup = centered(area, 44, height);

    let lines: Vec<Line> = bindings
        .iter()
        .map(|b| {
            Line::from(vec![
                Span::styled(format!(" {:<12}", b.keys), app.theme.help_key),
                Span::styled(b.description, app.theme.help_desc),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border)
        .title(Span::styled(" Help ", app.theme.header));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

/// Center a fixed-size popup inside `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn kind_marker(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Directory => "▸",
        EntryKind::Symlink => "@",
        EntryKind::Executable => "*",
        EntryKind::File => " ",
    }
}

fn format_entry_size(entry: &Entry) -> String {
    if entry.is_dir() {
        "-".to_string()
    } else {
        humansize::format_size(entry.size, humansize::BINARY)
    }
}

fn format_mtime(entry: &Entry) -> String {
    let datetime: DateTime<Local> = entry.modified.into();
    datetime.format("%Y-%m-%d %H:%M").to_string()
}
