//! Terminal UI rendering with ratatui

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use snapdock_core::state::{InputMode, PairingPhase, StatusLevel, View};
use snapdock_core::{ConnectionState, UploadStatus};

use crate::app::App;

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(1),    // Pairing panel or gallery
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Input line (folder path)
        ])
        .split(f.area());

    draw_title_bar(f, app, chunks[0]);
    match app.state.view() {
        View::Pairing => draw_pairing_panel(f, app, chunks[1]),
        View::Gallery => draw_photo_list(f, app, chunks[1]),
    }
    draw_status_bar(f, app, chunks[2]);
    draw_input_line(f, app, chunks[3]);
}

/// Draw the title bar with the connection indicator
fn draw_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let (indicator, color) = match app.state.connection {
        ConnectionState::Connected => (" [Connected]", Color::Green),
        ConnectionState::Connecting => (" [Connecting]", Color::Yellow),
        ConnectionState::Disconnected => (" [Offline]", Color::Yellow),
    };

    let title_bar = Paragraph::new(Line::from(vec![
        Span::styled(
            " snapdock ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(indicator, Style::default().fg(color)),
    ]))
    .style(Style::default().bg(Color::DarkGray));

    f.render_widget(title_bar, area);
}

/// Draw the pairing panel (shown until a session token arrives)
fn draw_pairing_panel(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = match &app.state.pairing {
        PairingPhase::Idle | PairingPhase::Requesting => {
            vec![Line::from("Generating pairing code...")]
        }
        PairingPhase::Displaying { link } => vec![
            Line::from("Scan this link on your phone to pair:"),
            Line::from(""),
            Line::from(Span::styled(
                link.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "The code expires shortly; press p for a fresh one.",
                Style::default().fg(Color::DarkGray),
            )),
        ],
        PairingPhase::Failed => vec![
            Line::from(Span::styled(
                "Could not reach the server.",
                Style::default().fg(Color::Red),
            )),
            Line::from("Press p to request a new code."),
        ],
        PairingPhase::Paired => vec![],
    };

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Pairing "),
    );

    f.render_widget(panel, area);
}

/// Draw the photo gallery list
fn draw_photo_list(f: &mut Frame, app: &App, area: Rect) {
    let visible_height = area.height as usize;
    let start = app.state.cursor.saturating_sub(visible_height.saturating_sub(1));

    let items: Vec<ListItem> = app
        .state
        .photos
        .iter()
        .enumerate()
        .skip(start)
        .take(visible_height)
        .map(|(i, photo)| {
            let is_selected = app.state.is_selected(i);
            let is_cursor = i == app.state.cursor;

            // Upload status glyph
            let status = if app.config.client.show_upload_status {
                match photo.status {
                    UploadStatus::Success => "✓ ",
                    UploadStatus::Uploading => "↑ ",
                    UploadStatus::Error => "✗ ",
                }
            } else {
                "  "
            };

            // Selection marker
            let marker = if is_selected { "* " } else { "  " };

            let line = format!(
                "{}{}{:<40} {:>10}",
                marker,
                status,
                photo.name,
                format_size(photo.size)
            );

            let style = if is_cursor {
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else if is_selected {
                Style::default().bg(Color::DarkGray).fg(Color::Yellow)
            } else {
                match photo.status {
                    UploadStatus::Error => Style::default().fg(Color::Red),
                    _ => Style::default(),
                }
            };

            ListItem::new(Line::from(Span::styled(line, style)))
        })
        .collect();

    if items.is_empty() {
        let empty = Paragraph::new("No photos to show. Press r to refresh.")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, area);
        return;
    }

    let list = List::new(items).block(Block::default().borders(Borders::NONE));
    f.render_widget(list, area);
}

/// Draw the status bar
fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if let Some((ref msg, ref level)) = app.state.status_message {
        let color = match level {
            StatusLevel::Info => Color::Blue,
            StatusLevel::Success => Color::Green,
            StatusLevel::Warning => Color::Yellow,
            StatusLevel::Error => Color::Red,
        };
        (msg.clone(), Style::default().fg(color))
    } else {
        // Default hints based on mode
        let hints = match app.state.input_mode {
            InputMode::Normal => {
                "j↓ k↑ │ Space:select a:all x:clear │ y:copy f:folder r:refresh │ ?:help q:quit"
            }
            InputMode::Folder => "Type the upload folder path │ Enter:send │ Esc:cancel",
        };
        (hints.to_string(), Style::default().fg(Color::DarkGray))
    };

    let selected = app.state.selected.len();
    let text = if selected > 0 {
        format!("{}  ({} selected)", text, selected)
    } else {
        text
    };

    let status_bar = Paragraph::new(text).style(style);
    f.render_widget(status_bar, area);
}

/// Draw the input line (folder mode)
fn draw_input_line(f: &mut Frame, app: &App, area: Rect) {
    if app.state.input_mode != InputMode::Folder {
        return;
    }

    let prefix = "Folder: ";
    let content = &app.state.folder_input;

    let input_line = Paragraph::new(format!("{}{}", prefix, content))
        .style(Style::default().fg(Color::White));
    f.render_widget(input_line, area);

    let x = area.x + prefix.len() as u16 + content.len() as u16;
    f.set_cursor_position((x, area.y));
}

/// Format file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(2_500_000), "2.4 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
