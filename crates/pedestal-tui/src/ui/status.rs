//! Status bar
//!
//! Displays session status and the last status message.

use pedestal_core::{SessionStatus, StatusKind};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::App;

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let session = match app.session_status() {
        SessionStatus::Disconnected => {
            Span::styled("Disconnected", Style::default().fg(Color::Red))
        },
        SessionStatus::Connecting => {
            Span::styled("Connecting...", Style::default().fg(Color::Yellow))
        },
        SessionStatus::Connected => Span::styled(
            "Connected",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        SessionStatus::Failed => Span::styled("Failed", Style::default().fg(Color::Red)),
    };

    let channel = if app.channel_open() { "" } else { " | channel down" };

    let message = app.status_line().map_or_else(
        || Span::raw(""),
        |line| {
            let color = match line.kind {
                StatusKind::Info => Color::White,
                StatusKind::Success => Color::Green,
                StatusKind::Warning => Color::Yellow,
                StatusKind::Error => Color::Red,
            };
            Span::styled(format!(" | {}", line.text), Style::default().fg(color))
        },
    );

    let status_line = Line::from(vec![
        Span::raw(" "),
        session,
        Span::styled(channel, Style::default().fg(Color::Red)),
        message,
    ]);

    let paragraph = Paragraph::new(status_line).style(Style::default().bg(Color::Black));

    frame.render_widget(paragraph, area);
}
