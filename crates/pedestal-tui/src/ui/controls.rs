//! Controls panel
//!
//! Shows whether the directional controls are live, what is streaming, and
//! the key bindings.

use pedestal_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const KEY_HELP: [(&str, &str); 7] = [
    ("Enter", "connect"),
    ("u / d", "hold up / down"),
    ("Space", "stop"),
    ("r", "reset"),
    ("l", "refresh list"),
    ("c", "reopen channel"),
    ("q", "quit"),
];

/// Render the controls panel.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let motion = match (app.controls_enabled(), app.streaming()) {
        (true, Some(direction)) => Span::styled(
            format!("moving {direction}"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        (true, None) => Span::styled("ready", Style::default().fg(Color::Green)),
        (false, _) => Span::styled("controls disabled", Style::default().fg(Color::DarkGray)),
    };

    let key_style = if app.controls_enabled() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut lines = vec![Line::from(motion), Line::raw("")];
    lines.extend(KEY_HELP.iter().map(|(key, action)| {
        Line::from(vec![Span::styled(format!("{key:>6} "), key_style), Span::raw(*action)])
    }));

    let block = Block::default().borders(Borders::ALL).title(" Controls ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
