//! Device list
//!
//! Displays the last fetched device list with the highlighted row.

use pedestal_app::{App, NO_DEVICES};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

const HIGHLIGHT_SYMBOL: &str = "> ";

/// Render the device list.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Devices @ {} ", app.server_addr()));

    if app.devices().is_empty() {
        let hint = Line::styled(NO_DEVICES, Style::default().fg(Color::DarkGray));
        let placeholder = Paragraph::new(hint).block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> =
        app.devices().iter().map(|device| ListItem::new(device.label())).collect();
    let list = List::new(items)
        .block(block)
        .highlight_symbol(HIGHLIGHT_SYMBOL)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let mut state = ListState::default().with_selected(Some(app.cursor()));
    frame.render_stateful_widget(list, area, &mut state);
}
