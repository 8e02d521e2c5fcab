//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod controls;
mod devices;
mod status;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::App;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 4;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(MAIN_AREA_MIN_HEIGHT), Constraint::Length(STATUS_HEIGHT)])
        .split(frame.area());

    let [main_area, status_area] = chunks.as_ref() else {
        return;
    };

    render_main_area(frame, app, *main_area);
    status::render(frame, app, *status_area);
}

/// Render the main area (device list + controls).
fn render_main_area(frame: &mut Frame, app: &App, area: Rect) {
    const CONTROLS_WIDTH: u16 = 30;
    const DEVICE_LIST_MIN_WIDTH: u16 = 20;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(DEVICE_LIST_MIN_WIDTH), Constraint::Length(CONTROLS_WIDTH)])
        .split(area);

    let [devices_area, controls_area] = chunks.as_ref() else {
        return;
    };

    devices::render(frame, app, *devices_area);
    controls::render(frame, app, *controls_area);
}
