//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the
//! interactive state of the controller completely decoupled from I/O and
//! session mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Holds the device registry (last fetched list) and the highlighted row.
//! - Maps keys to operator intents (connect, hold up/down, reset).
//! - Mirrors session status, control enablement and the status line for
//!   rendering.
//!
//! # Keys
//!
//! | Key | Intent |
//! |---|---|
//! | `↑`/`↓`, `k`/`j` | move highlight |
//! | `Enter` | connect to highlighted device |
//! | `u` / `d` | hold up / down (released on key release or `Space`) |
//! | `r` | reset |
//! | `l` | refresh device list |
//! | `c` | reopen the channel after it dropped |
//! | `q` / `Esc` | quit |

use pedestal_core::{SessionStatus, StatusKind};
use pedestal_proto::{Device, Direction};

use crate::{AppAction, AppEvent, KeyInput, StatusLine};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Mirrored session status.
    status: SessionStatus,
    /// Mirrored stream direction. `None` if no stream is active.
    streaming: Option<Direction>,
    /// Device server address for display.
    server_addr: String,
    /// Transport channel is up.
    channel_open: bool,
    /// Last fetched device list.
    devices: Vec<Device>,
    /// Highlighted row in `devices`.
    cursor: usize,
    /// Directional and reset controls enabled.
    controls_enabled: bool,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Last status message. `None` until something is reported.
    status_line: Option<StatusLine>,
}

impl App {
    /// Create a new App for the given server address.
    pub fn new(server_addr: String) -> Self {
        Self {
            status: SessionStatus::Disconnected,
            streaming: None,
            server_addr,
            channel_open: false,
            devices: Vec::new(),
            cursor: 0,
            controls_enabled: false,
            terminal_size: (80, 24),
            status_line: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::KeyReleased(key) => match direction_for(key) {
                Some(direction) if self.streaming == Some(direction) => {
                    vec![AppAction::StopDirectional, AppAction::Render]
                },
                _ => vec![],
            },
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::ChannelOpened => {
                self.channel_open = true;
                vec![AppAction::RefreshDevices, AppAction::Render]
            },
            AppEvent::ChannelLost => {
                self.channel_open = false;
                vec![AppAction::Render]
            },
            AppEvent::DevicesListed(devices) => {
                self.devices = devices;
                self.cursor = self.cursor.min(self.devices.len().saturating_sub(1));
                vec![AppAction::Render]
            },
            AppEvent::ControlsChanged(enabled) => {
                self.controls_enabled = enabled;
                vec![AppAction::Render]
            },
            AppEvent::Status { kind, text } => {
                self.status_line = Some(StatusLine { kind, text });
                vec![AppAction::Render]
            },
            AppEvent::SessionUpdated { status, streaming } => {
                self.status = status;
                self.streaming = streaming;
                vec![AppAction::Render]
            },
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if let Some(direction) = direction_for(key) {
            // Auto-repeat of a held key must not restart the stream.
            if self.streaming == Some(direction) {
                return vec![];
            }
            return vec![AppAction::StartDirectional { direction }, AppAction::Render];
        }

        match key {
            KeyInput::Esc | KeyInput::Char('q') => vec![AppAction::Quit],
            KeyInput::Up | KeyInput::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                vec![AppAction::Render]
            },
            KeyInput::Down | KeyInput::Char('j') => {
                if self.cursor + 1 < self.devices.len() {
                    self.cursor += 1;
                }
                vec![AppAction::Render]
            },
            KeyInput::Enter => match self.highlighted() {
                Some(device) => vec![
                    AppAction::SelectDevice { device: device.device.clone() },
                    AppAction::Render,
                ],
                None => vec![],
            },
            KeyInput::Char(' ') if self.streaming.is_some() => {
                vec![AppAction::StopDirectional, AppAction::Render]
            },
            KeyInput::Char('r') => vec![AppAction::Reset, AppAction::Render],
            KeyInput::Char('l') => vec![AppAction::RefreshDevices],
            KeyInput::Char('c') if !self.channel_open => {
                vec![AppAction::Connect, AppAction::Render]
            },
            KeyInput::Char(_) => vec![],
        }
    }

    /// Record a status message produced outside the session.
    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status_line = Some(StatusLine { kind, text: text.into() });
    }

    /// Mirrored session status.
    pub fn session_status(&self) -> SessionStatus {
        self.status
    }

    /// Mirrored stream direction.
    pub fn streaming(&self) -> Option<Direction> {
        self.streaming
    }

    /// Device server address.
    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    /// Transport channel is up.
    pub fn channel_open(&self) -> bool {
        self.channel_open
    }

    /// Last fetched device list.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Highlighted row index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Highlighted device. `None` if the list is empty.
    pub fn highlighted(&self) -> Option<&Device> {
        self.devices.get(self.cursor)
    }

    /// Whether the directional and reset controls are enabled.
    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Last status message. `None` if nothing has been reported.
    pub fn status_line(&self) -> Option<&StatusLine> {
        self.status_line.as_ref()
    }
}

fn direction_for(key: KeyInput) -> Option<Direction> {
    match key {
        KeyInput::Char('u') => Some(Direction::Up),
        KeyInput::Char('d') => Some(Direction::Down),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed_app() -> App {
        let mut app = App::new("localhost:5000".into());
        let _ = app.handle(AppEvent::DevicesListed(vec![
            Device::new("Arduino", "/dev/ttyUSB0"),
            Device::new("CP2102", "/dev/ttyUSB1"),
        ]));
        app
    }

    #[test]
    fn channel_open_fetches_devices() {
        let mut app = App::new("localhost:5000".into());
        let actions = app.handle(AppEvent::ChannelOpened);

        assert_eq!(actions, vec![AppAction::RefreshDevices, AppAction::Render]);
        assert!(app.channel_open());
    }

    #[test]
    fn enter_selects_highlighted_device() {
        let mut app = listed_app();
        let _ = app.handle(AppEvent::Key(KeyInput::Down));

        let actions = app.handle(AppEvent::Key(KeyInput::Enter));

        assert!(matches!(actions.as_slice(), [
            AppAction::SelectDevice { device },
            AppAction::Render
        ] if device.as_str() == "/dev/ttyUSB1"));
    }

    #[test]
    fn enter_with_empty_list_does_nothing() {
        let mut app = App::new("localhost:5000".into());
        assert!(app.handle(AppEvent::Key(KeyInput::Enter)).is_empty());
    }

    #[test]
    fn cursor_stays_within_list() {
        let mut app = listed_app();
        for _ in 0..5 {
            let _ = app.handle(AppEvent::Key(KeyInput::Down));
        }
        assert_eq!(app.cursor(), 1);

        let _ = app.handle(AppEvent::DevicesListed(vec![Device::new("Arduino", "/dev/ttyUSB0")]));
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn held_key_repeat_does_not_restart_stream() {
        let mut app = listed_app();
        let actions = app.handle(AppEvent::Key(KeyInput::Char('u')));
        assert_eq!(actions[0], AppAction::StartDirectional { direction: Direction::Up });

        let _ = app.handle(AppEvent::SessionUpdated {
            status: SessionStatus::Connected,
            streaming: Some(Direction::Up),
        });

        assert!(app.handle(AppEvent::Key(KeyInput::Char('u'))).is_empty());
    }

    #[test]
    fn release_stops_matching_stream_only() {
        let mut app = listed_app();
        let _ = app.handle(AppEvent::SessionUpdated {
            status: SessionStatus::Connected,
            streaming: Some(Direction::Down),
        });

        assert!(app.handle(AppEvent::KeyReleased(KeyInput::Char('u'))).is_empty());
        assert_eq!(app.handle(AppEvent::KeyReleased(KeyInput::Char('d'))), vec![
            AppAction::StopDirectional,
            AppAction::Render
        ]);
    }

    #[test]
    fn reconnect_only_offered_when_channel_down() {
        let mut app = App::new("localhost:5000".into());
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Char('c'))), vec![
            AppAction::Connect,
            AppAction::Render
        ]);

        let _ = app.handle(AppEvent::ChannelOpened);
        assert!(app.handle(AppEvent::Key(KeyInput::Char('c'))).is_empty());
    }

    #[test]
    fn status_event_replaces_status_line() {
        let mut app = App::new("localhost:5000".into());
        let _ =
            app.handle(AppEvent::Status { kind: StatusKind::Error, text: "Error: busy".into() });

        assert_eq!(
            app.status_line(),
            Some(&StatusLine { kind: StatusKind::Error, text: "Error: busy".into() })
        );
    }
}
