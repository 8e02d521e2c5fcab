//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The channel is either the TCP
//! line transport or an in-process simulated server.
//!
//! Holding a direction needs key release events. Terminals that support the
//! keyboard enhancement protocol report them directly. Elsewhere a held key
//! only produces auto-repeat presses, so the driver synthesizes the release
//! once repeats stop arriving.

use std::{
    io::{self, Stdout, stdout},
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand,
    event::{
        Event, EventStream, KeyCode, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use futures::StreamExt;
use pedestal_app::{App, AppAction, AppEvent, Driver, Inbound, KeyInput};
use pedestal_core::{
    TransportError,
    transport::{self, ConnectedChannel},
};
use pedestal_harness::SimServer;
use pedestal_proto::{ClientMessage, ServerMessage};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::{
    server::{self, ServerHandle},
    ui,
};

/// Longest gap between auto-repeat presses before a held key counts as
/// released. Covers the usual initial repeat delay.
const REPEAT_GAP: Duration = Duration::from_millis(600);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Where the channel goes.
#[derive(Debug, Clone)]
pub enum ConnectionMode {
    /// In-process simulated server.
    Simulated,
    /// Device server at this address.
    Remote(String),
}

/// Open channel (either in-process or TCP).
enum Connection {
    InProcess(ServerHandle),
    Remote(ConnectedChannel),
}

impl Connection {
    fn to_server(&self) -> &mpsc::Sender<ClientMessage> {
        match self {
            Connection::InProcess(h) => &h.to_server,
            Connection::Remote(h) => &h.to_server,
        }
    }

    fn from_server(&mut self) -> &mut mpsc::Receiver<ServerMessage> {
        match self {
            Connection::InProcess(h) => &mut h.from_server,
            Connection::Remote(h) => &mut h.from_server,
        }
    }

    fn stop(&self) {
        match self {
            Connection::InProcess(h) => h.stop(),
            Connection::Remote(h) => h.stop(),
        }
    }
}

/// Terminal driver implementing the [`Driver`] trait.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    mode: ConnectionMode,
    connection: Option<Connection>,
    /// Terminal reports key releases.
    release_events: bool,
    /// Direction key seen last and when, for synthesized releases.
    held: Option<(KeyInput, Instant)>,
}

impl TerminalDriver {
    /// Take over the terminal.
    pub fn new(mode: ConnectionMode) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let release_events = supports_keyboard_enhancement().unwrap_or(false);
        if release_events {
            stdout().execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
        }
        tracing::info!(release_events, "terminal ready");

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            event_stream: EventStream::new(),
            mode,
            connection: None,
            release_events,
            held: None,
        })
    }

    /// Convert crossterm `KeyCode` to `KeyInput`.
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c.to_ascii_lowercase())),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            _ => None,
        }
    }

    fn is_direction(key: KeyInput) -> bool {
        matches!(key, KeyInput::Char('u' | 'd'))
    }

    fn handle_terminal_event(&mut self, event: Event, app: &mut App) -> Vec<AppAction> {
        match event {
            Event::Key(key_event) => {
                let Some(key) = Self::convert_key(key_event.code) else {
                    return vec![];
                };
                match key_event.kind {
                    KeyEventKind::Release => app.handle(AppEvent::KeyReleased(key)),
                    KeyEventKind::Press | KeyEventKind::Repeat => self.track_hold(key, app),
                }
            },
            Event::Resize(cols, rows) => app.handle(AppEvent::Resize(cols, rows)),
            _ => vec![],
        }
    }

    /// Forward a press, remembering direction keys when releases must be
    /// synthesized.
    fn track_hold(&mut self, key: KeyInput, app: &mut App) -> Vec<AppAction> {
        let mut actions = Vec::new();
        if !self.release_events {
            match self.held {
                Some((held, _)) if held != key => {
                    actions.extend(app.handle(AppEvent::KeyReleased(held)));
                    self.held = None;
                },
                _ => {},
            }
            if Self::is_direction(key) {
                self.held = Some((key, Instant::now()));
            }
        }
        actions.extend(app.handle(AppEvent::Key(key)));
        actions
    }

    fn expire_hold(&mut self, app: &mut App) -> Vec<AppAction> {
        match self.held {
            Some((key, seen)) if seen.elapsed() >= REPEAT_GAP => {
                self.held = None;
                app.handle(AppEvent::KeyReleased(key))
            },
            _ => vec![],
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        let next = tokio::select! {
            biased;
            maybe_event = self.event_stream.next() => maybe_event,
            () = std::future::ready(()) => None,
        };

        match next {
            Some(Ok(event)) => Ok(self.handle_terminal_event(event, app)),
            Some(Err(e)) => Err(TerminalError::Io(e)),
            None => Ok(self.expire_hold(app)),
        }
    }

    async fn send_message(&mut self, message: ClientMessage) -> Result<(), Self::Error> {
        if let Some(conn) = &self.connection {
            if conn.to_server().send(message).await.is_err() {
                // Loss surfaces through recv_message.
                tracing::debug!("channel closed, message dropped");
            }
        }
        Ok(())
    }

    async fn recv_message(&mut self) -> Option<Inbound> {
        let conn = self.connection.as_mut()?;
        match conn.from_server().try_recv() {
            Ok(message) => Some(Inbound::Message(message)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                conn.stop();
                self.connection = None;
                Some(Inbound::ChannelLost)
            },
        }
    }

    async fn connect(&mut self) -> Result<(), Self::Error> {
        if let Some(old) = self.connection.take() {
            old.stop();
        }

        let connection = match &self.mode {
            ConnectionMode::Simulated => Connection::InProcess(server::spawn_server(
                SimServer::new(server::simulated_devices()),
            )),
            ConnectionMode::Remote(addr) => Connection::Remote(transport::connect(addr).await?),
        };
        self.connection = Some(connection);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| {
            ui::render(frame, app);
        })?;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.stop();
        }
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        if self.release_events {
            let _ = stdout().execute(PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
