//! Session-to-Application translation layer.
//!
//! The [`Bridge`] wraps the [`pedestal_core::Session`] and adapts it to the
//! application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts [`crate::AppAction`] into session operations.
//! - Accumulates outgoing [`ClientMessage`]s to be sent by the driver in the
//!   next I/O cycle.
//! - Converts session UI notifications back into [`crate::AppEvent`]s.
//! - Forwards time generically to support both real-time execution and
//!   deterministic simulation.

use pedestal_core::{ConfigError, Session, SessionAction, SessionConfig, Timestamp};
use pedestal_proto::{ClientMessage, ServerMessage};

use crate::{AppAction, AppEvent};

/// Bridge between App and Session logic.
///
/// Generic over the instant type to support both production and simulation.
pub struct Bridge<I> {
    session: Session<I>,
    outgoing: Vec<ClientMessage>,
}

impl<I: Timestamp> Bridge<I> {
    /// Create a new Bridge with a fresh session.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        Ok(Self { session: Session::new(config)?, outgoing: Vec::new() })
    }

    /// Underlying session, for inspection.
    pub fn session(&self) -> &Session<I> {
        &self.session
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction, now: I) -> Vec<AppEvent> {
        let actions = match action {
            AppAction::RefreshDevices => self.session.request_device_list(),
            AppAction::SelectDevice { device } => self.session.select_device(device),
            AppAction::StartDirectional { direction } => {
                self.session.send_directional(direction, now)
            },
            AppAction::StopDirectional => {
                self.session.stop_directional();
                Vec::new()
            },
            AppAction::Reset => self.session.send_reset(),
            AppAction::Render | AppAction::Quit | AppAction::Connect => return vec![],
        };
        self.handle_session_actions(actions, true)
    }

    /// Handle a message from the server.
    pub fn handle_message(&mut self, message: ServerMessage) -> Vec<AppEvent> {
        let actions = self.session.handle_message(message);
        self.handle_session_actions(actions, true)
    }

    /// Handle loss of the transport channel.
    pub fn handle_channel_lost(&mut self) -> Vec<AppEvent> {
        let actions = self.session.on_channel_lost();
        self.handle_session_actions(actions, true)
    }

    /// Process a time tick, emitting streamed commands that have come due.
    pub fn handle_tick(&mut self, now: I) -> Vec<AppEvent> {
        let actions = self.session.poll(now);
        self.handle_session_actions(actions, false)
    }

    /// Instant the next streamed command is due. `None` when not streaming.
    pub fn next_deadline(&self) -> Option<I> {
        self.session.next_deadline()
    }

    /// Take pending outgoing messages.
    pub fn take_outgoing(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.outgoing)
    }

    fn handle_session_actions(
        &mut self,
        actions: Vec<SessionAction>,
        report_state: bool,
    ) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                SessionAction::Send(message) => self.outgoing.push(message),
                SessionAction::RenderDeviceList(devices) => {
                    events.push(AppEvent::DevicesListed(devices));
                },
                SessionAction::SetControlsEnabled(enabled) => {
                    events.push(AppEvent::ControlsChanged(enabled));
                },
                SessionAction::ShowStatus { kind, text } => {
                    events.push(AppEvent::Status { kind, text });
                },
            }
        }

        if report_state {
            events.push(AppEvent::SessionUpdated {
                status: self.session.status(),
                streaming: self.session.streaming(),
            });
        }
        events
    }
}
