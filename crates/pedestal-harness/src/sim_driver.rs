//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`pedestal_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Input is injected through shared state, so a test can keep scripting the
//! driver while the runtime owns it. With a [`SharedSimServer`] attached,
//! every message sent over an open channel is answered synchronously and the
//! replies are queued for the next [`Driver::recv_message`].

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use pedestal_app::{App, AppAction, AppEvent, Driver, Inbound, KeyInput};
use pedestal_proto::{ClientMessage, ServerMessage};

use crate::sim_server::{self, SharedSimServer};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Shared state for event injection.
#[derive(Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    inbound: VecDeque<Inbound>,
    sent: Vec<ClientMessage>,
    /// Messages sent while the channel was down.
    dropped: Vec<ClientMessage>,
    channel_open: bool,
    refuse_connect: bool,
    connect_attempts: usize,
}

/// Simulation driver for deterministic testing.
///
/// Clones share state, so a test can keep a handle after moving the driver
/// into a runtime.
#[derive(Clone)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    server: Option<SharedSimServer>,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDriver {
    /// Create a driver with no server attached. Sent messages are only
    /// recorded.
    pub fn new() -> Self {
        Self { state: Arc::new(Mutex::new(SharedState::default())), server: None }
    }

    /// Answer sent messages with the given server model.
    #[must_use]
    pub fn with_server(mut self, server: SharedSimServer) -> Self {
        self.server = Some(server);
        self
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.lock().pending_events.push_back(event);
    }

    /// Inject a key press.
    pub fn press(&self, key: KeyInput) {
        self.inject_event(AppEvent::Key(key));
    }

    /// Inject a key release.
    pub fn release(&self, key: KeyInput) {
        self.inject_event(AppEvent::KeyReleased(key));
    }

    /// Inject a message as if the server had sent it.
    pub fn inject_message(&self, message: ServerMessage) {
        self.lock().inbound.push_back(Inbound::Message(message));
    }

    /// Drop the channel. Queued replies are discarded and the loss is
    /// reported on the next receive.
    pub fn drop_channel(&self) {
        let mut state = self.lock();
        if state.channel_open {
            state.channel_open = false;
            state.inbound.clear();
            state.inbound.push_back(Inbound::ChannelLost);
        }
    }

    /// Make subsequent connect attempts fail.
    pub fn refuse_connect(&self, refuse: bool) {
        self.lock().refuse_connect = refuse;
    }

    /// Take all messages sent over an open channel.
    pub fn take_sent(&self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.lock().sent)
    }

    /// Messages sent while the channel was down.
    pub fn dropped(&self) -> Vec<ClientMessage> {
        self.lock().dropped.clone()
    }

    /// Check if there are pending events or inbound messages.
    pub fn has_pending(&self) -> bool {
        let state = self.lock();
        !state.pending_events.is_empty() || !state.inbound.is_empty()
    }

    /// Number of connect attempts.
    pub fn connect_attempts(&self) -> usize {
        self.lock().connect_attempts
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        let event = self.lock().pending_events.pop_front();
        Ok(event.map(|event| app.handle(event)).unwrap_or_default())
    }

    async fn send_message(&mut self, message: ClientMessage) -> Result<(), Self::Error> {
        if !self.lock().channel_open {
            tracing::debug!(event = message.event_name(), "channel down, message dropped");
            self.lock().dropped.push(message);
            return Ok(());
        }

        let replies = match &self.server {
            Some(server) => sim_server::lock(server).handle(&message),
            None => Vec::new(),
        };

        let mut state = self.lock();
        state.sent.push(message);
        state.inbound.extend(replies.into_iter().map(Inbound::Message));
        Ok(())
    }

    async fn recv_message(&mut self) -> Option<Inbound> {
        self.lock().inbound.pop_front()
    }

    async fn connect(&mut self) -> Result<(), Self::Error> {
        let mut state = self.lock();
        state.connect_attempts += 1;
        if state.refuse_connect {
            return Err(SimDriverError("connection refused".into()));
        }
        state.channel_open = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.lock().channel_open
    }

    fn render(&mut self, _app: &App) -> Result<(), Self::Error> {
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().channel_open = false;
    }
}
