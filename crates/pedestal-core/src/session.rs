//! Session state machine.
//!
//! Tracks which device is selected, whether it is open, and gates every
//! outgoing command on that. Uses the action pattern: methods take inputs (and
//! the current instant where timing matters) and return [`SessionAction`]s
//! for the driver to execute. The session itself performs no I/O.
//!
//! # State Machine
//!
//! ```text
//!                    select                 "connected"
//! ┌──────────────┐ ─────────> ┌────────────┐ ─────────> ┌───────────┐
//! │ Disconnected │            │ Connecting │            │ Connected │
//! └──────────────┘ <───┐      └────────────┘            └───────────┘
//!        ^             │            │ failure                 │
//!        │ lost        │ lost       v                         │ failure
//!        │             │       ┌────────┐ <───────────────────┘
//!        └─────────────┴────── │ Failed │
//!                              └────────┘
//! ```
//!
//! `select` is accepted from every state and always lands in `Connecting`.
//! Channel loss from any state other than `Disconnected` lands in
//! `Disconnected` and releases the device.

use pedestal_proto::{
    ClientMessage, ConnectionResponse, Device, DeviceId, Direction, ResponseStatus, ServerMessage,
};

use crate::{
    env::Timestamp,
    error::ConfigError,
    streamer::{CommandStreamer, StreamConfig},
};

/// Warning shown when a command is attempted without an open device.
pub const NOT_CONNECTED_WARNING: &str = "Please ensure the device is connected first.";

/// Status shown after the channel to the server drops.
pub const DISCONNECTED_STATUS: &str = "Disconnected from device.";

/// Connection status of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// No device open.
    Disconnected,
    /// Connect request sent, waiting for readiness.
    Connecting,
    /// Device open. Commands may be sent.
    Connected,
    /// Server rejected the connect request or the open device failed.
    Failed,
}

/// Severity of an operator-facing status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// Neutral progress information.
    Info,
    /// Something completed.
    Success,
    /// Operator action was not possible right now.
    Warning,
    /// Connection failed or dropped.
    Error,
}

/// Actions returned by the session.
///
/// The driver executes these:
/// - `Send`: Write the message to the transport channel
/// - `RenderDeviceList`, `SetControlsEnabled`, `ShowStatus`: Notify the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Send this message to the server.
    Send(ClientMessage),

    /// Replace the displayed device list.
    RenderDeviceList(Vec<Device>),

    /// Enable or disable the directional and reset controls.
    SetControlsEnabled(bool),

    /// Display a status message.
    ShowStatus {
        /// Severity
        kind: StatusKind,
        /// Text to display verbatim
        text: String,
    },
}

impl SessionAction {
    fn status(kind: StatusKind, text: impl Into<String>) -> Self {
        Self::ShowStatus { kind, text: text.into() }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Command streaming settings.
    pub stream: StreamConfig,
}

/// Client-side session with one device server.
///
/// Pure state machine, no I/O. Generic over the instant type so tests can
/// drive streaming from a virtual clock.
///
/// # Invariants
///
/// - `status == Connected` implies a selected device.
/// - A stream is only active while `status == Connected`.
/// - Controls are enabled exactly while `status == Connected`.
#[derive(Debug, Clone)]
pub struct Session<I> {
    status: SessionStatus,
    selected: Option<DeviceId>,
    controls_enabled: bool,
    streamer: CommandStreamer<I>,
}

impl<I: Timestamp> Session<I> {
    /// Create a session in [`SessionStatus::Disconnected`].
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            status: SessionStatus::Disconnected,
            selected: None,
            controls_enabled: false,
            streamer: CommandStreamer::new(config.stream)?,
        })
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Selected device. `None` before the first selection and after teardown.
    pub fn selected_device(&self) -> Option<&DeviceId> {
        self.selected.as_ref()
    }

    /// Whether the controls are currently enabled.
    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    /// Direction being streamed. `None` when no stream is active.
    pub fn streaming(&self) -> Option<Direction> {
        self.streamer.direction()
    }

    /// Instant the next streamed command is due, for scheduling the next poll.
    pub fn next_deadline(&self) -> Option<I> {
        self.streamer.next_deadline()
    }

    /// Ask the server to enumerate devices. Allowed in every state.
    pub fn request_device_list(&self) -> Vec<SessionAction> {
        vec![SessionAction::Send(ClientMessage::RequestDeviceList)]
    }

    /// Present a freshly fetched device list.
    pub fn on_device_list(&self, devices: Vec<Device>) -> Vec<SessionAction> {
        tracing::debug!(count = devices.len(), "device list received");
        vec![SessionAction::RenderDeviceList(devices)]
    }

    /// Select `device` and request that the server open it.
    ///
    /// Accepted from every state. Any active stream is stopped first, then
    /// exactly one connect request is emitted. Reselecting while connecting
    /// re-sends the request.
    pub fn select_device(&mut self, device: DeviceId) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        self.streamer.stop();
        self.disable_controls(&mut actions);

        tracing::info!(%device, from = ?self.status, "selecting device");
        self.selected = Some(device.clone());
        self.status = SessionStatus::Connecting;

        actions.push(SessionAction::status(StatusKind::Info, format!("Connecting to {device}...")));
        actions.push(SessionAction::Send(ClientMessage::connect(device)));
        actions
    }

    /// Process a connection response from the server.
    pub fn on_response(&mut self, response: &ConnectionResponse) -> Vec<SessionAction> {
        match response.status {
            ResponseStatus::Failure => self.on_failure(response),
            ResponseStatus::Success if response.is_ready() => self.on_ready(),
            ResponseStatus::Success => {
                let text = response.device.as_deref().or(response.message.as_deref());
                match text {
                    Some(text) => vec![SessionAction::status(StatusKind::Info, text)],
                    None => Vec::new(),
                }
            },
        }
    }

    fn on_ready(&mut self) -> Vec<SessionAction> {
        match (self.status, &self.selected) {
            (SessionStatus::Connecting, Some(device)) => {
                tracing::info!(%device, "device connected");
                let text = format!("Connected to {device}");
                self.status = SessionStatus::Connected;
                self.controls_enabled = true;
                vec![
                    SessionAction::SetControlsEnabled(true),
                    SessionAction::status(StatusKind::Success, text),
                ]
            },
            (SessionStatus::Connected, _) => {
                tracing::debug!("duplicate connected response ignored");
                Vec::new()
            },
            (status, _) => {
                tracing::debug!(?status, "stale connected response ignored");
                Vec::new()
            },
        }
    }

    fn on_failure(&mut self, response: &ConnectionResponse) -> Vec<SessionAction> {
        if self.status == SessionStatus::Disconnected {
            tracing::debug!("failure response while disconnected ignored");
            return Vec::new();
        }

        let reason = response.message.as_deref().unwrap_or("unknown error");
        tracing::warn!(%reason, from = ?self.status, "connection failed");

        let mut actions = Vec::new();
        self.streamer.stop();
        self.disable_controls(&mut actions);
        self.status = SessionStatus::Failed;
        actions.push(SessionAction::status(StatusKind::Error, format!("Error: {reason}")));
        actions
    }

    /// Tear down after the transport channel dropped.
    ///
    /// No-op when already disconnected. Otherwise the stream stops before the
    /// selection is cleared, and exactly one release-device message goes out.
    pub fn on_channel_lost(&mut self) -> Vec<SessionAction> {
        if self.status == SessionStatus::Disconnected {
            tracing::debug!("channel lost while disconnected");
            return Vec::new();
        }

        let mut actions = Vec::new();
        let was_streaming = self.streamer.stop();
        let device = self.selected.take();
        tracing::info!(
            ?device,
            was_streaming,
            from = ?self.status,
            "channel lost, releasing device"
        );

        self.status = SessionStatus::Disconnected;
        self.disable_controls(&mut actions);
        actions.push(SessionAction::Send(ClientMessage::release()));
        actions.push(SessionAction::status(StatusKind::Error, DISCONNECTED_STATUS));
        actions
    }

    /// Start streaming `direction` to the open device.
    ///
    /// Soft-fails with a warning when not connected. Replaces any stream
    /// already running.
    pub fn send_directional(&mut self, direction: Direction, now: I) -> Vec<SessionAction> {
        let device = match (self.status, &self.selected) {
            (SessionStatus::Connected, Some(device)) => device.clone(),
            _ => return self.not_connected("send_directional"),
        };

        tracing::debug!(%direction, %device, "stream started");
        self.streamer
            .start(device, direction, now)
            .into_iter()
            .map(|command| SessionAction::Send(ClientMessage::SendCommand(command)))
            .collect()
    }

    /// Stop the active stream. Returns `true` if one was running.
    pub fn stop_directional(&mut self) -> bool {
        let stopped = self.streamer.stop();
        if stopped {
            tracing::debug!("stream stopped");
        }
        stopped
    }

    /// Send one reset command. Soft-fails with a warning when not connected.
    pub fn send_reset(&mut self) -> Vec<SessionAction> {
        match (self.status, &self.selected) {
            (SessionStatus::Connected, Some(device)) => {
                tracing::debug!(%device, "reset");
                vec![SessionAction::Send(ClientMessage::reset(device.clone()))]
            },
            _ => self.not_connected("send_reset"),
        }
    }

    /// Emit streamed commands due by `now`.
    pub fn poll(&mut self, now: I) -> Vec<SessionAction> {
        if self.status != SessionStatus::Connected {
            if self.streamer.stop() {
                tracing::warn!(status = ?self.status, "stream outlived connection, stopped");
            }
            return Vec::new();
        }

        self.streamer
            .poll(now)
            .into_iter()
            .map(|command| SessionAction::Send(ClientMessage::SendCommand(command)))
            .collect()
    }

    /// Dispatch any inbound server message.
    pub fn handle_message(&mut self, message: ServerMessage) -> Vec<SessionAction> {
        match message {
            ServerMessage::DeviceList(devices) => self.on_device_list(devices),
            ServerMessage::ConnectionResponse(response) => self.on_response(&response),
        }
    }

    fn disable_controls(&mut self, actions: &mut Vec<SessionAction>) {
        if self.controls_enabled {
            self.controls_enabled = false;
            actions.push(SessionAction::SetControlsEnabled(false));
        }
    }

    fn not_connected(&self, operation: &'static str) -> Vec<SessionAction> {
        tracing::warn!(operation, status = ?self.status, "command rejected, device not connected");
        vec![SessionAction::status(StatusKind::Warning, NOT_CONNECTED_WARNING)]
    }
}
