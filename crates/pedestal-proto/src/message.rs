//! Messages exchanged over the transport channel.
//!
//! Both directions use adjacently tagged JSON: `{"event": <name>, "data":
//! <payload>}`. Event names match the device server's handlers.

use serde::{Deserialize, Serialize};

use crate::{Command, Device, DeviceId, Direction};

/// Response message flagging that the device is open and ready for commands.
pub const CONNECTED: &str = "connected";

/// Payload of the release-device message. The server ignores its value.
pub const RELEASE_MARKER: u8 = 1;

/// Messages sent from the controller to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientMessage {
    /// Ask the server to enumerate attached devices.
    #[serde(rename = "get_usb_devices")]
    RequestDeviceList,

    /// Ask the server to open a device.
    #[serde(rename = "connect_to_device")]
    Connect(Command),

    /// One directional or reset command.
    #[serde(rename = "send_data")]
    SendCommand(Command),

    /// Tell the server to free the device resource.
    #[serde(rename = "disconnect")]
    ReleaseDevice(u8),
}

impl ClientMessage {
    /// Connect request for `device`.
    pub fn connect(device: DeviceId) -> Self {
        Self::Connect(Command::connect(device))
    }

    /// Movement step for `device`.
    pub fn directional(device: DeviceId, direction: Direction) -> Self {
        Self::SendCommand(Command::directional(device, direction))
    }

    /// Reset command for `device`.
    pub fn reset(device: DeviceId) -> Self {
        Self::SendCommand(Command::reset(device))
    }

    /// Release-device notification.
    pub fn release() -> Self {
        Self::ReleaseDevice(RELEASE_MARKER)
    }

    /// Wire event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::RequestDeviceList => "get_usb_devices",
            Self::Connect(_) => "connect_to_device",
            Self::SendCommand(_) => "send_data",
            Self::ReleaseDevice(_) => "disconnect",
        }
    }
}

/// Messages sent from the server to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    /// Discovered devices. Replaces any previous list wholesale.
    #[serde(rename = "usb_devices")]
    DeviceList(Vec<Device>),

    /// Result of a connect attempt.
    #[serde(rename = "connection_response")]
    ConnectionResponse(ConnectionResponse),
}

/// Outcome reported in a [`ConnectionResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// Request accepted.
    Success,
    /// Request rejected. Servers also spell this `error`.
    #[serde(alias = "error")]
    Failure,
}

/// Server reply to a connect request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionResponse {
    /// Success or failure.
    pub status: ResponseStatus,
    /// Informational device text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// `connected` on readiness, otherwise free text (error reason on failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ConnectionResponse {
    /// Successful response flagging readiness.
    pub fn connected() -> Self {
        Self { status: ResponseStatus::Success, device: None, message: Some(CONNECTED.into()) }
    }

    /// Failure response with a reason.
    pub fn failure(message: impl Into<String>) -> Self {
        Self { status: ResponseStatus::Failure, device: None, message: Some(message.into()) }
    }

    /// Successful response that carries only informational text.
    pub fn info(device: impl Into<String>) -> Self {
        Self { status: ResponseStatus::Success, device: Some(device.into()), message: None }
    }

    /// True when this is a success carrying the `connected` flag.
    pub fn is_ready(&self) -> bool {
        self.status == ResponseStatus::Success && self.message.as_deref() == Some(CONNECTED)
    }
}
