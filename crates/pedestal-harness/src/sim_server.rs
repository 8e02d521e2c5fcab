//! In-memory device server model.
//!
//! `SimServer` answers controller messages the way a device server does:
//! it enumerates a fixed device list, opens one device per connect request
//! and releases it on the release notification. Every message it receives is
//! recorded so tests can assert exactly what left the controller.
//!
//! [`serve`] runs the model over any byte stream using the production line
//! codec, which lets turmoil tests exercise the real transport end to end.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pedestal_core::{TransportError, transport};
use pedestal_proto::{
    ClientMessage, Command, ConnectionResponse, Device, DeviceId, ServerMessage,
};
use tokio::io::{AsyncRead, AsyncWrite};

/// Device server model.
#[derive(Debug, Clone, Default)]
pub struct SimServer {
    devices: Vec<Device>,
    /// Reason every connect is refused with. `None` accepts known devices.
    refusal: Option<String>,
    open: Option<DeviceId>,
    received: Vec<ClientMessage>,
    /// Commands that arrived while no device was open.
    stray_commands: usize,
}

/// Server model shared between a driver and the test body.
pub type SharedSimServer = Arc<Mutex<SimServer>>;

/// Wrap a server model for sharing.
pub fn create_shared_server(server: SimServer) -> SharedSimServer {
    Arc::new(Mutex::new(server))
}

/// Lock a shared server, recovering the model if a test thread panicked.
pub(crate) fn lock(server: &SharedSimServer) -> MutexGuard<'_, SimServer> {
    server.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimServer {
    /// Server that enumerates the given devices and accepts connects to them.
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices, ..Self::default() }
    }

    /// Refuse every connect with `reason`.
    #[must_use]
    pub fn with_refusal(mut self, reason: impl Into<String>) -> Self {
        self.refusal = Some(reason.into());
        self
    }

    /// Replace the enumerated devices.
    pub fn set_devices(&mut self, devices: Vec<Device>) {
        self.devices = devices;
    }

    /// Change the refusal reason. `None` accepts again.
    pub fn set_refusal(&mut self, reason: Option<String>) {
        self.refusal = reason;
    }

    /// Handle one controller message and return the replies.
    pub fn handle(&mut self, message: &ClientMessage) -> Vec<ServerMessage> {
        self.received.push(message.clone());

        match message {
            ClientMessage::RequestDeviceList => {
                vec![ServerMessage::DeviceList(self.devices.clone())]
            },
            ClientMessage::Connect(command) => {
                vec![ServerMessage::ConnectionResponse(self.open_device(&command.device))]
            },
            ClientMessage::SendCommand(command) => {
                if self.open.as_ref() != Some(&command.device) {
                    self.stray_commands += 1;
                    tracing::debug!(
                        device = %command.device,
                        "command for a device that is not open"
                    );
                }
                Vec::new()
            },
            ClientMessage::ReleaseDevice(_) => {
                self.open = None;
                Vec::new()
            },
        }
    }

    fn open_device(&mut self, device: &DeviceId) -> ConnectionResponse {
        if let Some(reason) = &self.refusal {
            return ConnectionResponse::failure(reason.clone());
        }
        if !self.devices.iter().any(|d| &d.device == device) {
            return ConnectionResponse::failure(format!("could not open port {device}"));
        }
        self.open = Some(device.clone());
        ConnectionResponse::connected()
    }

    /// Every message received, in arrival order.
    pub fn received(&self) -> &[ClientMessage] {
        &self.received
    }

    /// Commands received, in arrival order.
    pub fn commands(&self) -> Vec<&Command> {
        self.received
            .iter()
            .filter_map(|m| match m {
                ClientMessage::SendCommand(command) => Some(command),
                _ => None,
            })
            .collect()
    }

    /// Devices named by connect requests, in arrival order.
    pub fn connects(&self) -> Vec<&DeviceId> {
        self.received
            .iter()
            .filter_map(|m| match m {
                ClientMessage::Connect(command) => Some(&command.device),
                _ => None,
            })
            .collect()
    }

    /// Number of release notifications received.
    pub fn releases(&self) -> usize {
        self.received.iter().filter(|m| matches!(m, ClientMessage::ReleaseDevice(_))).count()
    }

    /// Commands that arrived while their device was not open.
    pub fn stray_commands(&self) -> usize {
        self.stray_commands
    }

    /// Currently open device.
    pub fn open(&self) -> Option<&DeviceId> {
        self.open.as_ref()
    }
}

/// Serve one controller over a line-framed stream until it hangs up.
///
/// # Errors
///
/// Returns an error if the stream fails or delivers a malformed line.
pub async fn serve<S>(server: SharedSimServer, stream: S) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite,
{
    let (mut reader, mut writer) = transport::split(stream);

    while let Some(message) = reader.recv::<ClientMessage>().await? {
        let replies = lock(&server).handle(&message);
        for reply in &replies {
            writer.send(reply).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> SimServer {
        SimServer::new(vec![Device::new("Arduino", "/dev/ttyUSB0")])
    }

    #[test]
    fn lists_devices() {
        let mut server = server();
        let replies = server.handle(&ClientMessage::RequestDeviceList);

        assert_eq!(replies, vec![ServerMessage::DeviceList(vec![Device::new(
            "Arduino",
            "/dev/ttyUSB0"
        )])]);
    }

    #[test]
    fn connect_to_known_device_opens_it() {
        let mut server = server();
        let replies = server.handle(&ClientMessage::connect(DeviceId::new("/dev/ttyUSB0")));

        assert_eq!(
            replies,
            vec![ServerMessage::ConnectionResponse(ConnectionResponse::connected())]
        );
        assert_eq!(server.open().map(DeviceId::as_str), Some("/dev/ttyUSB0"));
    }

    #[test]
    fn connect_to_unknown_device_fails() {
        let mut server = server();
        let replies = server.handle(&ClientMessage::connect(DeviceId::new("COM9")));

        assert!(matches!(
            replies.as_slice(),
            [ServerMessage::ConnectionResponse(r)] if !r.is_ready()
        ));
        assert!(server.open().is_none());
    }

    #[test]
    fn command_without_open_device_is_stray() {
        let mut server = server();
        let _ = server.handle(&ClientMessage::reset(DeviceId::new("/dev/ttyUSB0")));

        assert_eq!(server.stray_commands(), 1);
        assert_eq!(server.commands().len(), 1);
    }

    #[test]
    fn release_closes_device() {
        let mut server = server();
        let _ = server.handle(&ClientMessage::connect(DeviceId::new("/dev/ttyUSB0")));
        let _ = server.handle(&ClientMessage::release());

        assert!(server.open().is_none());
        assert_eq!(server.releases(), 1);
    }
}
