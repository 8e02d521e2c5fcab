//! In-process simulated device server.
//!
//! Runs the [`SimServer`] model as a tokio task, with mpsc channels standing
//! in for the network. Lets the UI be exercised with no hardware and no
//! device server.

use pedestal_core::transport::CHANNEL_CAPACITY;
use pedestal_harness::SimServer;
use pedestal_proto::{ClientMessage, Device, ServerMessage};
use tokio::sync::mpsc;

/// Handle to a running in-process server.
pub struct ServerHandle {
    /// Send messages to the server.
    pub to_server: mpsc::Sender<ClientMessage>,
    /// Receive messages from the server.
    pub from_server: mpsc::Receiver<ServerMessage>,
    /// Abort handle to stop the server task.
    abort_handle: tokio::task::AbortHandle,
}

impl ServerHandle {
    /// Stop the server.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Devices the simulated server enumerates.
pub fn simulated_devices() -> Vec<Device> {
    vec![
        Device::new("Simulated pedestal", "/dev/ttySIM0"),
        Device::new("Simulated pedestal (spare)", "/dev/ttySIM1"),
    ]
}

/// Spawn an in-process simulated server.
///
/// The server runs as a tokio task until stopped or until the controller
/// drops its sender.
pub fn spawn_server(mut server: SimServer) -> ServerHandle {
    let (client_tx, mut server_rx) = mpsc::channel::<ClientMessage>(CHANNEL_CAPACITY);
    let (server_tx, client_rx) = mpsc::channel::<ServerMessage>(CHANNEL_CAPACITY);

    let handle = tokio::spawn(async move {
        while let Some(message) = server_rx.recv().await {
            tracing::trace!(event = message.event_name(), "simulated server received");
            for reply in server.handle(&message) {
                if server_tx.send(reply).await.is_err() {
                    return;
                }
            }
        }
        tracing::debug!("simulated server stopped");
    });

    ServerHandle {
        to_server: client_tx,
        from_server: client_rx,
        abort_handle: handle.abort_handle(),
    }
}
