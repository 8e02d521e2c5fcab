//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use pedestal_proto::{DeviceId, Direction};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// (Re)open the transport channel to the device server.
    Connect,

    /// Ask the server for a fresh device list.
    RefreshDevices,

    /// Select a device and request that the server open it.
    SelectDevice {
        /// Identifier from the last fetched list.
        device: DeviceId,
    },

    /// Start streaming a directional command.
    StartDirectional {
        /// Movement direction.
        direction: Direction,
    },

    /// Stop the directional stream.
    StopDirectional,

    /// Send a single reset command.
    Reset,
}
