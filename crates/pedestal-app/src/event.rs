//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (key press/release, resize) and system ticks.
//! - Session notifications translated by the [`crate::Bridge`].

use pedestal_core::{SessionStatus, StatusKind};
use pedestal_proto::{Device, Direction};

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Key pressed (or auto-repeated).
    Key(KeyInput),

    /// Key released. Only reported by terminals that support it.
    KeyReleased(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Transport channel is up.
    ChannelOpened,

    /// Transport channel dropped.
    ChannelLost,

    /// Device list replaced.
    DevicesListed(Vec<Device>),

    /// Controls enabled or disabled.
    ControlsChanged(bool),

    /// Status message to display.
    Status {
        /// Severity
        kind: StatusKind,
        /// Text to display
        text: String,
    },

    /// Session state after an operation.
    SessionUpdated {
        /// Connection status
        status: SessionStatus,
        /// Active stream direction
        streaming: Option<Direction>,
    },
}
