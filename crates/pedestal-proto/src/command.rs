//! Commands addressed to a device.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DeviceId;

/// Direction of a streamed movement command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Raise the pedestal.
    Up,
    /// Lower the pedestal.
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}

/// Instruction carried by a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandMessage {
    /// Ask the server to open the device.
    Connect,
    /// Move up one step.
    Up,
    /// Move down one step.
    Down,
    /// Return to the home height.
    Reset,
}

impl From<Direction> for CommandMessage {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Up,
            Direction::Down => Self::Down,
        }
    }
}

/// One instruction for one device. Built fresh for every emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Target device.
    pub device: DeviceId,
    /// What to do.
    pub message: CommandMessage,
}

impl Command {
    /// Connect request for `device`.
    pub fn connect(device: DeviceId) -> Self {
        Self { device, message: CommandMessage::Connect }
    }

    /// Single movement step.
    pub fn directional(device: DeviceId, direction: Direction) -> Self {
        Self { device, message: direction.into() }
    }

    /// Reset to home height.
    pub fn reset(device: DeviceId) -> Self {
        Self { device, message: CommandMessage::Reset }
    }
}
