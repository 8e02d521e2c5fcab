//! Discovered devices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a server-side device resource (e.g. `/dev/ttyUSB0`).
///
/// The controller never interprets the string. It is echoed back to the
/// server verbatim in every command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wrap a server-supplied identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A device reported by the server's enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Human readable description.
    pub name: String,
    /// Identifier to address the device with.
    pub device: DeviceId,
}

impl Device {
    /// Create a device entry.
    pub fn new(name: impl Into<String>, device: impl Into<DeviceId>) -> Self {
        Self { name: name.into(), device: device.into() }
    }

    /// List label, `<name> (<device>)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.device)
    }
}
