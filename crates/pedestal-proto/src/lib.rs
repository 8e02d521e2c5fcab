//! Pedestal wire protocol
//!
//! Message types exchanged between the controller and the device server that
//! owns the serial connection. Every message is a JSON object with an `event`
//! name and an optional `data` payload, framed one object per line.
//!
//! # Components
//!
//! - [`Device`]/[`DeviceId`]: discovered peripherals
//! - [`Command`]: one instruction addressed to a device
//! - [`ClientMessage`]/[`ServerMessage`]: the two directions of the channel
//! - [`codec`]: line framing

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
mod command;
mod device;
pub mod errors;
mod message;

pub use command::{Command, CommandMessage, Direction};
pub use device::{Device, DeviceId};
pub use errors::ProtocolError;
pub use message::{
    CONNECTED, ClientMessage, ConnectionResponse, RELEASE_MARKER, ResponseStatus, ServerMessage,
};
