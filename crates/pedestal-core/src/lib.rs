//! Pedestal core
//!
//! Client-side session logic for driving a pedestal through a device server.
//! Everything here is Sans-IO except the optional transport: state machines
//! receive inputs and the current instant, and return actions for a driver to
//! execute.
//!
//! # Components
//!
//! - [`Session`]: selection and connection state, gates every command
//! - [`CommandStreamer`]: repeating directional emission at a fixed cadence
//! - [`Environment`]: clock abstraction (real or virtual)
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::ConnectedChannel`]: line-framed message channel
//! - [`transport::connect`]: connect to a device server over TCP

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
pub mod error;
pub mod session;
pub mod streamer;

#[cfg(feature = "transport")]
pub mod transport;

pub use env::{Environment, SystemEnv, Timestamp};
pub use error::{ConfigError, TransportError};
pub use pedestal_proto::{Device, DeviceId, Direction};
pub use session::{Session, SessionAction, SessionConfig, SessionStatus, StatusKind};
pub use streamer::{CommandStreamer, FirstEmission, StreamConfig};
