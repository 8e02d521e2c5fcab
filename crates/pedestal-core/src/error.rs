//! Error types for the pedestal core.
//!
//! Operator-reachable conditions (commands while disconnected, connect
//! failures, channel loss) are not errors here. The session reports them as
//! status actions. These types cover configuration and transport I/O only.

use std::io;

use pedestal_proto::ProtocolError;
use thiserror::Error;

/// Invalid session or streamer configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A zero cadence would emit unboundedly many commands per poll.
    #[error("stream cadence must be non-zero")]
    ZeroCadence,
}

/// Errors raised by the transport channel.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A line could not be framed or parsed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The channel has been closed.
    #[error("channel closed")]
    Closed,
}

impl TransportError {
    /// Returns true if the channel is gone and the session should tear down.
    ///
    /// A malformed line is not fatal: the next line may be fine.
    pub fn is_channel_lost(&self) -> bool {
        !matches!(self, Self::Protocol(_))
    }
}
