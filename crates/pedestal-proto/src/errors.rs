//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while framing or parsing wire messages.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Payload is not valid JSON for the expected message type.
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),

    /// Line exceeds [`crate::codec::MAX_LINE_LEN`].
    #[error("line of {len} bytes exceeds limit of {max}")]
    LineTooLong {
        /// Observed length in bytes
        len: usize,
        /// Configured limit
        max: usize,
    },

    /// Line bytes are not UTF-8.
    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    /// Line held only whitespace.
    #[error("empty line")]
    EmptyLine,
}
