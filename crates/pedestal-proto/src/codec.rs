//! Line framing.
//!
//! One JSON object per `\n`-terminated line. Compact JSON never contains a raw
//! newline, so no escaping is needed beyond what `serde_json` already does.

use serde::{Serialize, de::DeserializeOwned};

use crate::errors::{ProtocolError, Result};

/// Longest line accepted in either direction, in bytes.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Encode a message as a newline-terminated line.
pub fn encode<T: Serialize>(message: &T) -> Result<String> {
    let mut line = serde_json::to_string(message)?;
    if line.len() > MAX_LINE_LEN {
        return Err(ProtocolError::LineTooLong { len: line.len(), max: MAX_LINE_LEN });
    }
    line.push('\n');
    Ok(line)
}

/// Decode one line. Trailing `\r`/`\n` are ignored.
pub fn decode<T: DeserializeOwned>(line: &str) -> Result<T> {
    if line.len() > MAX_LINE_LEN {
        return Err(ProtocolError::LineTooLong { len: line.len(), max: MAX_LINE_LEN });
    }

    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.trim().is_empty() {
        return Err(ProtocolError::EmptyLine);
    }

    Ok(serde_json::from_str(trimmed)?)
}
