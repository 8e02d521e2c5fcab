//! Observable application state types.
//!
//! These structures serve as the "View Model" for the application. They hold
//! what the UI needs to render without exposing the session internals.

use pedestal_core::StatusKind;

/// Text shown in place of an empty device list.
pub const NO_DEVICES: &str = "No USB devices found.";

/// Last status message shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Severity, drives styling.
    pub kind: StatusKind,
    /// Text as supplied by the session or server.
    pub text: String,
}
