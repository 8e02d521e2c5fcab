//! Observable state snapshots for invariant checking.

use pedestal_app::App;
use pedestal_core::{Direction, Session, SessionStatus, Timestamp};
use pedestal_proto::DeviceId;

/// Observable controller state at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    /// Session status.
    pub status: SessionStatus,
    /// Selected device.
    pub selected: Option<DeviceId>,
    /// Active stream direction.
    pub streaming: Option<Direction>,
    /// Session's control enablement.
    pub controls_enabled: bool,
    /// Status shown by the App.
    pub app_status: SessionStatus,
    /// Stream direction shown by the App.
    pub app_streaming: Option<Direction>,
    /// Control enablement shown by the App.
    pub app_controls_enabled: bool,
}

impl Default for ControllerSnapshot {
    fn default() -> Self {
        Self {
            status: SessionStatus::Disconnected,
            selected: None,
            streaming: None,
            controls_enabled: false,
            app_status: SessionStatus::Disconnected,
            app_streaming: None,
            app_controls_enabled: false,
        }
    }
}

impl ControllerSnapshot {
    /// Capture both the session and the App's view of it.
    pub fn capture<I: Timestamp>(app: &App, session: &Session<I>) -> Self {
        Self {
            status: session.status(),
            selected: session.selected_device().cloned(),
            streaming: session.streaming(),
            controls_enabled: session.controls_enabled(),
            app_status: app.session_status(),
            app_streaming: app.streaming(),
            app_controls_enabled: app.controls_enabled(),
        }
    }
}
