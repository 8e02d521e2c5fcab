//! Standard invariant checks.
//!
//! These invariants capture the controller's safety rules. They verify WHAT
//! must be true after every step, not specific scenarios.

use pedestal_core::SessionStatus;

use super::{ControllerSnapshot, Invariant, InvariantResult, Violation};

/// A connected session always names the device it is connected to.
pub struct ConnectedImpliesSelection;

impl Invariant for ConnectedImpliesSelection {
    fn name(&self) -> &'static str {
        "connected_implies_selection"
    }

    fn check(&self, state: &ControllerSnapshot) -> InvariantResult {
        if state.status == SessionStatus::Connected && state.selected.is_none() {
            return Err(Violation {
                invariant: self.name(),
                message: "session connected without a selected device".into(),
            });
        }
        Ok(())
    }
}

/// A directional stream only runs while the session is connected.
///
/// This is the rule that keeps a pedestal from moving after the device
/// dropped or after a failure.
pub struct StreamingImpliesConnected;

impl Invariant for StreamingImpliesConnected {
    fn name(&self) -> &'static str {
        "streaming_implies_connected"
    }

    fn check(&self, state: &ControllerSnapshot) -> InvariantResult {
        match state.streaming {
            Some(direction) if state.status != SessionStatus::Connected => Err(Violation {
                invariant: self.name(),
                message: format!("streaming {direction} while {:?}", state.status),
            }),
            _ => Ok(()),
        }
    }
}

/// Controls are enabled exactly when the session is connected.
pub struct ControlsMatchConnected;

impl Invariant for ControlsMatchConnected {
    fn name(&self) -> &'static str {
        "controls_match_connected"
    }

    fn check(&self, state: &ControllerSnapshot) -> InvariantResult {
        let connected = state.status == SessionStatus::Connected;
        if state.controls_enabled != connected {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "controls enabled = {} while {:?}",
                    state.controls_enabled, state.status
                ),
            });
        }
        Ok(())
    }
}

/// The App shows the session as it is once a step completes.
pub struct AppMirrorsSession;

impl Invariant for AppMirrorsSession {
    fn name(&self) -> &'static str {
        "app_mirrors_session"
    }

    fn check(&self, state: &ControllerSnapshot) -> InvariantResult {
        let mismatch = if state.app_status != state.status {
            Some(format!("status {:?} shown as {:?}", state.status, state.app_status))
        } else if state.app_streaming != state.streaming {
            Some(format!("stream {:?} shown as {:?}", state.streaming, state.app_streaming))
        } else if state.app_controls_enabled != state.controls_enabled {
            Some(format!(
                "controls {} shown as {}",
                state.controls_enabled, state.app_controls_enabled
            ))
        } else {
            None
        };

        match mismatch {
            Some(message) => Err(Violation { invariant: self.name(), message }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pedestal_core::Direction;
    use pedestal_proto::DeviceId;

    use super::*;

    fn connected() -> ControllerSnapshot {
        ControllerSnapshot {
            status: SessionStatus::Connected,
            selected: Some(DeviceId::new("/dev/ttyUSB0")),
            controls_enabled: true,
            app_status: SessionStatus::Connected,
            app_controls_enabled: true,
            ..ControllerSnapshot::default()
        }
    }

    #[test]
    fn connected_without_selection_is_detected() {
        let state = ControllerSnapshot { selected: None, ..connected() };
        assert!(ConnectedImpliesSelection.check(&state).is_err());
        assert!(ConnectedImpliesSelection.check(&connected()).is_ok());
    }

    #[test]
    fn stream_after_failure_is_detected() {
        let state = ControllerSnapshot {
            status: SessionStatus::Failed,
            streaming: Some(Direction::Up),
            ..ControllerSnapshot::default()
        };

        let violation = StreamingImpliesConnected.check(&state).unwrap_err();
        assert_eq!(violation.invariant, "streaming_implies_connected");
    }

    #[test]
    fn controls_enabled_while_connecting_is_detected() {
        let state = ControllerSnapshot {
            status: SessionStatus::Connecting,
            controls_enabled: true,
            ..ControllerSnapshot::default()
        };
        assert!(ControlsMatchConnected.check(&state).is_err());
    }

    #[test]
    fn stale_app_view_is_detected() {
        let state = ControllerSnapshot { app_status: SessionStatus::Connecting, ..connected() };
        assert!(AppMirrorsSession.check(&state).is_err());
        assert!(AppMirrorsSession.check(&connected()).is_ok());
    }
}
