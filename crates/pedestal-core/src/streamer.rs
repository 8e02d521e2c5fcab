//! Repeating command emission.
//!
//! The streamer emits one directional [`Command`] per cadence period while
//! active. It owns no timer: the caller passes the current instant to
//! [`CommandStreamer::poll`] and schedules its next wakeup from
//! [`CommandStreamer::next_deadline`]. A virtual clock therefore drives it
//! exactly like the real one.
//!
//! # Timing
//!
//! ```text
//!  start        cadence      cadence      stop
//!    │<──────────>│<──────────>│           │
//!    ●            ●            ●           ✕      Immediate
//!    ·            ●            ●           ✕      AfterPeriod
//! ```
//!
//! Periods are never coalesced. A late poll emits one command for every
//! period that elapsed since the previous emission.

use std::time::Duration;

use pedestal_proto::{Command, DeviceId, Direction};

use crate::{env::Timestamp, error::ConfigError};

/// Default period between streamed commands.
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(2);

/// When the first command of a stream goes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstEmission {
    /// At the instant the stream starts.
    #[default]
    Immediate,
    /// One full cadence period after the stream starts.
    AfterPeriod,
}

/// Streamer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Period between emissions. Must be non-zero.
    pub cadence: Duration,
    /// First emission policy, applied to every stream.
    pub first_emission: FirstEmission,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { cadence: DEFAULT_CADENCE, first_emission: FirstEmission::default() }
    }
}

impl StreamConfig {
    /// Reject configurations the streamer cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cadence.is_zero() {
            return Err(ConfigError::ZeroCadence);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct ActiveStream<I> {
    device: DeviceId,
    direction: Direction,
    next_due: I,
}

/// Cancellable repeating emitter of directional commands.
///
/// Holds at most one active stream. Starting a new stream replaces the
/// current one before anything is emitted.
#[derive(Debug, Clone)]
pub struct CommandStreamer<I> {
    config: StreamConfig,
    active: Option<ActiveStream<I>>,
}

impl<I: Timestamp> CommandStreamer<I> {
    /// Create an idle streamer.
    pub fn new(config: StreamConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, active: None })
    }

    /// Begin streaming `direction` to `device`.
    ///
    /// The caller is responsible for only starting streams against an open
    /// device. Returns the commands due at `now`, which is one command under
    /// [`FirstEmission::Immediate`] and none otherwise.
    pub fn start(&mut self, device: DeviceId, direction: Direction, now: I) -> Vec<Command> {
        if self.stop() {
            tracing::debug!(%direction, "replacing active stream");
        }

        let next_due = match self.config.first_emission {
            FirstEmission::Immediate => now,
            FirstEmission::AfterPeriod => now + self.config.cadence,
        };
        self.active = Some(ActiveStream { device, direction, next_due });
        self.poll(now)
    }

    /// Cancel the active stream. Returns `true` if one was running.
    pub fn stop(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Emit every command that has come due by `now`.
    pub fn poll(&mut self, now: I) -> Vec<Command> {
        let Some(stream) = self.active.as_mut() else {
            return Vec::new();
        };

        let mut commands = Vec::new();
        while stream.next_due <= now {
            commands.push(Command::directional(stream.device.clone(), stream.direction));
            stream.next_due = stream.next_due + self.config.cadence;
        }
        commands
    }

    /// Instant the next command is due. `None` when idle.
    pub fn next_deadline(&self) -> Option<I> {
        self.active.as_ref().map(|stream| stream.next_due)
    }

    /// Direction of the running stream. `None` when idle.
    pub fn direction(&self) -> Option<Direction> {
        self.active.as_ref().map(|stream| stream.direction)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use pedestal_proto::CommandMessage;

    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn streamer(first_emission: FirstEmission) -> CommandStreamer<Instant> {
        CommandStreamer::new(StreamConfig { cadence: 2 * MS, first_emission }).unwrap()
    }

    fn device() -> DeviceId {
        DeviceId::new("/dev/ttyUSB0")
    }

    #[test]
    fn zero_cadence_is_rejected() {
        let config = StreamConfig { cadence: Duration::ZERO, ..StreamConfig::default() };
        assert!(matches!(
            CommandStreamer::<Instant>::new(config),
            Err(ConfigError::ZeroCadence)
        ));
    }

    #[test]
    fn immediate_policy_emits_on_start() {
        let mut streamer = streamer(FirstEmission::Immediate);
        let t0 = Instant::now();

        let commands = streamer.start(device(), Direction::Up, t0);

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].message, CommandMessage::Up);
        assert_eq!(streamer.next_deadline(), Some(t0 + 2 * MS));
    }

    #[test]
    fn delayed_policy_waits_one_period() {
        let mut streamer = streamer(FirstEmission::AfterPeriod);
        let t0 = Instant::now();

        assert!(streamer.start(device(), Direction::Down, t0).is_empty());
        assert!(streamer.poll(t0 + MS).is_empty());
        assert_eq!(streamer.poll(t0 + 2 * MS).len(), 1);
    }

    #[test]
    fn late_poll_catches_up_every_period() {
        let mut streamer = streamer(FirstEmission::AfterPeriod);
        let t0 = Instant::now();
        let _ = streamer.start(device(), Direction::Up, t0);

        // 2, 4, 6, 8, 10 ms
        assert_eq!(streamer.poll(t0 + 11 * MS).len(), 5);
        assert_eq!(streamer.next_deadline(), Some(t0 + 12 * MS));
    }

    #[test]
    fn restart_replaces_stream() {
        let mut streamer = streamer(FirstEmission::Immediate);
        let t0 = Instant::now();
        let _ = streamer.start(device(), Direction::Up, t0);

        let commands = streamer.start(device(), Direction::Down, t0 + MS);

        assert_eq!(streamer.direction(), Some(Direction::Down));
        assert!(commands.iter().all(|c| c.message == CommandMessage::Down));
        assert_eq!(streamer.next_deadline(), Some(t0 + 3 * MS));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut streamer = streamer(FirstEmission::Immediate);
        let t0 = Instant::now();
        let _ = streamer.start(device(), Direction::Up, t0);

        assert!(streamer.stop());
        assert!(!streamer.stop());
        assert!(streamer.poll(t0 + 10 * MS).is_empty());
        assert_eq!(streamer.next_deadline(), None);
    }
}
