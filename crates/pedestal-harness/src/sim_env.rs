//! Virtual clock environment.
//!
//! Time only moves when a test advances it or when the runtime sleeps. A
//! sleep completes immediately after moving the clock forward by the
//! requested amount, so a runtime loop driven by [`SimEnv`] runs as fast as
//! the CPU allows while observing exact, reproducible instants.

use std::{
    ops::{Add, Sub},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use pedestal_core::Environment;

/// Point on the virtual timeline, measured from the simulation start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Instant at `offset` past the simulation start.
    pub fn from_start(offset: Duration) -> Self {
        Self(offset)
    }
}

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs))
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    /// Saturates at zero like `std::time::Instant`.
    fn sub(self, rhs: Self) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

/// Environment backed by a shared virtual clock.
///
/// Clones share the same clock.
#[derive(Debug, Clone, Default)]
pub struct SimEnv {
    nanos: Arc<AtomicU64>,
}

impl SimEnv {
    /// Create an environment whose clock starts at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward. Saturates at `u64::MAX` nanoseconds.
    pub fn advance(&self, duration: Duration) {
        let step = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        let _ = self.nanos.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |nanos| {
            Some(nanos.saturating_add(step))
        });
    }

    /// Time elapsed since the simulation start.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(self.elapsed())
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        self.advance(duration);
        std::future::ready(())
    }
}
