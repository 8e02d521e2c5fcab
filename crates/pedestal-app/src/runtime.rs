//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: Session bridge
//! - [`Driver`]: Platform-specific I/O
//!
//! Everything runs on one task. Each [`Runtime::step`] handles queued inbound
//! messages in arrival order, then input, then the replies that input
//! produced, then streamed commands that came due.
//! Between steps the runtime sleeps until the next streamed command is due
//! or the idle poll interval elapses, whichever comes first.

use std::time::Duration;

use pedestal_core::{ConfigError, Environment, SessionConfig, StatusKind};

use crate::{App, AppAction, AppEvent, Bridge, Driver, Inbound};

/// Longest the runtime sleeps between input polls when nothing is streaming.
pub const DEFAULT_IDLE_POLL: Duration = Duration::from_millis(5);

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Session and streaming settings.
    pub session: SessionConfig,
    /// Upper bound on the sleep between steps.
    pub idle_poll: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { session: SessionConfig::default(), idle_poll: DEFAULT_IDLE_POLL }
    }
}

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment providing the clock
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    env: E,
    app: App,
    bridge: Bridge<E::Instant>,
    idle_poll: Duration,
}

impl<D, E> Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Create a new runtime with the given driver and environment.
    pub fn new(
        driver: D,
        env: E,
        server_addr: String,
        config: RuntimeConfig,
    ) -> Result<Self, ConfigError> {
        let bridge = Bridge::new(config.session)?;
        let app = App::new(server_addr);
        Ok(Self { driver, env, app, bridge, idle_poll: config.idle_poll })
    }

    /// Run the main event loop until the operator quits.
    ///
    /// Opens the channel, fetches the device list, then steps until a
    /// [`AppAction::Quit`]. On exit the session is torn down so the server
    /// releases the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        let mut quit = self.start().await?;

        while !quit {
            quit = self.step().await?;
            if !quit {
                self.idle().await;
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Open the channel and run the resulting actions.
    ///
    /// Returns `true` if the application should quit.
    pub async fn start(&mut self) -> Result<bool, D::Error> {
        let actions = self.open_channel().await;
        self.process_actions(actions).await
    }

    /// Process one cycle of the event loop.
    ///
    /// Inbound traffic already queued is handled before input, so a channel
    /// loss always reaches the session ahead of a key press that followed it.
    /// Replies triggered by the input are drained in the same step.
    ///
    /// Returns `true` if the application should quit.
    pub async fn step(&mut self) -> Result<bool, D::Error> {
        if self.drain_inbound().await? {
            return Ok(true);
        }

        let actions = self.driver.poll_event(&mut self.app).await?;
        if !actions.is_empty() && self.process_actions(actions).await? {
            return Ok(true);
        }

        if self.drain_inbound().await? {
            return Ok(true);
        }

        let now = self.env.now();
        let events = self.bridge.handle_tick(now);
        self.send_outgoing().await?;
        self.process_bridge_events(events).await
    }

    /// Handle every inbound item in arrival order.
    ///
    /// Returns `true` if should quit.
    async fn drain_inbound(&mut self) -> Result<bool, D::Error> {
        while let Some(inbound) = self.driver.recv_message().await {
            let events = match inbound {
                Inbound::Message(message) => self.bridge.handle_message(message),
                Inbound::ChannelLost => {
                    tracing::warn!("channel to device server lost");
                    let mut events = self.bridge.handle_channel_lost();
                    events.push(AppEvent::ChannelLost);
                    events
                },
            };
            self.send_outgoing().await?;
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),
                    AppAction::Connect => pending_actions.extend(self.open_channel().await),

                    // Session operations go through the bridge
                    AppAction::RefreshDevices
                    | AppAction::SelectDevice { .. }
                    | AppAction::StartDirectional { .. }
                    | AppAction::StopDirectional
                    | AppAction::Reset => {
                        let now = self.env.now();
                        let events = self.bridge.process_app_action(action, now);
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                        self.send_outgoing().await?;
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_bridge_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Open the transport channel. A failure is shown, not propagated, so the
    /// operator can retry.
    async fn open_channel(&mut self) -> Vec<AppAction> {
        match self.driver.connect().await {
            Ok(()) => {
                tracing::info!(server = self.app.server_addr(), "channel open");
                self.app.handle(AppEvent::ChannelOpened)
            },
            Err(e) => {
                tracing::warn!(error = %e, "could not reach device server");
                self.app.set_status(StatusKind::Error, format!("Error: {e}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Sleep until the next streamed command is due, bounded by the idle poll.
    async fn idle(&self) {
        let now = self.env.now();
        let wait = match self.bridge.next_deadline() {
            Some(deadline) if deadline <= now => return,
            Some(deadline) => (deadline - now).min(self.idle_poll),
            None => self.idle_poll,
        };
        self.env.sleep(wait).await;
    }

    /// Release the device and close the channel.
    pub async fn shutdown(&mut self) {
        tracing::info!("shutting down");
        let _ = self.bridge.handle_channel_lost();
        if let Err(e) = self.send_outgoing().await {
            tracing::warn!(error = %e, "failed to send release on shutdown");
        }
        self.driver.stop();
    }

    /// Send all pending outgoing messages to the server.
    async fn send_outgoing(&mut self) -> Result<(), D::Error> {
        for message in self.bridge.take_outgoing() {
            self.driver.send_message(message).await?;
        }
        Ok(())
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the Bridge
    pub fn bridge(&self) -> &Bridge<E::Instant> {
        &self.bridge
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the Driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
