//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use pedestal_proto::{ClientMessage, ServerMessage};

use crate::{App, AppAction};

/// Something that arrived on the transport channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A message from the server.
    Message(ServerMessage),
    /// The channel dropped. Reported once per loss.
    ChannelLost,
}

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal UI and in simulation.
///
/// # Implementations
///
/// - **TUI**: crossterm for key events, TCP line transport or an in-process
///   device server
/// - **Simulation**: scripted events and a fake device server
///
/// All methods must return promptly. The runtime paces itself with the
/// environment clock, not by blocking inside the driver.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Poll for pending input and feed it to the app.
    ///
    /// Returns the resulting actions, empty if no input was ready.
    fn poll_event(
        &mut self,
        app: &mut App,
    ) -> impl Future<Output = Result<Vec<AppAction>, Self::Error>> + Send;

    /// Send a message to the server.
    ///
    /// # Errors
    ///
    /// Returns an error only for driver failures. A dead channel is reported
    /// through [`Driver::recv_message`] instead.
    fn send_message(
        &mut self,
        message: ClientMessage,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Next inbound item, or `None` if nothing is ready.
    fn recv_message(&mut self) -> impl Future<Output = Option<Inbound>> + Send;

    /// Open the transport channel to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot be established.
    fn connect(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Check if the transport channel is up.
    fn is_connected(&self) -> bool;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Close the channel and clean up resources.
    fn stop(&mut self);
}
