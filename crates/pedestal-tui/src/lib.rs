//! Terminal UI for the pedestal controller
//!
//! A thin shell over [`pedestal_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`pedestal_app::Runtime`]
//!
//! This crate only handles terminal input, rendering and picking the
//! channel: a remote device server over TCP, or an in-process simulated one.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod logging;
pub mod server;
pub mod terminal;
pub mod ui;

pub use cli::Args;
pub use pedestal_app::{App, AppAction, AppEvent, Bridge, Driver, KeyInput, Runtime};
pub use terminal::{ConnectionMode, TerminalDriver, TerminalError};
