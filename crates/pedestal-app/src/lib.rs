//! Application layer for the pedestal controller
//!
//! Pure state machines and generic runtime for UI and session orchestration,
//! enabling deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: UI state machine (key handling, device list, status line)
//! - [`Bridge`]: Session bridge (translates App actions to Session calls)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod driver;
mod event;
mod input;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use bridge::Bridge;
pub use driver::{Driver, Inbound};
pub use event::AppEvent;
pub use input::KeyInput;
pub use runtime::{DEFAULT_IDLE_POLL, Runtime, RuntimeConfig};
pub use state::{NO_DEVICES, StatusLine};
