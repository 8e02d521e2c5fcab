//! Deterministic simulation harness for the pedestal controller.
//!
//! Virtual-clock [`SimEnv`], an in-memory device server model and a scripted
//! [`SimDriver`] so the production [`pedestal_app::Runtime`] can be driven
//! step by step without a terminal, a network or real time.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks properties that must hold after every
//! step, whatever order inputs arrive in. Use
//! [`InvariantRegistry::standard()`] for the controller's safety rules.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_server;

pub use invariants::{
    AppMirrorsSession, ConnectedImpliesSelection, ControllerSnapshot, ControlsMatchConnected,
    Invariant, InvariantRegistry, InvariantResult, StreamingImpliesConnected, Violation,
};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::{SimEnv, SimInstant};
pub use sim_server::{SharedSimServer, SimServer, create_shared_server, serve};
