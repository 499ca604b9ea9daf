//! Board-agnostic core logic for the lanedodge arcade controller
//!
//! This crate contains everything that does not touch a specific chip:
//!
//! - Transport ring buffer shared between the receive interrupt and the main loop
//! - Clock driven by the periodic timer event
//! - State machine and game engine (playfield, spawner, telemetry)
//! - Reporter for outbound host messages
//! - Display adapter trait
//! - Game configuration types and their TOML loader
//! - The controller context tying it all together
//!
//! Shared state is limited to [`Transport`] and [`Clock`], both built from
//! atomics so they can be placed in `static`s and touched from interrupt
//! handlers without locks.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod controller;
pub mod game;
pub mod report;
pub mod state;
pub mod traits;
pub mod transport;

pub use clock::Clock;
pub use controller::{Controller, ControllerError, LoadSummary, Poll};
pub use transport::{CancelFlag, Deadline, PollBudget, Transport, WaitError};
