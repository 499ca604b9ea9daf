//! Two-lane dodge game
//!
//! ```text
//!  row 0  │ ▲ . . ■ . . . . . . . . │0003   dodges
//!  row 1  │ . . . . . . ■ . . . . . │0012   seconds
//!           ^player column        ^spawn column
//! ```
//!
//! Obstacles spawn in the trailing column and scroll one column left per
//! tick. The player switches lanes to let them pass.

pub mod engine;
pub mod playfield;
pub mod rng;
pub mod telemetry;

pub use engine::{GameEngine, LaneInputs, TickOutcome};
pub use playfield::{Cell, Column, Lane, Playfield};
pub use rng::Lcg;
pub use telemetry::{Outcome, Telemetry};
