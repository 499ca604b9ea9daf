//! Hardware abstraction traits
//!
//! These traits define the interface between the controller logic and
//! device-specific implementations.

pub mod display;

pub use display::{
    BlinkPattern, DisplayAdapter, DisplayError, DisplayExt, DISPLAY_ROWS, OBSTACLE_SLOT,
    PLAYER_SLOT,
};
