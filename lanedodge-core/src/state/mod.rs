//! Controller state machine
//!
//! Explicit, finite and deterministic: every observable behavior of the
//! controller is a function of the current state and an event.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::State;
