//! Embassy tasks
//!
//! `clock_tick_task` and `input_task` run on the high-priority interrupt
//! executor so they keep running while the main loop is inside a frame
//! scan. `game_task` runs on the thread-mode executor.

pub mod clock;
pub mod game;
pub mod input;

pub use clock::clock_tick_task;
pub use game::game_task;
pub use input::{input_task, LaneButtons};
