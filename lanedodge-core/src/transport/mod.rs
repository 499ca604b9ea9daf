//! Byte transport between the receive interrupt and the main loop
//!
//! ```text
//!   UART RX IRQ                     main loop
//!  ─────────────                   ───────────
//!  service_receive() ──push──▶ [ ring buffer ] ──try_pop / pop_blocking──▶ scanner
//!        │                          ▲
//!        └─ overrun: restart RX     └─ reset() after a frame is handled
//! ```
//!
//! The interrupt side is the only writer of the write cursor and the main
//! loop the only writer of the read cursor.

mod ring;
mod source;
mod wait;

pub use ring::Transport;
pub use source::TransportSource;
pub use wait::{CancelFlag, Deadline, PollBudget, WaitError};
