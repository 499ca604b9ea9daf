//! Lanedodge Hardware Abstraction Layer
//!
//! This crate defines the small set of hardware traits the controller
//! logic needs. Chip-specific crates (currently RP2040) implement them so
//! the game core can be exercised on the host with fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  lanedodge-core / lanedodge-firmware     │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  lanedodge-hal (this crate - traits)     │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//!          ┌──────────────────────┐
//!          │ lanedodge-hal-rp2040 │
//!          └──────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::InputPin`] - Lane-select buttons
//! - [`uart::ReceiveRegister`] - Serial receive data/status register

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

pub use gpio::{ActiveLow, InputPin};
pub use uart::{ReceiveRegister, ReceiveStatus, UartConfig};
