//! RP2040-specific HAL for the arcade controller
//!
//! This crate provides RP2040 implementations of the lanedodge-hal traits:
//! - UART0 receive register access for the raw receive interrupt
//! - Blocking UART transmit as an `embedded_io::Write` sink
//! - Button inputs

#![no_std]

pub mod gpio;
pub mod uart;

pub use gpio::ButtonPin;
pub use uart::{driver_config, enable_receive_interrupt, HostTx, Uart0Receiver};
