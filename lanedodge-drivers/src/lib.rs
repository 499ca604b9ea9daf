//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined in
//! lanedodge-core:
//!
//! - Character LCD (HD44780 in 4-bit mode) as the game display

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod display;
