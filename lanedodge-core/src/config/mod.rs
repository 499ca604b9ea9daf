//! Game configuration
//!
//! Board and gameplay tunables compiled into the firmware as TOML and
//! parsed at boot without allocation. Per-round level data arrives over
//! the link instead (see `lanedodge_protocol::LevelConfig`).

pub mod toml;
pub mod types;

pub use toml::parse_game_config;
pub use types::*;
