//! Board configuration
//!
//! `game.toml` is embedded at compile time (and validated by build.rs).
//! Edit it and rebuild to customize a board.

use defmt::*;

use lanedodge_core::config::{parse_game_config, GameConfig};

const EMBEDDED_CONFIG: &str = include_str!("../game.toml");

/// Parse the embedded configuration, falling back to the defaults
pub fn load_game_config() -> GameConfig {
    match parse_game_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded game.toml");
            debug!("{:?}", config);
            config
        }
        Err(e) => {
            // build.rs should have caught this
            error!("Failed to parse embedded game.toml: {:?}", e);
            error!("Using default configuration");
            GameConfig::default()
        }
    }
}
