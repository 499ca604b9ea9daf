//! Minimal TOML reader for the game configuration
//!
//! Handles only the subset used by `game.toml`:
//! - `[section]` headers
//! - `key = value` pairs with integer, string or boolean values
//! - Comments (`# ...`), whole-line or trailing
//!
//! Keys missing from the file keep their defaults. The result is
//! validated before it is returned.

use crate::game::Lane;

use super::types::{ConfigError, GameConfig};

/// Sections of `game.toml`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Playfield,
    Spawn,
    Input,
    Clock,
    Link,
    Display,
}

/// Parse and validate a game configuration
pub fn parse_game_config(input: &str) -> Result<GameConfig, ConfigError> {
    let mut config = GameConfig::default();
    let mut section = Section::Root;

    for (index, line) in input.lines().enumerate() {
        let line_no = u16::try_from(index + 1).unwrap_or(u16::MAX);
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])
                .ok_or(ConfigError::UnknownSection { line: line_no })?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::Syntax { line: line_no })?;
        apply_value(&mut config, section, key, value, line_no)?;
    }

    config.validate()?;
    Ok(config)
}

/// Drop a trailing comment that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_section_header(header: &str) -> Option<Section> {
    match header.trim() {
        "playfield" => Some(Section::Playfield),
        "spawn" => Some(Section::Spawn),
        "input" => Some(Section::Input),
        "clock" => Some(Section::Clock),
        "link" => Some(Section::Link),
        "display" => Some(Section::Display),
        _ => None,
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

fn parse_int<T: core::str::FromStr>(value: &str, line: u16) -> Result<T, ConfigError> {
    // TOML allows `_` separators; strip them for the common `9_600` style
    let mut digits: heapless::String<16> = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits
            .push(c)
            .map_err(|_| ConfigError::InvalidValue { line })?;
    }
    digits
        .parse()
        .map_err(|_| ConfigError::InvalidValue { line })
}

fn parse_string(value: &str, line: u16) -> Result<&str, ConfigError> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else {
        Err(ConfigError::InvalidValue { line })
    }
}

fn parse_lane(value: &str, line: u16) -> Result<Lane, ConfigError> {
    match parse_string(value, line)? {
        "top" => Ok(Lane::Top),
        "bottom" => Ok(Lane::Bottom),
        _ => Err(ConfigError::InvalidValue { line }),
    }
}

fn apply_value(
    config: &mut GameConfig,
    section: Section,
    key: &str,
    value: &str,
    line: u16,
) -> Result<(), ConfigError> {
    match (section, key) {
        (Section::Playfield, "width") => config.playfield.width = parse_int(value, line)?,
        (Section::Playfield, "player_column") => {
            config.playfield.player_column = parse_int(value, line)?
        }
        (Section::Playfield, "start_lane") => config.playfield.start_lane = parse_lane(value, line)?,

        (Section::Spawn, "min_ticks") => config.spawn.min_ticks = parse_int(value, line)?,
        (Section::Spawn, "max_ticks") => config.spawn.max_ticks = parse_int(value, line)?,
        (Section::Spawn, "top_lane_percent") => {
            config.spawn.top_lane_percent = parse_int(value, line)?
        }

        (Section::Input, "debounce_ticks") => config.input.debounce_ticks = parse_int(value, line)?,

        (Section::Clock, "tick_hz") => config.clock.tick_hz = parse_int(value, line)?,
        (Section::Clock, "frame_ms") => config.clock.frame_ms = parse_int(value, line)?,

        (Section::Link, "baudrate") => config.link.baudrate = parse_int(value, line)?,
        (Section::Link, "scan_timeout_ms") => config.link.scan_timeout_ms = parse_int(value, line)?,

        (Section::Display, "columns") => config.display.columns = parse_int(value, line)?,
        (Section::Display, "hud_column") => {
            config.display.hud_column = Some(parse_int(value, line)?)
        }
        (Section::Display, "flourish_flashes") => {
            config.display.flourish_flashes = parse_int(value, line)?
        }
        (Section::Display, "flourish_period_ms") => {
            config.display.flourish_period_ms = parse_int(value, line)?
        }

        _ => return Err(ConfigError::UnknownKey { line }),
    }
    Ok(())
}
