//! Configuration type definitions

use crate::game::Lane;

/// Digits rendered for each HUD counter
pub const HUD_DIGITS: u8 = 4;

/// Playfield width bounds (visible columns)
pub const MIN_WIDTH: u8 = 4;
pub const MAX_WIDTH: u8 = 16;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Line is neither a section header nor `key = value`
    Syntax { line: u16 },
    /// Section header not recognized
    UnknownSection { line: u16 },
    /// Key not valid in its section
    UnknownKey { line: u16 },
    /// Value has the wrong type or does not fit
    InvalidValue { line: u16 },
    /// Value parsed but is outside its allowed range
    OutOfRange(&'static str),
}

/// Playfield geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlayfieldConfig {
    /// Visible columns per lane
    pub width: u8,
    /// Column the player occupies
    pub player_column: u8,
    /// Lane the player starts each round in
    pub start_lane: Lane,
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            width: 12,
            player_column: 1,
            start_lane: Lane::Top,
        }
    }
}

/// Obstacle spawner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpawnConfig {
    /// Shortest gap between spawns, in ticks
    pub min_ticks: u8,
    /// Longest gap between spawns, in ticks
    pub max_ticks: u8,
    /// Chance (0-100) that an obstacle lands in the top lane
    pub top_lane_percent: u8,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            min_ticks: 3,
            max_ticks: 7,
            top_lane_percent: 50,
        }
    }
}

/// Lane button handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputConfig {
    /// Ticks during which inputs are ignored after an accepted move
    pub debounce_ticks: u8,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { debounce_ticks: 2 }
    }
}

/// Timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    /// Hardware clock ticks per second
    pub tick_hz: u32,
    /// Main-loop (game tick) period in milliseconds
    pub frame_ms: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_hz: 100,
            frame_ms: 150,
        }
    }
}

/// Host link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    pub baudrate: u32,
    /// Longest time a single frame scan may take
    pub scan_timeout_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baudrate: 9600,
            scan_timeout_ms: 500,
        }
    }
}

/// Character display layout and end-of-round flourish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Character columns on the display
    pub columns: u8,
    /// First HUD column; `None` places the HUD right after the playfield
    pub hud_column: Option<u8>,
    /// Number of blinks at round end
    pub flourish_flashes: u8,
    /// Period of one blink in milliseconds
    pub flourish_period_ms: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            columns: 16,
            hud_column: None,
            flourish_flashes: 3,
            flourish_period_ms: 250,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GameConfig {
    pub playfield: PlayfieldConfig,
    pub spawn: SpawnConfig,
    pub input: InputConfig,
    pub clock: ClockConfig,
    pub link: LinkConfig,
    pub display: DisplayConfig,
}

impl GameConfig {
    /// Column where the HUD counters start
    pub fn hud_column(&self) -> u8 {
        self.display.hud_column.unwrap_or(self.playfield.width)
    }

    /// Check every setting against its allowed range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.playfield;
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&p.width) {
            return Err(ConfigError::OutOfRange("playfield.width"));
        }
        // The two trailing columns are the spawn zone
        if p.player_column >= p.width - 2 {
            return Err(ConfigError::OutOfRange("playfield.player_column"));
        }

        let s = &self.spawn;
        if s.min_ticks == 0 {
            return Err(ConfigError::OutOfRange("spawn.min_ticks"));
        }
        if s.max_ticks < s.min_ticks {
            return Err(ConfigError::OutOfRange("spawn.max_ticks"));
        }
        if s.top_lane_percent > 100 {
            return Err(ConfigError::OutOfRange("spawn.top_lane_percent"));
        }

        if self.clock.tick_hz == 0 {
            return Err(ConfigError::OutOfRange("clock.tick_hz"));
        }
        if self.clock.frame_ms == 0 {
            return Err(ConfigError::OutOfRange("clock.frame_ms"));
        }

        if self.link.baudrate == 0 {
            return Err(ConfigError::OutOfRange("link.baudrate"));
        }
        if self.link.scan_timeout_ms == 0 {
            return Err(ConfigError::OutOfRange("link.scan_timeout_ms"));
        }

        let hud = self.hud_column();
        if hud < p.width || hud as u16 + HUD_DIGITS as u16 > self.display.columns as u16 {
            return Err(ConfigError::OutOfRange("display.hud_column"));
        }
        Ok(())
    }
}
