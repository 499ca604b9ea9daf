//! Level configuration received from the host
//!
//! A level is two 8-row glyph bitmaps (player and obstacle) plus a win
//! condition. The controller boots with an empty, invalid level and only
//! replaces it wholesale after a frame has been fully scanned.

use core::fmt::Write;

use heapless::String;

use crate::messages::EncodeError;

/// Rows per glyph bitmap
pub const GLYPH_ROWS: usize = 8;

/// Upper bound (inclusive) for `goalValue`
pub const MAX_GOAL: u16 = 9999;

/// Goal used before any frame has been loaded
pub const DEFAULT_GOAL_SECONDS: u16 = 30;

/// Longest canonical inbound frame: both glyphs at 255, "obstacles", MAX_GOAL
///
/// `{"character":[` (14) + 31 + `],"obstacle":[` (14) + 31 +
/// `],"goalType":"obstacles","goalValue":` (37) + 4 + `}` (1)
pub const MAX_FRAME_LEN: usize = 132;

/// One glyph bitmap, one byte per display row
pub type Glyph = [u8; GLYPH_ROWS];

/// Win condition kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GoalType {
    /// Survive for `goal_value` seconds
    Time,
    /// Dodge `goal_value` obstacles
    ObstacleCount,
}

impl GoalType {
    /// Wire literal for this goal type
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Time => "time",
            GoalType::ObstacleCount => "obstacles",
        }
    }
}

/// Which parts of the level were present in the last frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadFlags {
    /// Player glyph parsed
    pub character: bool,
    /// Obstacle glyph parsed
    pub obstacle: bool,
    /// Both goal type and goal value parsed
    pub goal: bool,
}

impl LoadFlags {
    /// Every field loaded
    pub const ALL: Self = Self {
        character: true,
        obstacle: true,
        goal: true,
    };

    /// Check that every field was loaded
    pub fn all(&self) -> bool {
        self.character && self.obstacle && self.goal
    }
}

/// Per-round level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LevelConfig {
    /// Player glyph
    pub character: Glyph,
    /// Obstacle glyph
    pub obstacle: Glyph,
    /// Win condition kind
    pub goal_type: GoalType,
    /// Win condition target (seconds or dodges)
    pub goal_value: u16,
    /// Presence flags
    pub loaded: LoadFlags,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            character: [0; GLYPH_ROWS],
            obstacle: [0; GLYPH_ROWS],
            goal_type: GoalType::Time,
            goal_value: DEFAULT_GOAL_SECONDS,
            loaded: LoadFlags::default(),
        }
    }
}

/// Check `0 < value <= MAX_GOAL`
pub fn goal_in_range(value: u32) -> bool {
    value > 0 && value <= MAX_GOAL as u32
}

impl LevelConfig {
    /// Build a fully loaded level
    pub fn new(character: Glyph, obstacle: Glyph, goal_type: GoalType, goal_value: u16) -> Self {
        Self {
            character,
            obstacle,
            goal_type,
            goal_value,
            loaded: LoadFlags::ALL,
        }
    }

    /// A level can start a round only when all fields are loaded and the
    /// goal is in range
    pub fn is_valid(&self) -> bool {
        self.loaded.all() && goal_in_range(self.goal_value as u32)
    }

    /// Encode as a canonical inbound frame
    ///
    /// Used by host tooling and tests to produce what the scanner expects.
    pub fn encode_frame(&self) -> Result<String<MAX_FRAME_LEN>, EncodeError> {
        let mut out = String::new();
        write_glyph_field(&mut out, "character", &self.character)?;
        out.push(',').map_err(|_| EncodeError::BufferTooSmall)?;
        write_glyph_field(&mut out, "obstacle", &self.obstacle)?;
        write!(
            out,
            ",\"goalType\":\"{}\",\"goalValue\":{}}}",
            self.goal_type.as_str(),
            self.goal_value
        )
        .map_err(|_| EncodeError::BufferTooSmall)?;
        Ok(out)
    }
}

fn write_glyph_field<const N: usize>(
    out: &mut String<N>,
    name: &str,
    glyph: &Glyph,
) -> Result<(), EncodeError> {
    if out.is_empty() {
        out.push('{').map_err(|_| EncodeError::BufferTooSmall)?;
    }
    write!(out, "\"{}\":[", name).map_err(|_| EncodeError::BufferTooSmall)?;
    for (i, row) in glyph.iter().enumerate() {
        if i > 0 {
            out.push(',').map_err(|_| EncodeError::BufferTooSmall)?;
        }
        write!(out, "{}", row).map_err(|_| EncodeError::BufferTooSmall)?;
    }
    out.push(']').map_err(|_| EncodeError::BufferTooSmall)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_valid() {
        let level = LevelConfig::default();
        assert!(!level.is_valid());
        assert_eq!(level.character, [0; 8]);
        assert_eq!(level.goal_type, GoalType::Time);
    }

    #[test]
    fn test_goal_bounds() {
        assert!(!goal_in_range(0));
        assert!(goal_in_range(1));
        assert!(goal_in_range(MAX_GOAL as u32));
        assert!(!goal_in_range(MAX_GOAL as u32 + 1));
    }

    #[test]
    fn test_encode_frame_canonical() {
        let level = LevelConfig::new(
            [0, 1, 2, 3, 4, 5, 6, 7],
            [31, 31, 0, 0, 0, 0, 0, 0],
            GoalType::ObstacleCount,
            5,
        );
        let frame = level.encode_frame().unwrap();
        assert_eq!(
            frame.as_str(),
            "{\"character\":[0,1,2,3,4,5,6,7],\"obstacle\":[31,31,0,0,0,0,0,0],\
             \"goalType\":\"obstacles\",\"goalValue\":5}"
        );
    }

    #[test]
    fn test_longest_frame_fits() {
        let level = LevelConfig::new([255; 8], [255; 8], GoalType::ObstacleCount, MAX_GOAL);
        let frame = level.encode_frame().unwrap();
        assert_eq!(frame.len(), MAX_FRAME_LEN);
    }
}
