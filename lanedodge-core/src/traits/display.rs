//! Character display adapter
//!
//! The display is a character LCD with a handful of user-definable glyph
//! slots. The core only issues glyph uploads, cursor moves, character
//! writes, clears and blinks; bit-level timing belongs to the driver.

use lanedodge_protocol::Glyph;

/// Glyph slot holding the player bitmap
pub const PLAYER_SLOT: u8 = 0;

/// Glyph slot holding the obstacle bitmap
pub const OBSTACLE_SLOT: u8 = 1;

/// Rows on the display, one per lane
pub const DISPLAY_ROWS: u8 = 2;

/// Errors that can occur with the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Pin or bus write failed
    Bus,
    /// Cursor outside the display
    InvalidPosition,
    /// Glyph slot not available
    InvalidSlot,
}

/// Whole-display blink used as the end-of-round flourish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlinkPattern {
    /// Number of off/on cycles
    pub flashes: u8,
    /// Duration of one cycle in milliseconds
    pub period_ms: u16,
}

/// Display operations needed by the controller
///
/// Each call must complete in bounded, known time. `write_glyph` writes at
/// the cursor and advances it one column.
pub trait DisplayAdapter {
    /// Upload a bitmap into a user-definable glyph slot
    fn load_glyph(&mut self, slot: u8, glyph: &Glyph) -> Result<(), DisplayError>;

    /// Move the cursor
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError>;

    /// Write one character code (glyph slots are codes `0..8`)
    fn write_glyph(&mut self, code: u8) -> Result<(), DisplayError>;

    /// Clear the display and home the cursor
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Blink the whole display, leaving it on afterwards
    fn blink(&mut self, pattern: BlinkPattern) -> Result<(), DisplayError>;
}

/// Helpers for text and counters
pub trait DisplayExt: DisplayAdapter {
    /// Write ASCII text starting at a position
    fn write_text(&mut self, col: u8, row: u8, text: &str) -> Result<(), DisplayError> {
        self.set_cursor(col, row)?;
        for byte in text.bytes() {
            self.write_glyph(byte)?;
        }
        Ok(())
    }

    /// Write a zero-padded decimal number of exactly `digits` digits
    ///
    /// Values that do not fit show their lowest digits.
    fn write_number(&mut self, col: u8, row: u8, value: u16, digits: u8) -> Result<(), DisplayError> {
        self.set_cursor(col, row)?;
        let mut divisor = 1u32;
        for _ in 1..digits {
            divisor *= 10;
        }
        for _ in 0..digits {
            let digit = (value as u32 / divisor) % 10;
            self.write_glyph(b'0' + digit as u8)?;
            divisor /= 10;
        }
        Ok(())
    }
}

// Blanket implementation for all display adapters
impl<T: DisplayAdapter + ?Sized> DisplayExt for T {}
