//! Glyph helpers
//!
//! The character LCD shows 5 columns per glyph row, taken from the low
//! bits of each byte. The host editor refuses player/obstacle pairs that
//! are too similar to tell apart; the controller applies the same check as
//! an advisory when a level is loaded.

use crate::level::{Glyph, GLYPH_ROWS};

/// Visible pixel columns per glyph row
pub const VISIBLE_COLUMNS: u32 = 5;

/// Mask selecting the visible columns of a row
pub const VISIBLE_MASK: u8 = 0x1F;

/// Minimum share of differing pixels for two glyphs to be distinguishable
pub const MIN_DIFFERENCE_PERCENT: u8 = 20;

const VISIBLE_PIXELS: u32 = VISIBLE_COLUMNS * GLYPH_ROWS as u32;

/// Glyph with only its visible bits kept
pub fn visible(glyph: &Glyph) -> Glyph {
    let mut out = *glyph;
    for row in out.iter_mut() {
        *row &= VISIBLE_MASK;
    }
    out
}

/// No visible pixel is lit
pub fn is_blank(glyph: &Glyph) -> bool {
    glyph.iter().all(|row| row & VISIBLE_MASK == 0)
}

/// Percentage (rounded down) of visible pixels that differ
pub fn difference_percent(a: &Glyph, b: &Glyph) -> u8 {
    let differing: u32 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| ((x ^ y) & VISIBLE_MASK).count_ones())
        .sum();
    (differing * 100 / VISIBLE_PIXELS) as u8
}

/// The two glyphs differ in at least [`MIN_DIFFERENCE_PERCENT`] of pixels
pub fn distinct_enough(a: &Glyph, b: &Glyph) -> bool {
    difference_percent(a, b) >= MIN_DIFFERENCE_PERCENT
}
