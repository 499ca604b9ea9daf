//! Spawn randomness
//!
//! A 32-bit linear congruential generator. The hardware timer seeds it at
//! round start and every draw mixes in the engine tick and the previous
//! output, so spawn cadence cannot be learned from a fixed sequence while
//! staying reproducible for a given seed.

const MULTIPLIER: u32 = 1_103_515_245;
const INCREMENT: u32 = 12_345;

/// Linear congruential generator with draw perturbation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
    last: u32,
}

impl Lcg {
    /// Seed the generator; a zero seed is replaced by 1
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
            last: 0,
        }
    }

    /// Next 15-bit output
    pub fn draw(&mut self, tick: u32) -> u32 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        self.state ^= tick ^ self.last;
        self.last = (self.state >> 16) & 0x7FFF;
        self.last
    }

    /// Uniform draw from `min..=max`
    pub fn range(&mut self, min: u8, max: u8, tick: u32) -> u8 {
        if max <= min {
            return min;
        }
        let span = (max - min) as u32 + 1;
        min + (self.draw(tick) % span) as u8
    }

    /// True with roughly `percent` percent probability
    pub fn chance(&mut self, percent: u8, tick: u32) -> bool {
        self.draw(tick) % 100 < percent as u32
    }
}
