//! Round clock
//!
//! The periodic timer event calls [`Clock::on_tick`]; the main loop
//! starts, stops and reads it. Ticks accrue only while a round is active.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// Elapsed-time counter shared with the timer event
#[derive(Debug)]
pub struct Clock {
    ticks: AtomicU32,
    active: AtomicBool,
}

impl Clock {
    /// Create a stopped clock at zero
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
            active: AtomicBool::new(false),
        }
    }

    /// Timer event body
    pub fn on_tick(&self) {
        if self.active.load(Ordering::Acquire) {
            self.ticks.fetch_add(1, Ordering::AcqRel);
        }
    }

    /// Zero the counter and start accruing
    pub fn start(&self) {
        self.ticks.store(0, Ordering::Release);
        self.active.store(true, Ordering::Release);
    }

    /// Stop accruing; the count is kept
    pub fn stop(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Whether ticks are accruing
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Raw tick count
    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Whole seconds elapsed at `tick_hz` ticks per second
    pub fn elapsed_seconds(&self, tick_hz: u32) -> u16 {
        let seconds = self.ticks() / tick_hz.max(1);
        u16::try_from(seconds).unwrap_or(u16::MAX)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
