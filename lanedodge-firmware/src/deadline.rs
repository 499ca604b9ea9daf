//! Frame scan deadline on the embassy time driver

use embassy_time::{Duration, Instant};

use lanedodge_core::Deadline;

/// Expires at a fixed instant
pub struct InstantDeadline {
    at: Instant,
}

impl InstantDeadline {
    pub fn after_millis(ms: u32) -> Self {
        Self {
            at: Instant::now() + Duration::from_millis(ms as u64),
        }
    }
}

impl Deadline for InstantDeadline {
    fn expired(&mut self) -> bool {
        Instant::now() >= self.at
    }
}
