//! Events that trigger state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A frame was scanned and validated
    ConfigLoaded,
    /// Glyphs uploaded, playfield and clock reset
    SetupComplete,
    /// Player and obstacle met
    Collision,
    /// Goal reached
    GoalReached,
    /// Round result sent to the host
    ReportSent,
    /// Display or link failure; drop back to waiting
    Abort,
}

impl Event {
    /// Check if this event ends a round
    pub fn ends_round(&self) -> bool {
        matches!(self, Event::Collision | Event::GoalReached)
    }
}
