//! State machine definition

use lanedodge_protocol::RoundVerdict;

use super::events::Event;

/// Controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Idle screen, scanning the link for a level frame
    #[default]
    WaitingConfig,
    /// Level accepted; uploading glyphs and resetting the round
    Initializing,
    /// Round running, one engine tick per main-loop iteration
    Playing,
    /// Round over; telemetry sealed and waiting to be reported
    RoundEnd(RoundVerdict),
}

impl State {
    /// Check if the engine should tick in this state
    pub fn is_playing(&self) -> bool {
        matches!(self, State::Playing)
    }

    /// Check if the link is scanned for frames in this state
    pub fn accepts_config(&self) -> bool {
        matches!(self, State::WaitingConfig)
    }

    /// Check if this is a round-end state
    pub fn is_round_end(&self) -> bool {
        matches!(self, State::RoundEnd(_))
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            (WaitingConfig, ConfigLoaded) => Initializing,

            (Initializing, SetupComplete) => Playing,

            (Playing, Collision) => RoundEnd(RoundVerdict::Lose),
            (Playing, GoalReached) => RoundEnd(RoundVerdict::Win),

            (RoundEnd(_), ReportSent) => WaitingConfig,

            // Any failure returns to waiting so a new frame can be accepted
            (_, Abort) => WaitingConfig,

            // Default: stay in current state
            _ => self,
        }
    }
}
