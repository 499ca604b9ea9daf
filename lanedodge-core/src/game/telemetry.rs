//! Per-round telemetry

use lanedodge_protocol::{HostMessage, RoundVerdict};

/// Round outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Round still running (or never started)
    #[default]
    Pending,
    Win,
    Lose,
}

impl Outcome {
    /// Final verdict, if the round is over
    pub fn verdict(self) -> Option<RoundVerdict> {
        match self {
            Outcome::Pending => None,
            Outcome::Win => Some(RoundVerdict::Win),
            Outcome::Lose => Some(RoundVerdict::Lose),
        }
    }
}

impl From<RoundVerdict> for Outcome {
    fn from(verdict: RoundVerdict) -> Self {
        match verdict {
            RoundVerdict::Win => Outcome::Win,
            RoundVerdict::Lose => Outcome::Lose,
        }
    }
}

/// Round record reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Telemetry {
    pub obstacles_dodged: u16,
    pub elapsed_seconds: u16,
    pub outcome: Outcome,
    /// Counters still accruing
    pub active: bool,
}

impl Telemetry {
    /// Zero the counters and mark the round active
    pub fn reset(&mut self) {
        *self = Self {
            active: true,
            ..Self::default()
        };
    }

    /// Count an obstacle that passed the player
    pub fn record_dodge(&mut self) {
        if self.active {
            self.obstacles_dodged = self.obstacles_dodged.saturating_add(1);
        }
    }

    /// Update elapsed time from the clock
    pub fn record_seconds(&mut self, seconds: u16) {
        if self.active {
            self.elapsed_seconds = seconds;
        }
    }

    /// Freeze the record with its final outcome
    pub fn seal(&mut self, verdict: RoundVerdict, seconds: u16) {
        if self.active {
            self.elapsed_seconds = seconds;
            self.outcome = verdict.into();
            self.active = false;
        }
    }

    /// Round-result message for a sealed record
    pub fn to_message(&self) -> Option<HostMessage> {
        self.outcome.verdict().map(|verdict| HostMessage::RoundResult {
            obstacles: self.obstacles_dodged,
            seconds: self.elapsed_seconds,
            verdict,
        })
    }
}
