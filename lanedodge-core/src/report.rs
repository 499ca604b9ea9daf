//! Outbound reporting
//!
//! Encodes host messages and writes them to the link. Only called at
//! state-transition boundaries, so a slow link never stalls a game tick.

use embedded_io::Write;
use lanedodge_protocol::{HostMessage, LevelConfig};

use crate::game::Telemetry;

/// Errors that can occur while reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Message did not fit the encode buffer
    Encode,
    /// Link write failed
    Link,
}

/// Writes host messages to a byte sink
pub struct Reporter<W: Write> {
    link: W,
}

impl<W: Write> Reporter<W> {
    /// Create a reporter over `link`
    pub fn new(link: W) -> Self {
        Self { link }
    }

    /// Encode and send one message line
    pub fn send(&mut self, message: &HostMessage) -> Result<(), ReportError> {
        let line = message.encode_line().map_err(|_| ReportError::Encode)?;
        self.link
            .write_all(line.as_bytes())
            .map_err(|_| ReportError::Link)?;
        self.link.flush().map_err(|_| ReportError::Link)
    }

    /// Boot banner
    pub fn ready(&mut self) -> Result<(), ReportError> {
        self.send(&HostMessage::Ready)
    }

    /// Acknowledge an accepted level
    pub fn loaded(&mut self, level: &LevelConfig) -> Result<(), ReportError> {
        self.send(&HostMessage::Loaded {
            flags: level.loaded,
            goal_type: level.goal_type,
            goal_value: level.goal_value,
        })
    }

    /// Reject a frame
    pub fn load_error(&mut self) -> Result<(), ReportError> {
        self.send(&HostMessage::LoadError)
    }

    /// Report a finished round; pending telemetry is not sent
    pub fn round_result(&mut self, telemetry: &Telemetry) -> Result<(), ReportError> {
        match telemetry.to_message() {
            Some(message) => self.send(&message),
            None => Ok(()),
        }
    }

    /// The underlying link
    pub fn link(&self) -> &W {
        &self.link
    }
}
