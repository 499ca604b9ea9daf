//! Outbound messages (controller → host)
//!
//! Every message is a single-line JSON-like object terminated by `\r\n`.
//! Messages are only produced at state-transition boundaries, never in
//! the middle of a game tick.

use core::fmt::Write;

use heapless::String;

use crate::level::{GoalType, LoadFlags};

/// Longest encoded message, line terminator included
pub const MAX_MESSAGE_LEN: usize = 128;

/// Line terminator appended to every message
pub const LINE_END: &str = "\r\n";

/// Errors that can occur while encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Output buffer too small for the message
    BufferTooSmall,
}

/// Final result of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RoundVerdict {
    Win,
    Lose,
}

impl RoundVerdict {
    /// Wire literal for this verdict
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundVerdict::Win => "win",
            RoundVerdict::Lose => "lose",
        }
    }
}

/// Messages from the controller to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostMessage {
    /// Controller booted and is waiting for a level
    Ready,
    /// A level frame was accepted
    Loaded {
        flags: LoadFlags,
        goal_type: GoalType,
        goal_value: u16,
    },
    /// A level frame was rejected
    LoadError,
    /// A round finished
    RoundResult {
        obstacles: u16,
        seconds: u16,
        verdict: RoundVerdict,
    },
}

fn status(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}

impl HostMessage {
    /// Encode the message body (without line terminator)
    pub fn encode(&self) -> Result<String<MAX_MESSAGE_LEN>, EncodeError> {
        let mut out = String::new();
        let res = match self {
            HostMessage::Ready => out.write_str("{\"status\":\"ready\"}"),
            HostMessage::Loaded {
                flags,
                goal_type,
                goal_value,
            } => write!(
                out,
                "{{\"status\":\"loaded\",\"character\":\"{}\",\"obstacle\":\"{}\",\
                 \"goal\":\"{}\",\"goalType\":\"{}\",\"goalValue\":{}}}",
                status(flags.character),
                status(flags.obstacle),
                status(flags.goal),
                goal_type.as_str(),
                goal_value
            ),
            HostMessage::LoadError => {
                out.write_str("{\"status\":\"error\",\"message\":\"invalid config\"}")
            }
            HostMessage::RoundResult {
                obstacles,
                seconds,
                verdict,
            } => write!(
                out,
                "{{\"obstacles\":{},\"time\":{},\"result\":\"{}\"}}",
                obstacles,
                seconds,
                verdict.as_str()
            ),
        };
        res.map_err(|_| EncodeError::BufferTooSmall)?;
        Ok(out)
    }

    /// Encode the message followed by `\r\n`
    pub fn encode_line(&self) -> Result<String<MAX_MESSAGE_LEN>, EncodeError> {
        let mut out = self.encode()?;
        out.push_str(LINE_END)
            .map_err(|_| EncodeError::BufferTooSmall)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready() {
        let msg = HostMessage::Ready.encode().unwrap();
        assert_eq!(msg.as_str(), "{\"status\":\"ready\"}");
    }

    #[test]
    fn test_loaded_echoes_goal() {
        let msg = HostMessage::Loaded {
            flags: LoadFlags::ALL,
            goal_type: GoalType::ObstacleCount,
            goal_value: 5,
        }
        .encode()
        .unwrap();
        assert_eq!(
            msg.as_str(),
            "{\"status\":\"loaded\",\"character\":\"ok\",\"obstacle\":\"ok\",\
             \"goal\":\"ok\",\"goalType\":\"obstacles\",\"goalValue\":5}"
        );
    }

    #[test]
    fn test_loaded_reports_missing_fields() {
        let msg = HostMessage::Loaded {
            flags: LoadFlags {
                character: true,
                obstacle: false,
                goal: false,
            },
            goal_type: GoalType::Time,
            goal_value: 30,
        }
        .encode()
        .unwrap();
        assert!(msg.contains("\"obstacle\":\"error\""));
        assert!(msg.contains("\"goal\":\"error\""));
        assert!(msg.contains("\"goalType\":\"time\""));
    }

    #[test]
    fn test_load_error() {
        let msg = HostMessage::LoadError.encode().unwrap();
        assert_eq!(
            msg.as_str(),
            "{\"status\":\"error\",\"message\":\"invalid config\"}"
        );
    }

    #[test]
    fn test_round_result_line() {
        let msg = HostMessage::RoundResult {
            obstacles: 5,
            seconds: 12,
            verdict: RoundVerdict::Win,
        }
        .encode_line()
        .unwrap();
        assert_eq!(msg.as_str(), "{\"obstacles\":5,\"time\":12,\"result\":\"win\"}\r\n");
    }

    #[test]
    fn test_longest_message_fits() {
        let msg = HostMessage::Loaded {
            flags: LoadFlags::default(),
            goal_type: GoalType::ObstacleCount,
            goal_value: u16::MAX,
        }
        .encode_line();
        assert!(msg.is_ok());
    }
}
