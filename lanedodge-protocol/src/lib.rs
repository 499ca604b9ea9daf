//! Lanedodge Host Link Protocol
//!
//! This crate defines the ASCII protocol between the host (level editor)
//! and the arcade controller. The link is a plain byte stream with no
//! framing beyond the braces of the JSON-like objects themselves.
//!
//! # Protocol Overview
//!
//! Inbound, one object per frame (keys may arrive in any order):
//! ```text
//! {"character":[n0,...,n7],"obstacle":[n0,...,n7],"goalType":"time"|"obstacles","goalValue":n}
//! ```
//!
//! Outbound, one object per line (`\r\n` terminated):
//! ```text
//! {"status":"ready"}
//! {"status":"loaded","character":"ok","obstacle":"ok","goal":"ok","goalType":"time","goalValue":30}
//! {"status":"error","message":"invalid config"}
//! {"obstacles":5,"time":12,"result":"win"}
//! ```
//!
//! The scanner is deliberately not a JSON parser: no nesting, no escapes,
//! fixed-width digit scratch registers.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod glyph;
pub mod level;
pub mod messages;
pub mod scanner;

pub use level::{
    Glyph, GoalType, LevelConfig, LoadFlags, GLYPH_ROWS, MAX_FRAME_LEN, MAX_GOAL,
};
pub use messages::{EncodeError, HostMessage, RoundVerdict, MAX_MESSAGE_LEN};
pub use scanner::{
    ByteSource, ConfigParser, MalformedKind, ParseError, SliceSource, SourceError,
};
