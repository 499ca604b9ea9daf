//! Streaming level-frame scanner
//!
//! Pulls bytes one at a time from a [`ByteSource`] and assembles a
//! [`LevelConfig`]. The scanner never buffers the frame: every field is
//! decoded as its bytes go by, with fixed-width digit scratch registers.
//!
//! Scanning rules:
//! - Everything before the first `{` is ignored.
//! - Keys are matched through a static table, so fields may arrive in any
//!   order. Unknown keys have their value skipped.
//! - A `{` inside a frame abandons the partial frame and restarts at that
//!   brace (resynchronization).
//! - The closing `}` ends the frame; the draft is then validated.
//!
//! The source is responsible for bounding the wait: a source that runs
//! dry or whose deadline expires returns [`SourceError::TimedOut`], which
//! ends the scan.

use heapless::Vec;

use crate::level::{goal_in_range, Glyph, GoalType, LevelConfig, LoadFlags, GLYPH_ROWS};

/// Digits kept for each glyph row value
const GLYPH_SCRATCH_DIGITS: u8 = 3;

/// Digits kept for the goal value
const GOAL_SCRATCH_DIGITS: u8 = 5;

/// Longest key the table can match
const MAX_KEY_LEN: usize = 12;

/// Errors reported by a byte source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceError {
    /// No byte arrived before the deadline
    TimedOut,
    /// The wait was cancelled by the owner
    Cancelled,
}

/// Blocking supplier of bytes with a bounded wait
pub trait ByteSource {
    /// Return the next byte, waiting at most until the source's deadline
    fn next_byte(&mut self) -> Result<u8, SourceError>;
}

/// Byte source over an in-memory slice
///
/// Reports [`SourceError::TimedOut`] once the slice is exhausted, like a
/// silent link would.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Create a source over `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }
}

impl ByteSource for SliceSource<'_> {
    fn next_byte(&mut self) -> Result<u8, SourceError> {
        let byte = *self.bytes.get(self.pos).ok_or(SourceError::TimedOut)?;
        self.pos += 1;
        Ok(byte)
    }
}

/// Structural problems found inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MalformedKind {
    /// Key not followed by `:`
    MissingColon,
    /// Glyph field value does not start with `[`
    MissingArray,
    /// A number was expected
    MissingValue,
    /// Array closed before 8 values were read
    ShortArray,
    /// Frame closed inside an array
    UnterminatedArray,
    /// String value does not start with `"`
    MissingQuote,
    /// Frame closed inside a string
    UnterminatedString,
}

/// Reasons a scan did not produce a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// The frame structure could not be scanned
    Malformed(MalformedKind),
    /// The frame was complete but fields were missing or out of range
    Invalid(LoadFlags),
    /// The source stopped delivering bytes
    TimedOut,
    /// The scan was cancelled
    Cancelled,
}

impl From<SourceError> for ParseError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::TimedOut => ParseError::TimedOut,
            SourceError::Cancelled => ParseError::Cancelled,
        }
    }
}

/// Fields the scanner knows how to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Character,
    Obstacle,
    GoalType,
    GoalValue,
}

/// Key lookup table
const FIELDS: [(&[u8], Field); 4] = [
    (b"character", Field::Character),
    (b"obstacle", Field::Obstacle),
    (b"goalType", Field::GoalType),
    (b"goalValue", Field::GoalValue),
];

fn lookup(key: &[u8]) -> Option<Field> {
    FIELDS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, field)| *field)
}

/// Internal control flow of a frame scan
enum Fault {
    /// A new frame started; scan again from its `{`
    Restart,
    /// The scan ended with an error
    Fail(ParseError),
}

impl From<SourceError> for Fault {
    fn from(e: SourceError) -> Self {
        Fault::Fail(e.into())
    }
}

fn malformed(kind: MalformedKind) -> Fault {
    Fault::Fail(ParseError::Malformed(kind))
}

/// Fields collected so far in the current frame
#[derive(Default)]
struct Draft {
    character: Option<Glyph>,
    obstacle: Option<Glyph>,
    goal_type: Option<GoalType>,
    goal_value: Option<u32>,
}

impl Draft {
    fn flags(&self) -> LoadFlags {
        LoadFlags {
            character: self.character.is_some(),
            obstacle: self.obstacle.is_some(),
            goal: self.goal_type.is_some() && self.goal_value.is_some(),
        }
    }

    fn finish(self) -> Result<LevelConfig, ParseError> {
        let flags = self.flags();
        match (self.character, self.obstacle, self.goal_type, self.goal_value) {
            (Some(character), Some(obstacle), Some(goal_type), Some(value))
                if goal_in_range(value) =>
            {
                Ok(LevelConfig::new(character, obstacle, goal_type, value as u16))
            }
            _ => Err(ParseError::Invalid(flags)),
        }
    }
}

fn is_blank(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

/// Read the next byte of the current frame; `{` restarts the scan
fn next_in_frame<S: ByteSource>(src: &mut S) -> Result<u8, Fault> {
    match src.next_byte()? {
        b'{' => Err(Fault::Restart),
        byte => Ok(byte),
    }
}

fn skip_blanks<S: ByteSource>(src: &mut S) -> Result<u8, Fault> {
    loop {
        let byte = next_in_frame(src)?;
        if !is_blank(byte) {
            return Ok(byte);
        }
    }
}

/// Accumulate decimal digits starting with `first`
///
/// Digits past `max_digits` are consumed but ignored. Returns the
/// accumulator and the byte that ended the number.
fn read_digits<S: ByteSource, T>(
    first: u8,
    max_digits: u8,
    src: &mut S,
    mut acc: T,
    step: impl Fn(T, u8) -> T,
) -> Result<(T, u8), Fault> {
    let mut byte = first;
    let mut kept = 0;
    while byte.is_ascii_digit() {
        if kept < max_digits {
            acc = step(acc, byte - b'0');
            kept += 1;
        }
        byte = next_in_frame(src)?;
    }
    Ok((acc, byte))
}

fn read_glyph<S: ByteSource>(src: &mut S) -> Result<Glyph, Fault> {
    if skip_blanks(src)? != b'[' {
        return Err(malformed(MalformedKind::MissingArray));
    }

    let mut glyph = [0u8; GLYPH_ROWS];
    let mut closed = false;
    for (i, row) in glyph.iter_mut().enumerate() {
        let mut byte = next_in_frame(src)?;
        while byte == b',' || is_blank(byte) {
            byte = next_in_frame(src)?;
        }
        if byte == b']' || byte == b'}' {
            return Err(malformed(MalformedKind::ShortArray));
        }
        if !byte.is_ascii_digit() {
            return Err(malformed(MalformedKind::MissingValue));
        }

        let (value, end) = read_digits(byte, GLYPH_SCRATCH_DIGITS, src, 0u8, |acc, d| {
            acc.wrapping_mul(10).wrapping_add(d)
        })?;
        *row = value;

        match end {
            b']' if i + 1 < GLYPH_ROWS => return Err(malformed(MalformedKind::ShortArray)),
            b']' => closed = true,
            b'}' => return Err(malformed(MalformedKind::UnterminatedArray)),
            _ => {}
        }
    }

    // Extra values after the eighth are ignored
    while !closed {
        match next_in_frame(src)? {
            b']' => closed = true,
            b'}' => return Err(malformed(MalformedKind::UnterminatedArray)),
            _ => {}
        }
    }
    Ok(glyph)
}

/// Read a goal type literal; `None` for an empty literal
fn read_goal_type<S: ByteSource>(src: &mut S) -> Result<Option<GoalType>, Fault> {
    if skip_blanks(src)? != b'"' {
        return Err(malformed(MalformedKind::MissingQuote));
    }
    let lead = next_in_frame(src)?;
    if lead == b'"' {
        return Ok(None);
    }
    if lead == b'}' {
        return Err(malformed(MalformedKind::UnterminatedString));
    }
    skip_string(src)?;
    Ok(Some(if lead == b't' {
        GoalType::Time
    } else {
        GoalType::ObstacleCount
    }))
}

/// Consume the rest of a string up to its closing quote
fn skip_string<S: ByteSource>(src: &mut S) -> Result<(), Fault> {
    loop {
        match next_in_frame(src)? {
            b'"' => return Ok(()),
            b'}' => return Err(malformed(MalformedKind::UnterminatedString)),
            _ => {}
        }
    }
}

/// Read the goal value; the flag reports that `}` ended the number
fn read_goal_value<S: ByteSource>(src: &mut S) -> Result<(u32, bool), Fault> {
    let first = skip_blanks(src)?;
    if !first.is_ascii_digit() {
        return Err(malformed(MalformedKind::MissingValue));
    }
    let (value, end) = read_digits(first, GOAL_SCRATCH_DIGITS, src, 0u32, |acc, d| {
        acc * 10 + d as u32
    })?;
    Ok((value, end == b'}'))
}

/// Skip the value of an unknown key; the flag reports that `}` ended it
fn skip_value<S: ByteSource>(src: &mut S) -> Result<bool, Fault> {
    let mut depth = 0u8;
    loop {
        match next_in_frame(src)? {
            b'"' => skip_string(src)?,
            b'[' => depth = depth.saturating_add(1),
            b']' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => return Ok(false),
            b'}' if depth == 0 => return Ok(true),
            _ => {}
        }
    }
}

/// Read a key after its opening quote; `None` if it is not in the table
fn read_key<S: ByteSource>(src: &mut S) -> Result<Option<Field>, Fault> {
    let mut key: Vec<u8, MAX_KEY_LEN> = Vec::new();
    let mut overflow = false;
    loop {
        match next_in_frame(src)? {
            b'"' => break,
            b'}' => return Err(malformed(MalformedKind::UnterminatedString)),
            byte => {
                if key.push(byte).is_err() {
                    overflow = true;
                }
            }
        }
    }
    if skip_blanks(src)? != b':' {
        return Err(malformed(MalformedKind::MissingColon));
    }
    Ok(if overflow { None } else { lookup(&key) })
}

/// Scans level frames out of a byte stream
#[derive(Debug, Clone, Default)]
pub struct ConfigParser {
    resyncs: u32,
}

impl ConfigParser {
    /// Create a new scanner
    pub const fn new() -> Self {
        Self { resyncs: 0 }
    }

    /// Number of partial frames abandoned because a new frame started
    pub fn resyncs(&self) -> u32 {
        self.resyncs
    }

    /// Scan one frame
    ///
    /// Skips to the next `{`, decodes fields until the matching `}` and
    /// validates the result. On error the bytes consumed so far are gone;
    /// calling `parse` again resumes at the next frame start.
    pub fn parse<S: ByteSource>(&mut self, src: &mut S) -> Result<LevelConfig, ParseError> {
        let mut at_open = false;
        loop {
            if !at_open {
                while src.next_byte()? != b'{' {}
            }
            match Self::scan_object(src) {
                Ok(level) => return level,
                Err(Fault::Restart) => {
                    self.resyncs = self.resyncs.wrapping_add(1);
                    at_open = true;
                }
                Err(Fault::Fail(e)) => return Err(e),
            }
        }
    }

    /// Scan the body of an object whose `{` was just consumed
    fn scan_object<S: ByteSource>(src: &mut S) -> Result<Result<LevelConfig, ParseError>, Fault> {
        let mut draft = Draft::default();
        loop {
            match next_in_frame(src)? {
                b'}' => return Ok(draft.finish()),
                b'"' => {
                    let closed = match read_key(src)? {
                        Some(Field::Character) => {
                            draft.character = Some(read_glyph(src)?);
                            false
                        }
                        Some(Field::Obstacle) => {
                            draft.obstacle = Some(read_glyph(src)?);
                            false
                        }
                        Some(Field::GoalType) => {
                            draft.goal_type = read_goal_type(src)?;
                            false
                        }
                        Some(Field::GoalValue) => {
                            let (value, closed) = read_goal_value(src)?;
                            draft.goal_value = Some(value);
                            closed
                        }
                        None => skip_value(src)?,
                    };
                    if closed {
                        return Ok(draft.finish());
                    }
                }
                // separators and stray bytes between fields
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::MAX_GOAL;
    use proptest::prelude::*;

    const SCENARIO: &[u8] = b"{\"character\":[0,1,2,3,4,5,6,7],\"obstacle\":[31,31,0,0,0,0,0,0],\"goalType\":\"obstacles\",\"goalValue\":5}";

    fn parse(bytes: &[u8]) -> Result<LevelConfig, ParseError> {
        ConfigParser::new().parse(&mut SliceSource::new(bytes))
    }

    #[test]
    fn test_scenario_frame() {
        let level = parse(SCENARIO).unwrap();
        assert_eq!(level.character, [0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(level.obstacle, [31, 31, 0, 0, 0, 0, 0, 0]);
        assert_eq!(level.goal_type, GoalType::ObstacleCount);
        assert_eq!(level.goal_value, 5);
        assert_eq!(level.loaded, LoadFlags::ALL);
        assert!(level.is_valid());
    }

    #[test]
    fn test_fields_in_any_order_with_spaces() {
        let frame = b"noise { \"goalValue\" : 42 , \"goalType\":\"time\", \
            \"obstacle\":[ 1, 2 ,3,4,5,6,7,8 ], \"character\":[8 7 6 5 4 3 2 1] }";
        let level = parse(frame).unwrap();
        assert_eq!(level.goal_type, GoalType::Time);
        assert_eq!(level.goal_value, 42);
        assert_eq!(level.obstacle, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(level.character, [8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_unknown_keys_skipped() {
        let frame = b"{\"name\":\"level one\",\"meta\":[[1,2],[3]],\"character\":[0,0,0,0,0,0,0,0],\
            \"obstacle\":[1,1,1,1,1,1,1,1],\"goalType\":\"t\",\"goalValue\":9,\"extra\":true}";
        let level = parse(frame).unwrap();
        assert_eq!(level.goal_type, GoalType::Time);
        assert_eq!(level.goal_value, 9);
    }

    #[test]
    fn test_goal_type_leading_char() {
        let frame = b"{\"character\":[0,0,0,0,0,0,0,0],\"obstacle\":[0,0,0,0,0,0,0,0],\
            \"goalType\":\"other\",\"goalValue\":3}";
        assert_eq!(parse(frame).unwrap().goal_type, GoalType::ObstacleCount);
    }

    #[test]
    fn test_empty_goal_type_not_loaded() {
        let frame = b"{\"character\":[0,0,0,0,0,0,0,0],\"obstacle\":[0,0,0,0,0,0,0,0],\
            \"goalType\":\"\",\"goalValue\":3}";
        assert_eq!(
            parse(frame),
            Err(ParseError::Invalid(LoadFlags {
                character: true,
                obstacle: true,
                goal: false,
            }))
        );
    }

    #[test]
    fn test_missing_field_reports_flags() {
        let frame = b"{\"character\":[0,0,0,0,0,0,0,0],\"goalType\":\"time\",\"goalValue\":3}";
        assert_eq!(
            parse(frame),
            Err(ParseError::Invalid(LoadFlags {
                character: true,
                obstacle: false,
                goal: true,
            }))
        );
    }

    fn with_goal(value: &str) -> Result<LevelConfig, ParseError> {
        let mut frame: heapless::String<160> = heapless::String::new();
        frame
            .push_str("{\"character\":[0,0,0,0,0,0,0,0],\"obstacle\":[0,0,0,0,0,0,0,0],\"goalType\":\"time\",\"goalValue\":")
            .unwrap();
        frame.push_str(value).unwrap();
        frame.push('}').unwrap();
        parse(frame.as_bytes())
    }

    #[test]
    fn test_goal_value_boundaries() {
        assert!(matches!(with_goal("0"), Err(ParseError::Invalid(_))));
        assert_eq!(with_goal("1").unwrap().goal_value, 1);
        assert_eq!(with_goal("9999").unwrap().goal_value, MAX_GOAL);
        assert!(matches!(with_goal("10000"), Err(ParseError::Invalid(_))));
    }

    #[test]
    fn test_goal_value_digits_truncated() {
        // Only five digits are kept; 123456 reads as 12345, still out of range
        assert!(matches!(with_goal("123456"), Err(ParseError::Invalid(_))));
        // Leading zeros count towards the scratch width
        assert!(matches!(with_goal("000007"), Err(ParseError::Invalid(_))));
        assert_eq!(with_goal("00007").unwrap().goal_value, 7);
    }

    #[test]
    fn test_glyph_scratch_wraps_and_truncates() {
        let frame = b"{\"character\":[300,2555,0,0,0,0,0,0],\"obstacle\":[0,0,0,0,0,0,0,0],\
            \"goalType\":\"time\",\"goalValue\":3}";
        let level = parse(frame).unwrap();
        // 300 wraps in the 8-bit scratch, 2555 keeps "255"
        assert_eq!(level.character[0], 44);
        assert_eq!(level.character[1], 255);
    }

    #[test]
    fn test_short_array_is_malformed() {
        let frame = b"{\"character\":[0,1,2],\"obstacle\":[0,0,0,0,0,0,0,0]}";
        assert_eq!(
            parse(frame),
            Err(ParseError::Malformed(MalformedKind::ShortArray))
        );
    }

    #[test]
    fn test_extra_array_values_ignored() {
        let frame = b"{\"character\":[1,2,3,4,5,6,7,8,9,10],\"obstacle\":[0,0,0,0,0,0,0,0],\
            \"goalType\":\"time\",\"goalValue\":3}";
        assert_eq!(parse(frame).unwrap().character, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_missing_colon_and_bracket() {
        assert_eq!(
            parse(b"{\"character\" [0]}"),
            Err(ParseError::Malformed(MalformedKind::MissingColon))
        );
        assert_eq!(
            parse(b"{\"character\":0}"),
            Err(ParseError::Malformed(MalformedKind::MissingArray))
        );
        assert_eq!(
            parse(b"{\"character\":[0,x]}"),
            Err(ParseError::Malformed(MalformedKind::MissingValue))
        );
    }

    #[test]
    fn test_truncated_frame_times_out() {
        assert_eq!(parse(b"{\"character\":[0,1,2"), Err(ParseError::TimedOut));
        assert_eq!(parse(b"garbage without a frame"), Err(ParseError::TimedOut));
    }

    #[test]
    fn test_resync_on_new_frame_start() {
        let mut bytes: heapless::Vec<u8, 256> = heapless::Vec::new();
        bytes
            .extend_from_slice(b"{\"character\":[0,1,2,")
            .unwrap();
        bytes.extend_from_slice(SCENARIO).unwrap();

        let mut parser = ConfigParser::new();
        let level = parser.parse(&mut SliceSource::new(&bytes)).unwrap();
        assert_eq!(level.goal_value, 5);
        assert_eq!(parser.resyncs(), 1);
    }

    #[test]
    fn test_parse_resumes_after_malformed_frame() {
        let mut bytes: heapless::Vec<u8, 256> = heapless::Vec::new();
        bytes.extend_from_slice(b"{\"character\":oops}").unwrap();
        bytes.extend_from_slice(SCENARIO).unwrap();

        let mut parser = ConfigParser::new();
        let mut src = SliceSource::new(&bytes);
        assert!(matches!(parser.parse(&mut src), Err(ParseError::Malformed(_))));
        assert_eq!(parser.parse(&mut src).unwrap().goal_value, 5);
        assert!(src.remaining().is_empty());
    }

    #[test]
    fn test_stops_at_frame_end() {
        let mut bytes: heapless::Vec<u8, 256> = heapless::Vec::new();
        bytes.extend_from_slice(SCENARIO).unwrap();
        bytes.extend_from_slice(b"tail").unwrap();

        let mut src = SliceSource::new(&bytes);
        ConfigParser::new().parse(&mut src).unwrap();
        assert_eq!(src.remaining(), b"tail");
    }

    fn goal_type_strategy() -> impl Strategy<Value = GoalType> {
        prop_oneof![Just(GoalType::Time), Just(GoalType::ObstacleCount)]
    }

    proptest! {
        #[test]
        fn prop_well_formed_frames_roundtrip(
            character in prop::array::uniform8(any::<u8>()),
            obstacle in prop::array::uniform8(any::<u8>()),
            goal_type in goal_type_strategy(),
            goal_value in 1..=MAX_GOAL,
        ) {
            let level = LevelConfig::new(character, obstacle, goal_type, goal_value);
            let frame = level.encode_frame().unwrap();
            let parsed = parse(frame.as_bytes()).unwrap();
            prop_assert_eq!(parsed, level);
        }

        #[test]
        fn prop_arbitrary_bytes_never_hang(bytes in prop::collection::vec(any::<u8>(), 0..300)) {
            // Must return (success or error) without reading past the input
            let mut src = SliceSource::new(&bytes);
            let _ = ConfigParser::new().parse(&mut src);
        }
    }
}
