//! Controller context
//!
//! Owns every piece of main-loop state (level, engine, reporter, display,
//! state machine) and borrows the two objects shared with event handlers:
//! the [`Transport`] and the [`Clock`]. One [`Controller::poll`] is one
//! main-loop iteration.
//!
//! ```text
//!  WaitingConfig ──ConfigLoaded──▶ Initializing ──SetupComplete──▶ Playing
//!        ▲                                                        │
//!        └────────ReportSent──── RoundEnd(Win|Lose) ◀─Collision/GoalReached
//! ```

use embedded_io::Write;
use lanedodge_protocol::glyph::{difference_percent, distinct_enough, is_blank};
use lanedodge_protocol::{ConfigParser, LevelConfig, ParseError};

use crate::clock::Clock;
use crate::config::GameConfig;
use crate::game::{GameEngine, LaneInputs, Telemetry, TickOutcome};
use crate::report::{ReportError, Reporter};
use crate::state::{Event, State};
use crate::traits::{
    BlinkPattern, DisplayAdapter, DisplayError, DisplayExt, OBSTACLE_SLOT, PLAYER_SLOT,
};
use crate::transport::{CancelFlag, Deadline, Transport, TransportSource};

/// Errors that abort the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    Display(DisplayError),
    Report(ReportError),
}

impl From<DisplayError> for ControllerError {
    fn from(e: DisplayError) -> Self {
        ControllerError::Display(e)
    }
}

impl From<ReportError> for ControllerError {
    fn from(e: ReportError) -> Self {
        ControllerError::Report(e)
    }
}

/// Accepted level plus glyph advisories
///
/// The advisories never reject a frame; they are surfaced for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadSummary {
    pub level: LevelConfig,
    /// Share of visible pixels that differ between the two glyphs
    pub difference_percent: u8,
    pub character_blank: bool,
    pub obstacle_blank: bool,
}

impl LoadSummary {
    fn new(level: &LevelConfig) -> Self {
        Self {
            level: *level,
            difference_percent: difference_percent(&level.character, &level.obstacle),
            character_blank: is_blank(&level.character),
            obstacle_blank: is_blank(&level.obstacle),
        }
    }

    /// Whether the player and obstacle are easy to tell apart
    pub fn glyphs_distinct(&self) -> bool {
        distinct_enough(&self.level.character, &self.level.obstacle)
    }
}

/// What one main-loop iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Poll {
    /// Waiting, no complete frame buffered
    Idle,
    /// Frame accepted; the round has started
    Loaded(LoadSummary),
    /// Frame scan failed
    Rejected(ParseError),
    /// One game tick ran
    Ticked,
    /// The round ended and its result was reported
    RoundOver(Telemetry),
}

/// Main-loop context
pub struct Controller<'a, const N: usize, W: Write, D: DisplayAdapter> {
    transport: &'a Transport<N>,
    clock: &'a Clock,
    config: GameConfig,
    level: LevelConfig,
    parser: ConfigParser,
    engine: GameEngine,
    reporter: Reporter<W>,
    display: D,
    state: State,
}

impl<'a, const N: usize, W: Write, D: DisplayAdapter> Controller<'a, N, W, D> {
    /// Create a controller waiting for its first level
    pub fn new(
        transport: &'a Transport<N>,
        clock: &'a Clock,
        config: GameConfig,
        link: W,
        display: D,
    ) -> Self {
        Self {
            transport,
            clock,
            config,
            level: LevelConfig::default(),
            parser: ConfigParser::new(),
            engine: GameEngine::new(config),
            reporter: Reporter::new(link),
            display,
            state: State::default(),
        }
    }

    /// Send the ready banner and draw the idle screen
    pub fn announce(&mut self) -> Result<(), ControllerError> {
        self.reporter.ready()?;
        self.draw_idle()?;
        Ok(())
    }

    fn draw_idle(&mut self) -> Result<(), DisplayError> {
        self.display.clear()?;
        self.display.write_text(0, 0, "LANEDODGE")?;
        self.display.write_text(0, 1, "SEND LEVEL")
    }

    /// Run one main-loop iteration
    ///
    /// While waiting, a frame is scanned only once a closing brace is
    /// buffered, and the scan is bounded by `deadline` and `cancel`.
    /// While playing, one game tick runs. A round that ends is reported
    /// within the same call. `seed` seeds the spawner if a round starts.
    ///
    /// Any error stops the clock and returns the controller to waiting.
    pub fn poll<Dl: Deadline>(
        &mut self,
        inputs: LaneInputs,
        seed: u32,
        deadline: Dl,
        cancel: &CancelFlag,
    ) -> Result<Poll, ControllerError> {
        let result = match self.state {
            State::WaitingConfig => self.poll_config(seed, deadline, cancel),
            State::Playing => self.play_tick(inputs),
            // Entered and left within a single poll; only seen after a failure
            State::Initializing | State::RoundEnd(_) => {
                self.abort();
                Ok(Poll::Idle)
            }
        };
        if result.is_err() {
            self.abort();
        }
        result
    }

    fn poll_config<Dl: Deadline>(
        &mut self,
        seed: u32,
        deadline: Dl,
        cancel: &CancelFlag,
    ) -> Result<Poll, ControllerError> {
        if !self.transport.contains(b'}') {
            // A full ring without a frame end would never drain
            if self.transport.len() >= self.transport.capacity() {
                self.transport.discard_before_last(b'{');
            }
            return Ok(Poll::Idle);
        }

        let mut source = TransportSource::new(self.transport, deadline, cancel);
        match self.parser.parse(&mut source) {
            Ok(level) => {
                self.level = level;
                self.reporter.loaded(&self.level)?;
                self.transport.reset();
                self.state = self.state.transition(Event::ConfigLoaded);
                self.begin_round(seed)?;
                Ok(Poll::Loaded(LoadSummary::new(&self.level)))
            }
            Err(ParseError::Cancelled) => Ok(Poll::Rejected(ParseError::Cancelled)),
            Err(ParseError::TimedOut) => {
                self.transport.reset();
                self.reporter.load_error()?;
                Ok(Poll::Rejected(ParseError::TimedOut))
            }
            Err(e) => {
                if let ParseError::Malformed(_) = e {
                    self.discard_frame_rest();
                }
                self.reporter.load_error()?;
                Ok(Poll::Rejected(e))
            }
        }
    }

    /// Drop the remainder of a malformed frame, stopping before the next one
    fn discard_frame_rest(&mut self) {
        while let Some(byte) = self.transport.peek() {
            if byte == b'{' {
                break;
            }
            self.transport.try_pop();
            if byte == b'}' {
                break;
            }
        }
    }

    fn begin_round(&mut self, seed: u32) -> Result<(), ControllerError> {
        self.display.clear()?;
        self.display.load_glyph(PLAYER_SLOT, &self.level.character)?;
        self.display.load_glyph(OBSTACLE_SLOT, &self.level.obstacle)?;
        self.engine.start(&self.level, seed);
        self.clock.start();
        self.engine.render(&mut self.display)?;
        self.state = self.state.transition(Event::SetupComplete);
        Ok(())
    }

    fn play_tick(&mut self, inputs: LaneInputs) -> Result<Poll, ControllerError> {
        let seconds = self.clock.elapsed_seconds(self.config.clock.tick_hz);
        let outcome = self.engine.tick(inputs, seconds);
        self.engine.render(&mut self.display)?;

        let event = match outcome {
            TickOutcome::Continue => return Ok(Poll::Ticked),
            TickOutcome::Collision => Event::Collision,
            TickOutcome::GoalReached => Event::GoalReached,
        };
        self.state = self.state.transition(event);
        self.finish_round()
    }

    fn finish_round(&mut self) -> Result<Poll, ControllerError> {
        let State::RoundEnd(verdict) = self.state else {
            return Ok(Poll::Ticked);
        };

        self.clock.stop();
        let seconds = self.clock.elapsed_seconds(self.config.clock.tick_hz);
        let telemetry = self.engine.finish(verdict, seconds);

        self.engine.render(&mut self.display)?;
        self.display.blink(BlinkPattern {
            flashes: self.config.display.flourish_flashes,
            period_ms: self.config.display.flourish_period_ms,
        })?;
        self.reporter.round_result(&telemetry)?;

        // Frames sent during the round are not for the next one
        self.transport.reset();
        self.state = self.state.transition(Event::ReportSent);
        Ok(Poll::RoundOver(telemetry))
    }

    fn abort(&mut self) {
        self.clock.stop();
        self.state = self.state.transition(Event::Abort);
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Last accepted level (zeroed and invalid before the first one)
    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    /// Game configuration in use
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The game engine
    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Frames abandoned because a new one started mid-frame
    pub fn resyncs(&self) -> u32 {
        self.parser.resyncs()
    }

    /// The display adapter
    pub fn display(&self) -> &D {
        &self.display
    }

    /// The outbound link
    pub fn link(&self) -> &W {
        self.reporter.link()
    }
}
