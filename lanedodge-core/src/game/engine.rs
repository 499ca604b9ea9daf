//! Game engine
//!
//! One [`GameEngine::tick`] per main-loop iteration while playing:
//!
//! 1. Sample lane inputs (debounced, mutually exclusive)
//! 2. Advance the spawner
//! 3. Snapshot the column about to reach the player
//! 4. Scroll the playfield left
//! 5. Resolve collision or dodge from the snapshot
//! 6. Evaluate the goal
//!
//! Rendering is separate ([`GameEngine::render`]) so the logic stays
//! testable without a display.

use lanedodge_protocol::{GoalType, LevelConfig, RoundVerdict};

use crate::config::{GameConfig, HUD_DIGITS};
use crate::traits::{DisplayAdapter, DisplayError, DisplayExt, OBSTACLE_SLOT, PLAYER_SLOT};

use super::playfield::{Cell, Lane, Playfield};
use super::rng::Lcg;
use super::telemetry::Telemetry;

/// Trailing columns that must be empty before a spawn
const SPAWN_CLEARANCE: u8 = 2;

/// Lane-select buttons sampled for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LaneInputs {
    pub top: bool,
    pub bottom: bool,
}

impl LaneInputs {
    pub const NONE: Self = Self {
        top: false,
        bottom: false,
    };
    pub const TOP: Self = Self {
        top: true,
        bottom: false,
    };
    pub const BOTTOM: Self = Self {
        top: false,
        bottom: true,
    };

    /// Lane asked for, if exactly one button is down
    pub fn requested(&self) -> Option<Lane> {
        match (self.top, self.bottom) {
            (true, false) => Some(Lane::Top),
            (false, true) => Some(Lane::Bottom),
            _ => None,
        }
    }
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    Continue,
    Collision,
    GoalReached,
}

/// Scrolling two-lane game
#[derive(Debug, Clone)]
pub struct GameEngine {
    config: GameConfig,
    playfield: Playfield,
    lane: Lane,
    goal_type: GoalType,
    goal_value: u16,
    debounce: u8,
    countdown: u8,
    tick: u32,
    rng: Lcg,
    telemetry: Telemetry,
}

impl GameEngine {
    /// Create an idle engine
    pub fn new(config: GameConfig) -> Self {
        Self {
            playfield: Playfield::new(config.playfield.width),
            lane: config.playfield.start_lane,
            goal_type: GoalType::Time,
            goal_value: 0,
            debounce: 0,
            countdown: 0,
            tick: 0,
            rng: Lcg::new(1),
            telemetry: Telemetry::default(),
            config,
        }
    }

    /// Reset everything for a new round of `level`
    pub fn start(&mut self, level: &LevelConfig, seed: u32) {
        self.playfield.clear();
        self.lane = self.config.playfield.start_lane;
        self.goal_type = level.goal_type;
        self.goal_value = level.goal_value;
        self.debounce = 0;
        self.tick = 0;
        self.rng = Lcg::new(seed);
        self.countdown = self.next_countdown();
        self.telemetry.reset();
    }

    /// Advance the game by one tick
    ///
    /// `elapsed_seconds` comes from the round clock.
    pub fn tick(&mut self, inputs: LaneInputs, elapsed_seconds: u16) -> TickOutcome {
        self.tick = self.tick.wrapping_add(1);
        self.telemetry.record_seconds(elapsed_seconds);
        let player_col = self.config.playfield.player_column;

        if self.debounce > 0 {
            self.debounce -= 1;
        } else if let Some(target) = inputs.requested() {
            if target != self.lane {
                self.lane = target;
                self.debounce = self.config.input.debounce_ticks;
                if self.playfield.get(target, player_col) == Cell::Obstacle {
                    return TickOutcome::Collision;
                }
            }
        }

        self.advance_spawner();

        // Resolve against the column before it scrolls into the player
        let ahead = self.playfield.column(player_col + 1);
        self.playfield.shift_left();

        if ahead.get(self.lane) == Cell::Obstacle {
            return TickOutcome::Collision;
        }
        if ahead.get(self.lane.other()) == Cell::Obstacle {
            self.telemetry.record_dodge();
        }

        if self.goal_reached() {
            TickOutcome::GoalReached
        } else {
            TickOutcome::Continue
        }
    }

    fn advance_spawner(&mut self) {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 || !self.playfield.trailing_clear(SPAWN_CLEARANCE) {
            return;
        }

        let lane = if self
            .rng
            .chance(self.config.spawn.top_lane_percent, self.tick)
        {
            Lane::Top
        } else {
            Lane::Bottom
        };
        let last = self.playfield.width() - 1;
        self.playfield.set(lane, last, Cell::Obstacle);
        self.countdown = self.next_countdown();
    }

    fn next_countdown(&mut self) -> u8 {
        let spawn = &self.config.spawn;
        self.rng.range(spawn.min_ticks, spawn.max_ticks, self.tick)
    }

    fn goal_reached(&self) -> bool {
        let progress = match self.goal_type {
            GoalType::ObstacleCount => self.telemetry.obstacles_dodged,
            GoalType::Time => self.telemetry.elapsed_seconds,
        };
        progress >= self.goal_value
    }

    /// Freeze telemetry with the round's verdict
    pub fn finish(&mut self, verdict: RoundVerdict, elapsed_seconds: u16) -> Telemetry {
        self.telemetry.seal(verdict, elapsed_seconds);
        self.telemetry
    }

    /// Draw both lanes and the HUD
    pub fn render<D: DisplayAdapter + ?Sized>(&self, display: &mut D) -> Result<(), DisplayError> {
        let player_col = self.config.playfield.player_column;
        for lane in [Lane::Top, Lane::Bottom] {
            display.set_cursor(0, lane.row())?;
            for col in 0..self.playfield.width() {
                let code = if lane == self.lane && col == player_col {
                    PLAYER_SLOT
                } else if self.playfield.get(lane, col) == Cell::Obstacle {
                    OBSTACLE_SLOT
                } else {
                    b' '
                };
                display.write_glyph(code)?;
            }
        }

        let hud = self.config.hud_column();
        display.write_number(hud, 0, self.telemetry.obstacles_dodged, HUD_DIGITS)?;
        display.write_number(hud, 1, self.telemetry.elapsed_seconds, HUD_DIGITS)
    }

    /// Lane the player is in
    pub fn lane(&self) -> Lane {
        self.lane
    }

    /// Current obstacles
    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    /// Round telemetry so far
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Ticks since the round started
    pub fn ticks(&self) -> u32 {
        self.tick
    }

    #[cfg(test)]
    pub(crate) fn playfield_mut(&mut self) -> &mut Playfield {
        &mut self.playfield
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Outcome;
    use crate::traits::display::mock::MockDisplay;
    use proptest::prelude::*;

    const PLAYER: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
    const BLOCK: [u8; 8] = [31, 31, 0, 0, 0, 0, 0, 0];

    fn level(goal_type: GoalType, goal: u16) -> LevelConfig {
        LevelConfig::new(PLAYER, BLOCK, goal_type, goal)
    }

    fn engine(goal_type: GoalType, goal: u16) -> GameEngine {
        let mut engine = GameEngine::new(GameConfig::default());
        engine.start(&level(goal_type, goal), 42);
        engine
    }

    #[test]
    fn test_start_resets_round() {
        let e = engine(GoalType::ObstacleCount, 5);
        assert_eq!(e.lane(), Lane::Top);
        assert_eq!(e.ticks(), 0);
        assert_eq!(e.playfield().obstacle_count(), 0);
        assert!(e.telemetry().active);
        assert_eq!(e.telemetry().outcome, Outcome::Pending);
    }

    #[test]
    fn test_obstacle_in_player_lane_collides() {
        let mut e = engine(GoalType::ObstacleCount, 5);
        e.playfield_mut().set(Lane::Top, 2, Cell::Obstacle);
        assert_eq!(e.tick(LaneInputs::NONE, 0), TickOutcome::Collision);
    }

    #[test]
    fn test_obstacle_in_other_lane_is_dodged() {
        let mut e = engine(GoalType::ObstacleCount, 5);
        e.playfield_mut().set(Lane::Bottom, 2, Cell::Obstacle);
        assert_eq!(e.tick(LaneInputs::NONE, 0), TickOutcome::Continue);
        assert_eq!(e.telemetry().obstacles_dodged, 1);
        // It has scrolled into the player column and is counted only once
        assert_eq!(e.playfield().get(Lane::Bottom, 1), Cell::Obstacle);
        assert_eq!(e.tick(LaneInputs::NONE, 0), TickOutcome::Continue);
        assert_eq!(e.telemetry().obstacles_dodged, 1);
    }

    #[test]
    fn test_switching_lane_avoids_collision() {
        let mut e = engine(GoalType::ObstacleCount, 1);
        e.playfield_mut().set(Lane::Top, 2, Cell::Obstacle);
        assert_eq!(e.tick(LaneInputs::BOTTOM, 0), TickOutcome::GoalReached);
        assert_eq!(e.lane(), Lane::Bottom);
        assert_eq!(e.telemetry().obstacles_dodged, 1);
    }

    #[test]
    fn test_moving_into_obstacle_collides() {
        let mut e = engine(GoalType::ObstacleCount, 5);
        e.playfield_mut().set(Lane::Bottom, 1, Cell::Obstacle);
        assert_eq!(e.tick(LaneInputs::BOTTOM, 0), TickOutcome::Collision);
    }

    #[test]
    fn test_both_inputs_ignored() {
        let mut e = engine(GoalType::ObstacleCount, 5);
        let both = LaneInputs {
            top: true,
            bottom: true,
        };
        e.tick(both, 0);
        assert_eq!(e.lane(), Lane::Top);
    }

    #[test]
    fn test_debounce_suppresses_moves() {
        let mut e = engine(GoalType::ObstacleCount, 5);
        e.tick(LaneInputs::BOTTOM, 0);
        assert_eq!(e.lane(), Lane::Bottom);
        // debounce_ticks = 2
        e.tick(LaneInputs::TOP, 0);
        e.tick(LaneInputs::TOP, 0);
        assert_eq!(e.lane(), Lane::Bottom);
        e.tick(LaneInputs::TOP, 0);
        assert_eq!(e.lane(), Lane::Top);
    }

    #[test]
    fn test_time_goal() {
        let mut e = engine(GoalType::Time, 3);
        assert_eq!(e.tick(LaneInputs::NONE, 2), TickOutcome::Continue);
        assert_eq!(e.tick(LaneInputs::NONE, 3), TickOutcome::GoalReached);
        assert_eq!(e.telemetry().elapsed_seconds, 3);
    }

    #[test]
    fn test_spawner_fills_trailing_column() {
        let mut e = engine(GoalType::Time, 100);
        // First spawn happens within max_ticks; it cannot reach the player yet
        for _ in 0..8 {
            assert_eq!(e.tick(LaneInputs::NONE, 0), TickOutcome::Continue);
        }
        assert!(e.playfield().obstacle_count() >= 1);
    }

    #[test]
    fn test_finish_seals_telemetry() {
        let mut e = engine(GoalType::ObstacleCount, 5);
        e.playfield_mut().set(Lane::Bottom, 2, Cell::Obstacle);
        e.tick(LaneInputs::NONE, 1);
        let t = e.finish(RoundVerdict::Lose, 4);
        assert_eq!(t.outcome, Outcome::Lose);
        assert_eq!(t.obstacles_dodged, 1);
        assert_eq!(t.elapsed_seconds, 4);
        assert!(!t.active);
    }

    #[test]
    fn test_render_playfield_and_hud() {
        let mut e = engine(GoalType::ObstacleCount, 5);
        e.playfield_mut().set(Lane::Bottom, 5, Cell::Obstacle);
        let mut display = MockDisplay::new();
        e.render(&mut display).unwrap();
        assert_eq!(display.row(0)[1], PLAYER_SLOT);
        assert_eq!(display.row(1)[5], OBSTACLE_SLOT);
        assert_eq!(display.row(1)[1], b' ');
        assert_eq!(&display.row(0)[12..16], b"0000");
        assert_eq!(&display.row(1)[12..16], b"0000");
    }

    /// Inputs for a tick derived from a script value
    fn scripted(step: u8) -> LaneInputs {
        match step % 4 {
            0 => LaneInputs::TOP,
            1 => LaneInputs::BOTTOM,
            _ => LaneInputs::NONE,
        }
    }

    fn play(seed: u32, script: &[u8]) -> (Vec<Lane>, TickOutcome, u32, u16) {
        let mut e = GameEngine::new(GameConfig::default());
        e.start(&level(GoalType::ObstacleCount, 20), seed);
        let mut lanes = Vec::new();
        let mut outcome = TickOutcome::Continue;
        for &step in script {
            outcome = e.tick(scripted(step), 0);
            lanes.push(e.lane());
            if outcome != TickOutcome::Continue {
                break;
            }
        }
        (lanes, outcome, e.ticks(), e.telemetry().obstacles_dodged)
    }

    proptest! {
        #[test]
        fn prop_same_seed_same_round(seed in any::<u32>(), script in prop::collection::vec(any::<u8>(), 1..300)) {
            prop_assert_eq!(play(seed, &script), play(seed, &script));
        }

        #[test]
        fn prop_spawn_spacing(seed in any::<u32>(), script in prop::collection::vec(any::<u8>(), 1..300)) {
            let mut e = GameEngine::new(GameConfig::default());
            e.start(&level(GoalType::Time, 9999), seed);
            let width = e.playfield().width();
            for &step in &script {
                let outcome = e.tick(scripted(step), 0);
                let pf = e.playfield();
                // The trailing column is always emptied by the scroll
                prop_assert!(pf.column(width - 1).is_clear());
                // At most one obstacle per column, never two adjacent columns
                for col in 0..width {
                    let c = pf.column(col);
                    prop_assert!(!(c.top == Cell::Obstacle && c.bottom == Cell::Obstacle));
                    if col + 1 < width && !c.is_clear() {
                        prop_assert!(pf.column(col + 1).is_clear());
                    }
                }
                if outcome != TickOutcome::Continue {
                    break;
                }
            }
        }
    }
}
