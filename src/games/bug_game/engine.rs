use crate::cue::{self, CuePlayer};
use crate::direction::{Direction, RandomSource};
use crate::error::GameError;
use crate::timer::{TimerId, TimerQueue};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const GRID_SIZE: i32 = 5;
pub const MAX_GRID_SIZE: i32 = 15;
pub const MOVE_INTERVAL: Duration = Duration::from_secs(2);
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position
{
    pub x: i32,
    pub y: i32,
}

impl Position
{
    pub fn center(grid_size: i32) -> Self
    {
        Self {
            x: grid_size / 2,
            y: grid_size / 2,
        }
    }

    pub fn is_off_grid(self, grid_size: i32) -> bool
    {
        self.x == -1 || self.x == grid_size || self.y == -1 || self.y == grid_size
    }

    pub fn step(self, direction: Direction, grid_size: i32) -> Self
    {
        let Position { x, y } = self;
        match direction {
            Direction::Up => Self { x, y: (y - 1).max(-1) },
            Direction::Down => Self {
                x,
                y: (y + 1).min(grid_size),
            },
            Direction::Left => Self { x: (x - 1).max(-1), y },
            Direction::Right => Self {
                x: (x + 1).min(grid_size),
                y,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BugState
{
    Waiting,
    Showing,
    Playing,
    Won,
    Lost,
}

impl BugState
{
    pub fn label(self) -> &'static str
    {
        match self {
            BugState::Waiting => "waiting",
            BugState::Showing => "showing",
            BugState::Playing => "playing",
            BugState::Won => "won",
            BugState::Lost => "lost",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BugConfig
{
    pub grid_size: i32,
    pub move_interval: Duration,
    pub confirm_timeout: Duration,
}

impl BugConfig
{
    pub fn with_grid_size(grid_size: i32) -> Result<Self, GameError>
    {
        if !(1..=MAX_GRID_SIZE).contains(&grid_size) {
            return Err(GameError::InvalidGridSize(grid_size));
        }
        Ok(Self {
            grid_size,
            ..Self::default()
        })
    }
}

impl Default for BugConfig
{
    fn default() -> Self
    {
        Self {
            grid_size: GRID_SIZE,
            move_interval: MOVE_INTERVAL,
            confirm_timeout: CONFIRM_TIMEOUT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BugTimer
{
    Move,
    Confirm,
}

pub struct BugGame
{
    config: BugConfig,
    state: BugState,
    position: Option<Position>,
    history: Vec<Direction>,
    last_move: Option<Direction>,
    awaiting_confirmation: bool,
    show_final: bool,
    round: u64,
    timers: TimerQueue<BugTimer>,
    move_timer: Option<TimerId>,
    confirm_timer: Option<TimerId>,
}

impl BugGame
{
    pub fn new(config: BugConfig) -> Self
    {
        Self {
            config,
            state: BugState::Waiting,
            position: None,
            history: Vec::new(),
            last_move: None,
            awaiting_confirmation: false,
            show_final: false,
            round: 0,
            timers: TimerQueue::new(),
            move_timer: None,
            confirm_timer: None,
        }
    }

    pub fn state(&self) -> BugState
    {
        self.state
    }

    pub fn position(&self) -> Option<Position>
    {
        self.position
    }

    pub fn history(&self) -> &[Direction]
    {
        &self.history
    }

    pub fn last_move(&self) -> Option<Direction>
    {
        self.last_move
    }

    pub fn grid_size(&self) -> i32
    {
        self.config.grid_size
    }

    pub fn is_awaiting_confirmation(&self) -> bool
    {
        self.awaiting_confirmation
    }

    pub fn shows_final_grid(&self) -> bool
    {
        self.show_final
    }

    pub fn round(&self) -> u64
    {
        self.round
    }

    fn require(&self, action: &'static str, allowed: &[BugState]) -> Result<(), GameError>
    {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(GameError::InvalidAction {
                action,
                state: self.state.label(),
            })
        }
    }

    pub fn start(&mut self) -> Result<(), GameError>
    {
        self.require("start", &[BugState::Waiting])?;
        let center = Position::center(self.config.grid_size);
        self.position = Some(center);
        self.state = BugState::Showing;
        info!(round = self.round, x = center.x, y = center.y, "bug placed");
        Ok(())
    }

    pub fn start_playing(&mut self, now: Instant) -> Result<(), GameError>
    {
        self.require("start playing", &[BugState::Showing])?;
        self.state = BugState::Playing;
        self.move_timer = Some(self.timers.schedule_every(
            BugTimer::Move,
            self.round,
            now,
            self.config.move_interval,
        ));
        Ok(())
    }

    // True when the state or position changed.
    pub fn tick(
        &mut self,
        now: Instant,
        rng: &mut impl RandomSource,
        cue: &mut dyn CuePlayer,
    ) -> bool
    {
        let before = (self.state, self.position);
        while let Some(fired) = self.timers.pop_due(now) {
            if fired.round != self.round || self.state != BugState::Playing {
                debug!(fired_round = fired.round, round = self.round, "dropping stale timer");
                continue;
            }
            match fired.kind {
                BugTimer::Move => self.move_step(now, rng, cue),
                BugTimer::Confirm => {
                    self.confirm_timer = None;
                    self.awaiting_confirmation = false;
                    info!(round = self.round, "escape went unnoticed");
                    self.finish(BugState::Lost);
                }
            }
        }
        before != (self.state, self.position)
    }

    fn move_step(&mut self, now: Instant, rng: &mut impl RandomSource, cue: &mut dyn CuePlayer)
    {
        if self.awaiting_confirmation {
            return;
        }
        let Some(position) = self.position else {
            return;
        };

        let grid_size = self.config.grid_size;
        if position.is_off_grid(grid_size) {
            self.awaiting_confirmation = true;
            self.confirm_timer = Some(self.timers.schedule_once(
                BugTimer::Confirm,
                self.round,
                now,
                self.config.confirm_timeout,
            ));
            debug!(x = position.x, y = position.y, "bug escaped, waiting for the player");
            return;
        }

        let direction = rng.direction();
        let next = position.step(direction, grid_size);
        self.history.push(direction);
        self.last_move = Some(direction);
        self.position = Some(next);
        debug!(%direction, x = next.x, y = next.y, "bug moved");
        cue::play_logged(cue, direction);
    }

    pub fn signal_escape(&mut self) -> Result<BugState, GameError>
    {
        self.require("signal an escape", &[BugState::Playing])?;
        if let Some(id) = self.confirm_timer.take() {
            self.timers.cancel(id);
        }
        self.awaiting_confirmation = false;

        let escaped = self
            .position
            .is_some_and(|position| position.is_off_grid(self.config.grid_size));
        let outcome = if escaped { BugState::Won } else { BugState::Lost };
        info!(round = self.round, outcome = outcome.label(), "escape called");
        self.finish(outcome);
        Ok(outcome)
    }

    fn finish(&mut self, outcome: BugState)
    {
        if let Some(id) = self.move_timer.take() {
            self.timers.cancel(id);
        }
        self.state = outcome;
        self.show_final = true;
    }

    pub fn replay(&mut self) -> Result<(), GameError>
    {
        self.require("replay", &[BugState::Won, BugState::Lost])?;
        self.timers.cancel_all();
        self.move_timer = None;
        self.confirm_timer = None;
        self.awaiting_confirmation = false;
        self.position = None;
        self.history.clear();
        self.last_move = None;
        self.show_final = false;
        self.round += 1;
        self.state = BugState::Waiting;
        Ok(())
    }
}
