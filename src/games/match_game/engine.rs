use crate::direction::{Direction, RandomSource};
use crate::error::GameError;
use crate::timer::TimerQueue;
use std::ops::Range;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const MIN_COUNT: u32 = 5;
pub const MAX_COUNT: u32 = 20;
pub const DEFAULT_COUNT: u32 = 5;
pub const MEMORIZE_DURATION: Duration = Duration::from_secs(5);

pub const TOP_RANGE: Range<f64> = 5.0..75.0;
pub const LEFT_RANGE: Range<f64> = 40.0..60.0;
pub const MIN_DISTANCE: f64 = 1.0;
pub const MAX_TILT: i32 = 20;

const PLACEMENT_ATTEMPTS: u32 = 256;
const MIN_RELAXED_DISTANCE: f64 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement
{
    pub top: f64,
    pub left: f64,
}

impl Placement
{
    pub fn distance(self, other: Placement) -> f64
    {
        (self.top - other.top).hypot(self.left - other.left)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchItem
{
    pub direction: Direction,
    pub position: Placement,
    pub tilt: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally([u32; 4]);

impl Tally
{
    pub fn get(&self, direction: Direction) -> u32
    {
        self.0[direction.index()]
    }

    pub fn set(&mut self, direction: Direction, value: u32)
    {
        self.0[direction.index()] = value;
    }

    pub fn total(&self) -> u32
    {
        self.0.iter().sum()
    }

    pub fn of_items(items: &[MatchItem]) -> Self
    {
        let mut tally = Tally::default();
        for item in items {
            tally.0[item.direction.index()] += 1;
        }
        tally
    }
}

impl From<[u32; 4]> for Tally
{
    fn from(counts: [u32; 4]) -> Self
    {
        Tally(counts)
    }
}

pub fn score(guess: &Tally, truth: &Tally) -> u32
{
    Direction::ALL
        .iter()
        .map(|&direction| guess.get(direction).min(truth.get(direction)))
        .sum()
}

/// After `PLACEMENT_ATTEMPTS` rejected draws for one item the distance is
/// halved for the rest of the set; once it drops under `MIN_RELAXED_DISTANCE`
/// every draw is accepted. Returns the distance actually enforced.
pub fn place_items(
    count: u32,
    rng: &mut impl RandomSource,
) -> (Vec<Placement>, f64)
{
    let mut placed: Vec<Placement> = Vec::with_capacity(count as usize);
    let mut min_distance = MIN_DISTANCE;

    for _ in 0..count {
        let mut attempts = 0;
        let candidate = loop {
            let candidate = Placement {
                top: rng.uniform(TOP_RANGE.start, TOP_RANGE.end),
                left: rng.uniform(LEFT_RANGE.start, LEFT_RANGE.end),
            };
            if min_distance < MIN_RELAXED_DISTANCE
                || placed.iter().all(|other| other.distance(candidate) >= min_distance)
            {
                break candidate;
            }
            attempts += 1;
            if attempts >= PLACEMENT_ATTEMPTS {
                attempts = 0;
                min_distance /= 2.0;
                warn!(min_distance, placed = placed.len(), "relaxing match spacing");
            }
        };
        placed.push(candidate);
    }

    (placed, min_distance)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchState
{
    Waiting,
    Memorize,
    Answer,
    Result,
}

impl MatchState
{
    pub fn label(self) -> &'static str
    {
        match self {
            MatchState::Waiting => "waiting",
            MatchState::Memorize => "memorizing",
            MatchState::Answer => "answering",
            MatchState::Result => "showing results",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MatchConfig
{
    pub count: u32,
    pub memorize_for: Duration,
}

impl MatchConfig
{
    pub fn with_count(count: u32) -> Result<Self, GameError>
    {
        check_count(count)?;
        Ok(Self {
            count,
            ..Self::default()
        })
    }
}

fn check_count(count: u32) -> Result<(), GameError>
{
    if (MIN_COUNT..=MAX_COUNT).contains(&count) {
        Ok(())
    } else {
        Err(GameError::CountOutOfRange {
            value: count,
            min: MIN_COUNT,
            max: MAX_COUNT,
        })
    }
}

impl Default for MatchConfig
{
    fn default() -> Self
    {
        Self {
            count: DEFAULT_COUNT,
            memorize_for: MEMORIZE_DURATION,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MatchTimer
{
    Hide,
}

pub struct MatchGame
{
    config: MatchConfig,
    state: MatchState,
    items: Vec<MatchItem>,
    answers: Tally,
    score: Option<u32>,
    round: u64,
    timers: TimerQueue<MatchTimer>,
}

impl MatchGame
{
    pub fn new(config: MatchConfig) -> Self
    {
        Self {
            config,
            state: MatchState::Waiting,
            items: Vec::new(),
            answers: Tally::default(),
            score: None,
            round: 0,
            timers: TimerQueue::new(),
        }
    }

    pub fn state(&self) -> MatchState
    {
        self.state
    }

    pub fn count(&self) -> u32
    {
        self.config.count
    }

    pub fn items(&self) -> &[MatchItem]
    {
        &self.items
    }

    pub fn answers(&self) -> &Tally
    {
        &self.answers
    }

    pub fn score(&self) -> Option<u32>
    {
        self.score
    }

    pub fn true_counts(&self) -> Tally
    {
        Tally::of_items(&self.items)
    }

    pub fn round(&self) -> u64
    {
        self.round
    }

    fn require(&self, action: &'static str, allowed: MatchState) -> Result<(), GameError>
    {
        if self.state == allowed {
            Ok(())
        } else {
            Err(GameError::InvalidAction {
                action,
                state: self.state.label(),
            })
        }
    }

    pub fn configure(&mut self, count: u32) -> Result<(), GameError>
    {
        self.require("change the match count", MatchState::Waiting)?;
        check_count(count)?;
        self.config.count = count;
        Ok(())
    }

    pub fn start_round(&mut self, now: Instant, rng: &mut impl RandomSource) -> Result<(), GameError>
    {
        self.require("start a round", MatchState::Waiting)?;

        let (placements, spacing) = place_items(self.config.count, rng);
        self.items = placements
            .into_iter()
            .map(|position| MatchItem {
                direction: rng.direction(),
                position,
                tilt: rng.int_inclusive(-MAX_TILT, MAX_TILT),
            })
            .collect();
        self.answers = Tally::default();
        self.score = None;
        self.state = MatchState::Memorize;
        self.timers.schedule_once(MatchTimer::Hide, self.round, now, self.config.memorize_for);
        info!(round = self.round, count = self.config.count, spacing, "matches laid out");
        Ok(())
    }

    pub fn tick(&mut self, now: Instant) -> bool
    {
        let before = self.state;
        while let Some(fired) = self.timers.pop_due(now) {
            if fired.round != self.round || self.state != MatchState::Memorize {
                debug!(fired_round = fired.round, round = self.round, "dropping stale timer");
                continue;
            }
            match fired.kind {
                MatchTimer::Hide => {
                    self.state = MatchState::Answer;
                    debug!(round = self.round, "matches hidden");
                }
            }
        }
        before != self.state
    }

    pub fn submit_answer(&mut self, direction: Direction, value: u32) -> Result<(), GameError>
    {
        self.require("answer", MatchState::Answer)?;
        if value > self.config.count {
            return Err(GameError::AnswerOutOfRange {
                value,
                max: self.config.count,
            });
        }
        self.answers.set(direction, value);
        Ok(())
    }

    pub fn check_answers(&mut self) -> Result<u32, GameError>
    {
        self.require("check answers", MatchState::Answer)?;
        let total = score(&self.answers, &self.true_counts());
        self.score = Some(total);
        self.state = MatchState::Result;
        info!(round = self.round, score = total, out_of = self.config.count, "round scored");
        Ok(total)
    }

    pub fn reset(&mut self)
    {
        self.timers.cancel_all();
        self.items.clear();
        self.answers = Tally::default();
        self.score = None;
        self.round += 1;
        self.state = MatchState::Waiting;
    }
}
