use rand::Rng;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction
{
    Up,
    Down,
    Left,
    Right,
}

impl Direction
{
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn index(self) -> usize
    {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    pub fn label(self) -> &'static str
    {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn arrow(self) -> char
    {
        match self {
            Direction::Up => '↑',
            Direction::Down => '↓',
            Direction::Left => '←',
            Direction::Right => '→',
        }
    }
}

impl fmt::Display for Direction
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.label())
    }
}

pub trait RandomSource
{
    fn direction(&mut self) -> Direction;

    fn uniform(&mut self, low: f64, high: f64) -> f64;

    fn int_inclusive(&mut self, low: i32, high: i32) -> i32;
}

impl<R: Rng> RandomSource for R
{
    fn direction(&mut self) -> Direction
    {
        Direction::ALL[self.gen_range(0..Direction::ALL.len())]
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64
    {
        if high <= low {
            return low;
        }
        self.gen_range(low..high)
    }

    fn int_inclusive(&mut self, low: i32, high: i32) -> i32
    {
        if high <= low {
            return low;
        }
        self.gen_range(low..=high)
    }
}

#[cfg(test)]
pub mod testing
{
    use super::{Direction, RandomSource};
    use std::collections::VecDeque;

    #[derive(Default)]
    pub struct Scripted
    {
        pub directions: VecDeque<Direction>,
        pub uniforms: VecDeque<f64>,
    }

    impl Scripted
    {
        pub fn directions(seq: &[Direction]) -> Self
        {
            Self {
                directions: seq.iter().copied().collect(),
                uniforms: VecDeque::new(),
            }
        }
    }

    impl RandomSource for Scripted
    {
        fn direction(&mut self) -> Direction
        {
            self.directions.pop_front().unwrap_or(Direction::Up)
        }

        fn uniform(&mut self, low: f64, high: f64) -> f64
        {
            self.uniforms
                .pop_front()
                .map(|value| value.clamp(low, high))
                .unwrap_or(low)
        }

        fn int_inclusive(&mut self, low: i32, _high: i32) -> i32
        {
            low
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn index_matches_all_order()
    {
        for (idx, direction) in Direction::ALL.iter().enumerate() {
            assert_eq!(direction.index(), idx);
        }
    }

    #[test]
    fn rng_draws_every_direction()
    {
        let mut rng = ChaCha8Rng::seed_from_u64(12345);
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[rng.direction().index()] = true;
        }
        assert!(seen.iter().all(|&hit| hit), "missing direction: {seen:?}");
    }

    #[test]
    fn uniform_stays_in_range()
    {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let value = rng.uniform(5.0, 75.0);
            assert!((5.0..75.0).contains(&value));
        }
        assert_eq!(rng.uniform(3.0, 3.0), 3.0);
    }

    #[test]
    fn seeded_draws_are_reproducible()
    {
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        let first: Vec<Direction> = (0..32).map(|_| a.direction()).collect();
        let second: Vec<Direction> = (0..32).map(|_| b.direction()).collect();
        assert_eq!(first, second);
    }
}
