use crate::direction::Direction;
use crate::error::GameError;
use std::io::{self, Write};

pub trait CuePlayer
{
    fn play(&mut self, direction: Direction) -> Result<(), GameError>;
}

pub struct TerminalBell<W: Write>
{
    out: W,
}

impl TerminalBell<io::Stdout>
{
    pub fn stdout() -> Self
    {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalBell<W>
{
    pub fn new(out: W) -> Self
    {
        Self { out }
    }
}

impl<W: Write> CuePlayer for TerminalBell<W>
{
    fn play(&mut self, direction: Direction) -> Result<(), GameError>
    {
        tracing::trace!(%direction, "bell cue");
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }
}

pub struct Silent;

impl CuePlayer for Silent
{
    fn play(&mut self, _direction: Direction) -> Result<(), GameError>
    {
        Ok(())
    }
}

pub fn play_logged(cue: &mut dyn CuePlayer, direction: Direction)
{
    if let Err(err) = cue.play(direction) {
        tracing::warn!(%direction, "cue playback failed: {err}");
    }
}
