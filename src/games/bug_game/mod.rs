pub mod engine;

use crate::cue::CuePlayer;
use crate::error::GameError;
use crate::terminal::{self, TerminalGuard, TICK_MS};
use crossterm::event::KeyCode;
use engine::{BugConfig, BugGame, BugState, Position};
use rand::thread_rng;
use std::time::{Duration, Instant};

pub fn run(config: BugConfig, cue: &mut dyn CuePlayer) -> Result<(), GameError>
{
    let mut term = TerminalGuard::enter()?;
    let mut rng = thread_rng();
    let mut game = BugGame::new(config);
    let mut message: Option<String> = None;
    let mut last_draw: Option<Instant> = None;

    loop {
        for key in terminal::pending_keys()? {
            if terminal::is_quit(&key) {
                return Ok(());
            }
            match handle_key(&mut game, key.code, Instant::now()) {
                Ok(()) => message = None,
                Err(err) => message = Some(err.to_string()),
            }
        }

        let changed = game.tick(Instant::now(), &mut rng, cue);

        let due = last_draw.is_none_or(|at| at.elapsed() >= Duration::from_millis(TICK_MS));
        if changed || due {
            term.draw(&frame(&game, message.as_deref()))?;
            last_draw = Some(Instant::now());
        }

        std::thread::sleep(Duration::from_millis(1));
    }
}

fn handle_key(game: &mut BugGame, code: KeyCode, now: Instant) -> Result<(), GameError>
{
    match (code, game.state()) {
        (KeyCode::Enter, BugState::Waiting) => game.start(),
        (KeyCode::Enter, BugState::Showing) => game.start_playing(now),
        (KeyCode::Enter, BugState::Won | BugState::Lost) => game.replay(),
        (KeyCode::Char(' '), BugState::Playing) => game.signal_escape().map(|_| ()),
        _ => Ok(()),
    }
}

fn frame(game: &BugGame, message: Option<&str>) -> Vec<String>
{
    let mut lines = vec!["Memory Games - The Bug Game".to_string(), String::new()];

    match game.state() {
        BugState::Waiting => {
            lines.push("A bug sits in the middle of the grid. Keep track of it".to_string());
            lines.push("with your eyes closed and call out when it leaves.".to_string());
            lines.push(String::new());
            lines.push("Press ENTER to start.".to_string());
        }
        BugState::Showing => {
            lines.push("Memorize the bug's position, then close your eyes!".to_string());
            lines.push(String::new());
            lines.extend(render_grid(game.position(), game.grid_size()));
            lines.push(String::new());
            lines.push("Press ENTER to start playing.".to_string());
        }
        BugState::Playing => {
            let moved = game
                .last_move()
                .map(|direction| format!("The bug moved: {} {}", direction.arrow(), direction))
                .unwrap_or_else(|| "The bug is about to move...".to_string());
            lines.push(moved);
            lines.push(format!("Moves so far: {}", game.history().len()));
            lines.push(String::new());
            lines.push("Press SPACE when the bug has escaped!".to_string());
        }
        BugState::Won | BugState::Lost => {
            lines.push(if game.state() == BugState::Won {
                "You won!".to_string()
            } else {
                "You lost!".to_string()
            });
            if game.shows_final_grid() {
                lines.push(String::new());
                lines.push("Final bug position:".to_string());
                lines.extend(render_grid(game.position(), game.grid_size()));
            }
            lines.push(String::new());
            lines.push(format!("Moves: {}", describe_moves(game)));
            lines.push(String::new());
            lines.push("Press ENTER to play again.".to_string());
        }
    }

    if let Some(message) = message {
        lines.push(String::new());
        lines.push(message.to_string());
    }
    lines.push("ESC to quit".to_string());
    lines
}

fn describe_moves(game: &BugGame) -> String
{
    if game.history().is_empty() {
        return "none".to_string();
    }
    game.history()
        .iter()
        .map(|direction| direction.arrow().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_grid(position: Option<Position>, grid_size: i32) -> Vec<String>
{
    (-1..=grid_size)
        .map(|y| {
            (-1..=grid_size)
                .map(|x| {
                    let inside = x >= 0 && x < grid_size && y >= 0 && y < grid_size;
                    let here = position == Some(Position { x, y });
                    match (here, inside) {
                        (true, _) => " B ",
                        (false, true) => "[ ]",
                        (false, false) => "   ",
                    }
                })
                .collect::<String>()
        })
        .collect()
}
