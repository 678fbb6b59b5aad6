pub mod engine;

use crate::direction::Direction;
use crate::error::{parse_number, GameError};
use crate::terminal::{self, TerminalGuard, TICK_MS};
use crossterm::event::KeyCode;
use engine::{MatchConfig, MatchGame, MatchItem, MatchState, LEFT_RANGE, MAX_TILT, TOP_RANGE};
use rand::thread_rng;
use std::time::{Duration, Instant};

const TABLE_WIDTH: usize = 40;
const TABLE_HEIGHT: usize = 18;
const MAX_DIGITS: usize = 3;

struct Form
{
    count: String,
    answers: [String; 4],
    selected: usize,
}

impl Form
{
    fn new(count: u32) -> Self
    {
        Self {
            count: count.to_string(),
            answers: Default::default(),
            selected: 0,
        }
    }

    fn clear_answers(&mut self)
    {
        self.answers = Default::default();
        self.selected = 0;
    }

    fn field(&mut self, state: MatchState) -> Option<&mut String>
    {
        match state {
            MatchState::Waiting => Some(&mut self.count),
            MatchState::Answer => Some(&mut self.answers[self.selected]),
            _ => None,
        }
    }
}

pub fn run(config: MatchConfig) -> Result<(), GameError>
{
    let mut term = TerminalGuard::enter()?;
    let mut rng = thread_rng();
    let mut form = Form::new(config.count);
    let mut game = MatchGame::new(config);
    let mut message: Option<String> = None;
    let mut last_draw: Option<Instant> = None;

    loop {
        for key in terminal::pending_keys()? {
            if terminal::is_quit(&key) {
                return Ok(());
            }
            let result = match key.code {
                KeyCode::Enter if game.state() == MatchState::Waiting => {
                    configure_from(&mut game, &form)
                        .and_then(|()| game.start_round(Instant::now(), &mut rng))
                }
                code => handle_key(&mut game, &mut form, code),
            };
            match result {
                Ok(()) => message = None,
                Err(err) => message = Some(err.to_string()),
            }
        }

        let changed = game.tick(Instant::now());

        let due = last_draw.is_none_or(|at| at.elapsed() >= Duration::from_millis(TICK_MS));
        if changed || due {
            term.draw(&frame(&game, &form, message.as_deref()))?;
            last_draw = Some(Instant::now());
        }

        std::thread::sleep(Duration::from_millis(1));
    }
}

fn handle_key(game: &mut MatchGame, form: &mut Form, code: KeyCode) -> Result<(), GameError>
{
    match code {
        KeyCode::Char(ch) if ch.is_ascii_digit() => {
            if let Some(field) = form.field(game.state()) {
                if *field == "0" {
                    field.clear();
                }
                if field.len() < MAX_DIGITS {
                    field.push(ch);
                }
            }
        }
        KeyCode::Char('+') | KeyCode::Char('-') => {
            if let Some(field) = form.field(game.state()) {
                let current = if field.is_empty() { 0 } else { parse_number(field)? };
                let next = if code == KeyCode::Char('+') {
                    current.saturating_add(1)
                } else {
                    current.saturating_sub(1)
                };
                *field = next.to_string();
            }
        }
        KeyCode::Backspace => {
            if let Some(field) = form.field(game.state()) {
                field.pop();
            }
        }
        KeyCode::Up if game.state() == MatchState::Answer => {
            form.selected = form.selected.saturating_sub(1);
        }
        KeyCode::Down if game.state() == MatchState::Answer => {
            form.selected = (form.selected + 1).min(Direction::ALL.len() - 1);
        }
        KeyCode::Enter => match game.state() {
            MatchState::Answer => {
                submit_from(game, form)?;
                game.check_answers()?;
            }
            MatchState::Result => {
                game.reset();
                form.clear_answers();
            }
            _ => {}
        },
        _ => {}
    }
    Ok(())
}

fn configure_from(game: &mut MatchGame, form: &Form) -> Result<(), GameError>
{
    game.configure(parse_number(&form.count)?)
}

// Every field is checked before any is stored. Empty answers count as zero.
fn submit_from(game: &mut MatchGame, form: &Form) -> Result<(), GameError>
{
    let mut values = [0; 4];
    for direction in Direction::ALL {
        let text = &form.answers[direction.index()];
        let value = if text.trim().is_empty() { 0 } else { parse_number(text)? };
        if value > game.count() {
            return Err(GameError::AnswerOutOfRange {
                value,
                max: game.count(),
            });
        }
        values[direction.index()] = value;
    }
    for direction in Direction::ALL {
        game.submit_answer(direction, values[direction.index()])?;
    }
    Ok(())
}

fn frame(game: &MatchGame, form: &Form, message: Option<&str>) -> Vec<String>
{
    let mut lines = vec!["Memory Games - Memorize the Matches".to_string(), String::new()];

    match game.state() {
        MatchState::Waiting => {
            lines.push(format!(
                "Number of matches to show ({}-{}): {}_",
                engine::MIN_COUNT,
                engine::MAX_COUNT,
                form.count
            ));
            lines.push(String::new());
            lines.push("Type a number or use +/-, then press ENTER to start.".to_string());
        }
        MatchState::Memorize => {
            lines.push("Remember which way each match points!".to_string());
            let border = format!("+{}+", "-".repeat(TABLE_WIDTH));
            lines.push(border.clone());
            for row in layout_table(game.items(), TABLE_WIDTH, TABLE_HEIGHT) {
                lines.push(format!("|{}|", row.into_iter().collect::<String>()));
            }
            lines.push(border);
        }
        MatchState::Answer => {
            lines.push("How many matches pointed each way?".to_string());
            lines.push(String::new());
            for direction in Direction::ALL {
                let marker = if form.selected == direction.index() { '>' } else { ' ' };
                lines.push(format!(
                    "{marker} {:<6} {} {}",
                    direction.label(),
                    direction.arrow(),
                    form.answers[direction.index()]
                ));
            }
            lines.push(String::new());
            lines.push("UP/DOWN to pick, digits or +/- to edit, ENTER to submit.".to_string());
        }
        MatchState::Result => {
            let truth = game.true_counts();
            lines.push("Game Over! Here are the correct answers:".to_string());
            for direction in Direction::ALL {
                lines.push(format!(
                    "  {:<6} {}  (you said {})",
                    direction.label(),
                    truth.get(direction),
                    game.answers().get(direction)
                ));
            }
            lines.push(String::new());
            lines.push(format!(
                "Your score: {} out of {}",
                game.score().unwrap_or(0),
                game.count()
            ));
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

/// Tilt shifts an arrow sideways by up to two cells. Two matches can round to
/// the same cell; the later one moves to the next free cell in reading order.
fn layout_table(items: &[MatchItem], width: usize, height: usize) -> Vec<Vec<char>>
{
    let mut table = vec![vec![' '; width]; height];
    if width == 0 || height == 0 {
        return table;
    }
    let cells = width * height;

    for item in items {
        let row = scale(item.position.top, TOP_RANGE.start, TOP_RANGE.end, height);
        let col = scale(item.position.left, LEFT_RANGE.start, LEFT_RANGE.end, width);
        let shift = item.tilt * 2 / MAX_TILT;
        let col = (col as i32 + shift).clamp(0, width as i32 - 1) as usize;

        let start = row * width + col;
        if let Some(free) = (0..cells)
            .map(|offset| (start + offset) % cells)
            .find(|&idx| table[idx / width][idx % width] == ' ')
        {
            table[free / width][free % width] = item.direction.arrow();
        }
    }

    table
}

fn scale(value: f64, low: f64, high: f64, cells: usize) -> usize
{
    let t = ((value - low) / (high - low)).clamp(0.0, 1.0);
    ((t * cells as f64) as usize).min(cells - 1)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use engine::{Placement, Tally};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn answering(count: u32) -> (MatchGame, Form)
    {
        let t0 = Instant::now();
        let mut game = MatchGame::new(MatchConfig::default());
        let form = Form::new(count);
        configure_from(&mut game, &form).unwrap();
        game.start_round(t0, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        game.tick(t0 + engine::MEMORIZE_DURATION);
        (game, form)
    }

    #[test]
    fn table_shows_every_match()
    {
        let mut rng = ChaCha8Rng::seed_from_u64(12345);
        let mut game = MatchGame::new(MatchConfig::default());
        game.configure(engine::MAX_COUNT).unwrap();
        game.start_round(Instant::now(), &mut rng).unwrap();

        let table = layout_table(game.items(), TABLE_WIDTH, TABLE_HEIGHT);
        let arrows = table.iter().flatten().filter(|&&ch| ch != ' ').count();
        assert_eq!(arrows, engine::MAX_COUNT as usize);
    }

    #[test]
    fn colliding_matches_both_drawn()
    {
        let spot = Placement { top: 40.0, left: 50.0 };
        let items = [
            MatchItem {
                direction: Direction::Up,
                position: spot,
                tilt: 0,
            },
            MatchItem {
                direction: Direction::Left,
                position: spot,
                tilt: 0,
            },
        ];
        let table = layout_table(&items, 10, 5);
        let row: String = table[2].iter().collect();
        assert_eq!(row.trim(), "↑←");
    }

    #[test]
    fn count_field_edits()
    {
        let mut game = MatchGame::new(MatchConfig::default());
        let mut form = Form::new(5);
        handle_key(&mut game, &mut form, KeyCode::Char('+')).unwrap();
        assert_eq!(form.count, "6");
        handle_key(&mut game, &mut form, KeyCode::Backspace).unwrap();
        handle_key(&mut game, &mut form, KeyCode::Char('1')).unwrap();
        handle_key(&mut game, &mut form, KeyCode::Char('2')).unwrap();
        assert_eq!(form.count, "12");
        configure_from(&mut game, &form).unwrap();
        assert_eq!(game.count(), 12);
    }

    #[test]
    fn bad_count_is_rejected_at_the_boundary()
    {
        let mut game = MatchGame::new(MatchConfig::default());
        let mut form = Form::new(5);
        form.count.clear();
        assert!(matches!(configure_from(&mut game, &form), Err(GameError::InvalidNumber(_))));
        form.count = "30".to_string();
        assert!(matches!(
            configure_from(&mut game, &form),
            Err(GameError::CountOutOfRange { .. })
        ));
        assert_eq!(game.count(), engine::DEFAULT_COUNT);
    }

    #[test]
    fn answer_entry_scores_round()
    {
        let (mut game, mut form) = answering(6);
        let truth = game.true_counts();
        for direction in Direction::ALL {
            form.selected = direction.index();
            for ch in truth.get(direction).to_string().chars() {
                handle_key(&mut game, &mut form, KeyCode::Char(ch)).unwrap();
            }
        }
        handle_key(&mut game, &mut form, KeyCode::Enter).unwrap();
        assert_eq!(game.state(), MatchState::Result);
        assert_eq!(game.score(), Some(6));

        handle_key(&mut game, &mut form, KeyCode::Enter).unwrap();
        assert_eq!(game.state(), MatchState::Waiting);
        assert!(form.answers.iter().all(String::is_empty));
    }

    #[test]
    fn rejected_field_stores_no_answers()
    {
        let (mut game, mut form) = answering(5);
        form.answers[0] = "2".to_string();
        form.answers[2] = "9".to_string();
        assert!(matches!(
            submit_from(&mut game, &form),
            Err(GameError::AnswerOutOfRange { value: 9, max: 5 })
        ));
        assert_eq!(game.answers(), &Tally::default());

        form.answers[2] = "x".to_string();
        assert!(matches!(submit_from(&mut game, &form), Err(GameError::InvalidNumber(_))));
        assert_eq!(game.answers(), &Tally::default());
        assert_eq!(game.state(), MatchState::Answer);
    }

    #[test]
    fn blank_answers_score_zero()
    {
        let (mut game, mut form) = answering(5);
        handle_key(&mut game, &mut form, KeyCode::Enter).unwrap();
        assert_eq!(game.score(), Some(0));
    }

    #[test]
    fn selection_stays_in_bounds()
    {
        let (mut game, mut form) = answering(5);
        handle_key(&mut game, &mut form, KeyCode::Up).unwrap();
        assert_eq!(form.selected, 0);
        for _ in 0..10 {
            handle_key(&mut game, &mut form, KeyCode::Down).unwrap();
        }
        assert_eq!(form.selected, 3);
    }

    #[test]
    fn result_frame_reports_score()
    {
        let (mut game, mut form) = answering(5);
        handle_key(&mut game, &mut form, KeyCode::Enter).unwrap();
        let lines = frame(&game, &form, None);
        assert!(lines.iter().any(|line| line == "Your score: 0 out of 5"));
    }
}
