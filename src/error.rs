use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError
{
    #[error("Cannot {action} while the game is {state}")]
    InvalidAction {
        action: &'static str,
        state: &'static str,
    },

    #[error("Match count must be between {min} and {max}, got {value}")]
    CountOutOfRange {
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("Answer must be between 0 and {max}, got {value}")]
    AnswerOutOfRange {
        value: u32,
        max: u32,
    },

    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),

    #[error("Grid size must be between 1 and 15, got {0}")]
    InvalidGridSize(i32),

    #[error("Unknown game '{0}'. Run with --help.")]
    UnknownGame(String),

    #[error("Invalid selection.")]
    InvalidSelection,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn parse_number(value: &str) -> Result<u32, GameError>
{
    let trimmed = value.trim();
    trimmed
        .parse::<u32>()
        .map_err(|_| GameError::InvalidNumber(trimmed.to_string()))
}
