mod cue;
mod direction;
mod error;
mod games;
mod logging;
mod terminal;
mod timer;

use clap::{ArgAction, Args, Parser, Subcommand};
use cue::{CuePlayer, Silent, TerminalBell};
use error::GameError;
use games::bug_game::engine::{BugConfig, GRID_SIZE};
use games::match_game::engine::{MatchConfig, DEFAULT_COUNT};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "memory-games", version, about = "Small terminal memory games")]
struct Cli
{
    /// Write logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// More log detail (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command
{
    /// List the available games.
    List,
    /// Track a hidden bug and call out when it escapes.
    Bug(BugArgs),
    /// Memorize which way the matches point.
    Match(MatchArgs),
}

#[derive(Args)]
struct BugArgs
{
    #[arg(long, default_value_t = GRID_SIZE)]
    grid_size: i32,

    /// Don't ring the terminal bell on every move.
    #[arg(long)]
    mute: bool,
}

#[derive(Args)]
struct MatchArgs
{
    #[arg(long, default_value_t = DEFAULT_COUNT)]
    count: u32,
}

fn main()
{
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), GameError>
{
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref(), cli.verbose)?;

    match cli.command {
        None => interactive_menu(),
        Some(Command::List) => {
            list_games();
            Ok(())
        }
        Some(Command::Bug(args)) => run_bug(BugConfig::with_grid_size(args.grid_size)?, args.mute),
        Some(Command::Match(args)) => run_match(MatchConfig::with_count(args.count)?),
    }
}

fn run_bug(config: BugConfig, mute: bool) -> Result<(), GameError>
{
    tracing::info!(grid_size = config.grid_size, mute, "starting bug game");
    let mut cue: Box<dyn CuePlayer> = if mute {
        Box::new(Silent)
    } else {
        Box::new(TerminalBell::stdout())
    };
    games::bug_game::run(config, cue.as_mut())
}

fn run_match(config: MatchConfig) -> Result<(), GameError>
{
    tracing::info!(count = config.count, "starting match game");
    games::match_game::run(config)
}

fn run_game(name: &str) -> Result<(), GameError>
{
    match name {
        "bug" => run_bug(BugConfig::default(), false),
        "match" => run_match(MatchConfig::default()),
        _ => Err(GameError::UnknownGame(name.to_string())),
    }
}

fn interactive_menu() -> Result<(), GameError>
{
    let registry = games::registry();
    println!("Memory Games");
    println!();
    println!("Select a game:");
    for (idx, game) in registry.iter().enumerate() {
        println!("  {}. {} - {}", idx + 1, game.name, game.description);
    }
    println!();
    print!("Enter number or name (default 1, q to quit): ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let choice = input.trim();

    if choice.is_empty() {
        return run_game(registry[0].name);
    }
    if choice.eq_ignore_ascii_case("q") {
        return Ok(());
    }
    if let Ok(index) = choice.parse::<usize>() {
        if index >= 1 && index <= registry.len() {
            return run_game(registry[index - 1].name);
        }
    }

    match games::find(choice) {
        Some(game) => run_game(game.name),
        None => Err(GameError::InvalidSelection),
    }
}

fn list_games()
{
    println!("Available games:");
    for game in games::registry() {
        println!("  {:<10} - {}", game.name, game.description);
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn cli_parses_subcommands()
    {
        let cli = Cli::try_parse_from(["memory-games", "match", "--count", "12"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Match(MatchArgs { count: 12 }))));

        let cli = Cli::try_parse_from(["memory-games", "-vv", "bug", "--mute"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Command::Bug(args)) => {
                assert!(args.mute);
                assert_eq!(args.grid_size, GRID_SIZE);
            }
            _ => panic!("expected bug subcommand"),
        }
    }

    #[test]
    fn cli_without_subcommand_opens_menu()
    {
        let cli = Cli::try_parse_from(["memory-games"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn unknown_game_is_an_error()
    {
        assert!(matches!(run_game("tetris"), Err(GameError::UnknownGame(name)) if name == "tetris"));
    }

    #[test]
    fn cli_definition_is_valid()
    {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
