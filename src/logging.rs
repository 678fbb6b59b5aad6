use crate::error::GameError;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;

pub fn level_for(verbosity: u8) -> Level
{
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// The games own stdout through the alternate screen, so without a log file
/// no subscriber is installed and records are dropped.
pub fn init(path: Option<&Path>, verbosity: u8) -> Result<(), GameError>
{
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    let installed = tracing_subscriber::fmt()
        .with_max_level(level_for(verbosity))
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init();
    if let Err(err) = installed {
        eprintln!("Warning: logging disabled ({err})");
    }
    Ok(())
}
