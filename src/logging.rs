use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use tracing::Level;

/// Parse a level name, falling back to info for anything unrecognised
pub fn parse_level(name: &str) -> Level {
    Level::from_str(name.trim()).unwrap_or(Level::INFO)
}

/// Send log output to an append-only file so the terminal UI stays clean
pub fn init_file_logging(path: &Path, level: &str) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(parse_level(level))
        .try_init()
        .map_err(|err| -> Box<dyn Error> { err })
}
