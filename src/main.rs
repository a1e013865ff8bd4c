use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use guess_the_word::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, RuntimeSettings},
    logging,
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    timer::SystemClock,
    ui,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// charades-style word guessing game: act out the word, score a point when it is guessed
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Act out the word on screen while your friends guess. Press (c) when they get it, (s) to skip it. You have one minute."
)]
pub struct Cli {
    /// seed for the word order (same seed, same words)
    #[clap(long)]
    seed: Option<u64>,

    /// log verbosity written to the log file
    #[clap(long, value_enum)]
    log_level: Option<LogLevel>,

    /// store the options of this run as the new defaults
    #[clap(long)]
    save_config: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Cli {
    fn settings(&self, config: &Config) -> RuntimeSettings {
        let level = self.log_level.map(|l| l.to_string());
        RuntimeSettings::resolve(config, self.seed, level.as_deref())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let settings = cli.settings(&store.load());
    if cli.save_config {
        store.save(&Config::from(&settings))?;
    }

    if let Some(log_path) = AppDirs::log_path() {
        // the game is playable without a log
        let _ = logging::init_file_logging(&log_path, &settings.log_level);
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(SystemClock, settings.seed);
    let res = start_tui(&mut terminal, &mut app);
    app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App<SystemClock>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step() {
            GameEvent::Tick => app.on_tick(),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if app.handle_key(key) == Control::Quit {
                    break;
                }
            }
        }
        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["guess-the-word"]);

        assert_eq!(cli.seed, None);
        assert!(cli.log_level.is_none());
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_seed() {
        let cli = Cli::parse_from(["guess-the-word", "--seed", "42"]);
        assert_eq!(cli.seed, Some(42));
    }

    #[test]
    fn test_cli_rejects_bad_seed() {
        assert!(Cli::try_parse_from(["guess-the-word", "--seed", "-1"]).is_err());
    }

    #[test]
    fn test_cli_log_level() {
        let cli = Cli::parse_from(["guess-the-word", "--log-level", "debug"]);
        assert!(matches!(cli.log_level, Some(LogLevel::Debug)));
        assert!(Cli::try_parse_from(["guess-the-word", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }

    #[test]
    fn test_settings_prefer_cli_over_config() {
        let config = Config {
            seed: Some(7),
            log_level: "error".into(),
        };

        let cli = Cli::parse_from(["guess-the-word", "--log-level", "trace"]);
        let settings = cli.settings(&config);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.log_level, "trace");

        let cli = Cli::parse_from(["guess-the-word", "--seed", "3"]);
        let settings = cli.settings(&config);
        assert_eq!(settings.seed, Some(3));
        assert_eq!(settings.log_level, "error");
    }

    #[test]
    fn test_tick_rate_constant() {
        assert_eq!(TICK_RATE_MS, 100);
        assert!(Duration::from_millis(TICK_RATE_MS) < guess_the_word::session::ONE_SECOND);
    }
}
