// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;
mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use expense_tracker::{AppConfig, KeyValueStore, LoadOutcome, Store, Tracker};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "expense-tracker.log";

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = expense_tracker::config::load(cli.overrides())?;
    let command = cli.command.unwrap_or(Command::Tui);
    let interactive = matches!(command, Command::Tui);

    init_logging(&config, interactive)?;

    let classifier = config.classifier()?;
    let backend = config.open_backend()?;
    let mut tracker = Tracker::with_classifier(Store::new(backend), classifier);

    match tracker.load_outcome() {
        LoadOutcome::Corrupt(reason) => {
            eprintln!("⚠️  Saved data was unreadable ({}); starting from defaults.", reason)
        }
        LoadOutcome::Unavailable(reason) => {
            eprintln!("⚠️  Storage unavailable ({}); starting from defaults.", reason)
        }
        LoadOutcome::Loaded | LoadOutcome::Missing => {}
    }

    if interactive {
        run_ui_mode(&mut tracker, &config)
    } else {
        cli::run(command, &mut tracker, &config)
    }
}

/// Logs go to stderr, or to a file in the data directory while the TUI owns the screen
fn init_logging(config: &AppConfig, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("Invalid log level: {:?}", config.log_level))?;

    let writer = if interactive {
        std::fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("Failed to create data dir {:?}", config.data_dir))?;
        let path = config.data_dir.join(LOG_FILE);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;
        BoxMakeWriter::new(Mutex::new(file))
    } else {
        BoxMakeWriter::new(std::io::stderr)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(!interactive)
        .init();

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode<S: KeyValueStore>(tracker: &mut Tracker<S>, config: &AppConfig) -> Result<()> {
    tracing::info!(expenses = tracker.expenses().len(), "starting terminal UI");

    let mut app = ui::App::new(tracker, &config.currency);
    ui::run_ui(&mut app)?;

    println!("✅ Saved {} expenses", tracker.expenses().len());
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode<S: KeyValueStore>(_tracker: &mut Tracker<S>, _config: &AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use a subcommand: expense-tracker --help");
    std::process::exit(1);
}
