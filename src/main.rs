//! Strictly Turtle - Unified CLI
//!
//! Interactive play in the terminal, headless scripted play, and config
//! inspection.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::Path;
use strictly_turtle::{GameConfig, GameController, SimTurtle, parse_keys, scripted, tui};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { log_file } => {
            init_file_tracing(&log_file)?;
            let config = load_config(cli.config.as_deref())?;
            tui::run_tui(config).await
        }
        Command::Script { keys } => {
            init_stderr_tracing();
            let config = load_config(cli.config.as_deref())?;
            run_script(config, &keys).await
        }
        Command::ShowConfig => {
            init_stderr_tracing();
            let config = load_config(cli.config.as_deref())?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Logs to a file so the terminal UI keeps the screen.
fn init_file_tracing(path: &Path) -> Result<()> {
    let log_file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init(); // Don't panic if already initialized
    Ok(())
}

fn init_stderr_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Loads the config file if one was given, otherwise the defaults.
#[instrument]
fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            info!("No config file given, using defaults");
            Ok(GameConfig::default())
        }
    }
}

/// Plays `keys` against the simulated turtle and prints the outcome.
#[instrument(skip(config))]
async fn run_script(config: GameConfig, keys: &str) -> Result<()> {
    let events = parse_keys(keys);
    info!(count = events.len(), "Replaying scripted keys");

    let turtle = SimTurtle::new(*config.home(), *config.move_speed());
    let sim = turtle.handle();
    let mut controller = GameController::new(turtle, config);
    let state = controller.run(scripted(events)).await;

    println!("{}", state.board().display());
    println!();
    println!("Phase: {}", state.phase());
    println!("Controller: {}", controller.state());
    println!("Marks drawn: {}", sim.snapshot().marks.len());
    Ok(())
}
