//! Command-line interface for strictly_turtle.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Turtle - tic-tac-toe drawn by a turtle
#[derive(Parser, Debug)]
#[command(name = "strictly_turtle")]
#[command(about = "Play tic-tac-toe by steering a drawing turtle", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML game config; defaults apply when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play interactively in the terminal against the simulated turtle
    Play {
        /// Where to write logs while the terminal UI owns the screen
        #[arg(long, default_value = "strictly_turtle.log")]
        log_file: PathBuf,
    },

    /// Replay a string of keys headlessly and print the result
    Script {
        /// Keys as typed: w/a/s/d steer, m or space marks, r resets, q quits
        keys: String,
    },

    /// Print the effective configuration as TOML
    ShowConfig,
}
