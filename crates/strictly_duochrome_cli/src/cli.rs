//! Command-line interface for strictly_duochrome.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Duochrome - two-color 2048 in the terminal
#[derive(Parser, Debug)]
#[command(name = "strictly_duochrome")]
#[command(about = "Two-color 2048 with wildcards, converters and recolors", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play interactively, reading commands from stdin
    Play {
        /// RNG seed for a reproducible game
        #[arg(long)]
        seed: Option<u64>,

        /// Path to a TOML rules file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Play many games with a random policy and report statistics
    Simulate {
        /// Number of games to play
        #[arg(short, long, default_value = "100")]
        games: u32,

        /// Base RNG seed; game `i` uses `seed + i`
        #[arg(long)]
        seed: Option<u64>,

        /// Path to a TOML rules file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}
