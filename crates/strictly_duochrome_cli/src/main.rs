//! Strictly Duochrome - terminal driver
//!
//! Thin orchestrator over the rules engine: an interactive `play` loop and a
//! batch `simulate` mode.

#![warn(missing_docs)]

mod cli;
mod play;
mod simulate;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::Path;
use strictly_duochrome::RulesConfig;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so the board on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { seed, config } => {
            let rules = load_rules(config.as_deref())?;
            play::run(rules, seed)
        }
        Command::Simulate {
            games,
            seed,
            config,
            json,
        } => {
            let rules = load_rules(config.as_deref())?;
            simulate::run(rules, games, seed, json)
        }
    }
}

/// Loads rules from `path`, or the defaults when no path is given.
#[instrument]
fn load_rules(path: Option<&Path>) -> Result<RulesConfig> {
    match path {
        Some(path) => {
            let rules = RulesConfig::from_file(path)
                .with_context(|| format!("Failed to load rules from {}", path.display()))?;
            info!(path = %path.display(), "Using rules file");
            Ok(rules)
        }
        None => Ok(RulesConfig::default()),
    }
}
