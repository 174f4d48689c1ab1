//! Interactive play over stdin/stdout.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, BufRead, Write};
use strictly_duochrome::{Action, GameFinished, GameInProgress, GameResult, GameSetup, RulesConfig};
use tracing::{info, instrument, warn};

const HELP: &str = "commands: up|down|left|right (or w/a/s/d), row N, col N, restart, help, quit";

/// Where the session stands between commands.
enum Phase {
    Playing(GameInProgress),
    Over(GameFinished),
}

/// Runs the interactive loop until `quit` or end of input.
#[instrument(skip(rules))]
pub fn run(rules: RulesConfig, seed: Option<u64>) -> Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout().lock();

    let mut phase = Phase::Playing(start(rules.clone(), seed)?);
    writeln!(out, "{HELP}")?;
    render(&mut out, &phase)?;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read command")?;
        let command = line.trim();
        if command.is_empty() {
            continue;
        }

        match command.to_ascii_lowercase().as_str() {
            "quit" | "q" | "exit" => break,
            "help" | "?" => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            "restart" => {
                info!("Restart requested");
                phase = Phase::Playing(start(rules.clone(), seed)?);
                render(&mut out, &phase)?;
                continue;
            }
            _ => {}
        }

        let action = match command.parse::<Action>() {
            Ok(action) => action,
            Err(e) => {
                writeln!(out, "{e}. {HELP}")?;
                continue;
            }
        };

        phase = match phase {
            Phase::Over(done) => {
                writeln!(out, "Game over. Type restart or quit.")?;
                Phase::Over(done)
            }
            Phase::Playing(game) => {
                if let Err(e) = game.check(&action) {
                    warn!(%action, error = %e, "Action rejected");
                    writeln!(out, "{e}")?;
                    Phase::Playing(game)
                } else {
                    match game.apply(action)? {
                        GameResult::InProgress(game) => {
                            if game.last_turn().is_some_and(|t| !t.changed) {
                                writeln!(out, "Nothing changed.")?;
                            }
                            Phase::Playing(game)
                        }
                        GameResult::Finished(done) => Phase::Over(done),
                    }
                }
            }
        };
        render(&mut out, &phase)?;
    }
    Ok(())
}

fn start(rules: RulesConfig, seed: Option<u64>) -> Result<GameInProgress> {
    let setup = GameSetup::new(rules).context("Rules are not playable")?;
    Ok(match seed {
        Some(seed) => setup.start(StdRng::seed_from_u64(seed)),
        None => setup.start_from_entropy(),
    })
}

fn render(out: &mut impl Write, phase: &Phase) -> Result<()> {
    match phase {
        Phase::Playing(game) => {
            writeln!(out, "{}", game.grid().display())?;
            writeln!(
                out,
                "score {}  combo x{}  recolors {}",
                game.score(),
                game.combo_multiplier(),
                game.color_change_moves_remaining()
            )?;
            if let Some(turn) = game.last_turn()
                && !turn.merges.is_empty()
            {
                let flips: usize = turn.merges.iter().map(|m| m.converter_flips.len()).sum();
                writeln!(
                    out,
                    "+{} from {} merge(s), {} converter flip(s)",
                    turn.score_gained,
                    turn.merges.len(),
                    flips
                )?;
            }
        }
        Phase::Over(done) => {
            writeln!(out, "{}", done.grid().display())?;
            writeln!(
                out,
                "GAME OVER  score {}  max tile {}  turns {}",
                done.score(),
                done.max_tile(),
                done.turns()
            )?;
        }
    }
    out.flush()?;
    Ok(())
}
