//! Batch play with a random policy.

use anyhow::{Context, Result, bail};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use strictly_duochrome::{
    Action, Axis, GameFinished, GameInProgress, GameResult, GameSetup, Line, RulesConfig,
};
use tracing::{debug, info, instrument};

/// Turn cap per game, in case a rules file makes games unending.
const MAX_TURNS: u64 = 1_000_000;

/// Outcome of one simulated game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    /// Final score.
    pub score: u64,
    /// Largest tile on the final board.
    pub max_tile: u32,
    /// Actions applied.
    pub turns: u64,
}

/// Aggregate statistics over all games.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    /// Games played.
    pub games: u32,
    /// Mean final score.
    pub mean_score: f64,
    /// Best final score.
    pub max_score: u64,
    /// Largest tile seen in any game.
    pub max_tile: u32,
    /// Mean actions per game.
    pub mean_turns: f64,
    /// Per-game records.
    pub records: Vec<GameRecord>,
}

impl SimulationSummary {
    fn from_records(records: Vec<GameRecord>) -> Self {
        let games = records.len() as u32;
        let n = f64::from(games.max(1));
        Self {
            games,
            mean_score: records.iter().map(|r| r.score as f64).sum::<f64>() / n,
            max_score: records.iter().map(|r| r.score).max().unwrap_or(0),
            max_tile: records.iter().map(|r| r.max_tile).max().unwrap_or(0),
            mean_turns: records.iter().map(|r| r.turns as f64).sum::<f64>() / n,
            records,
        }
    }
}

/// Plays `games` games and prints a summary.
#[instrument(skip(rules))]
pub fn run(rules: RulesConfig, games: u32, seed: Option<u64>, json: bool) -> Result<()> {
    let setup = GameSetup::new(rules).context("Rules are not playable")?;
    let mut records = Vec::with_capacity(games as usize);
    for i in 0..games {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(u64::from(i))),
            None => StdRng::from_os_rng(),
        };
        let mut policy = StdRng::from_rng(&mut rng);
        let game = setup.clone().start(rng);
        let done = play_out(game, &mut policy)?;
        debug!(game = i, score = done.score(), max_tile = done.max_tile(), "Game finished");
        records.push(GameRecord {
            score: done.score(),
            max_tile: done.max_tile(),
            turns: done.turns(),
        });
    }

    let summary = SimulationSummary::from_records(records);
    info!(
        games = summary.games,
        mean_score = summary.mean_score,
        max_tile = summary.max_tile,
        "Simulation complete"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "games {}  mean score {:.1}  max score {}  max tile {}  mean turns {:.1}",
            summary.games,
            summary.mean_score,
            summary.max_score,
            summary.max_tile,
            summary.mean_turns
        );
    }
    Ok(())
}

/// Plays one game to the end.
///
/// Slides in a uniformly random legal direction. When no slide is legal the
/// board is blocked, so the policy spends a recolor on a random line.
fn play_out<R: Rng>(mut game: GameInProgress, policy: &mut R) -> Result<GameFinished> {
    loop {
        if game.turns() >= MAX_TURNS {
            bail!("Game exceeded {} turns", MAX_TURNS);
        }
        let action = match game.legal_directions().choose(policy) {
            Some(direction) => Action::Slide(*direction),
            None => random_line(game.grid().size(), policy),
        };
        match game.apply(action)? {
            GameResult::InProgress(next) => game = next,
            GameResult::Finished(done) => return Ok(done),
        }
    }
}

fn random_line<R: Rng>(size: usize, policy: &mut R) -> Action {
    let axis = if policy.random_bool(0.5) { Axis::Row } else { Axis::Col };
    Action::Recolor(Line::new(axis, policy.random_range(1..=size.max(1))))
}
