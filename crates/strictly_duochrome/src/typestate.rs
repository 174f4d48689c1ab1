//! Phase-specific typestate structs for a duochrome game.
//!
//! Each phase is its own type. A `GameFinished` always carries its final
//! state; there is no way to apply an action to it.

use crate::action::{Action, ActionError, Direction};
use crate::config::{ConfigError, RulesConfig};
use crate::contracts::{ActionContract, Contract};
use crate::engine;
use crate::grid::Grid;
use crate::invariants::check_state;
use crate::movement::{self, MergeEvent};
use crate::state::GameState;
use crate::tile::TileId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Setup Phase
// ─────────────────────────────────────────────────────────────

/// Game in setup phase: rules chosen, board not yet populated.
#[derive(Debug, Clone, Default)]
pub struct GameSetup {
    rules: RulesConfig,
}

impl GameSetup {
    /// Creates a setup with the given rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the rules fail [`RulesConfig::validate`].
    #[instrument(skip(rules))]
    pub fn new(rules: RulesConfig) -> Result<Self, ConfigError> {
        rules.validate()?;
        Ok(Self { rules })
    }

    /// Returns the rules.
    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Spawns the starting tiles and begins play with the given RNG.
    #[instrument(skip_all)]
    pub fn start(self, mut rng: StdRng) -> GameInProgress {
        let state = engine::spawn_initial(self.rules, &mut rng);
        info!(score = state.score(), "Game started");
        GameInProgress {
            state,
            rng,
            last_turn: None,
            turns: 0,
        }
    }

    /// Starts with a deterministic RNG.
    pub fn start_seeded(self, seed: u64) -> GameInProgress {
        self.start(StdRng::seed_from_u64(seed))
    }

    /// Starts with an RNG seeded from the operating system.
    pub fn start_from_entropy(self) -> GameInProgress {
        self.start(StdRng::from_os_rng())
    }
}

// ─────────────────────────────────────────────────────────────
//  Turn Report
// ─────────────────────────────────────────────────────────────

/// What one applied action did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    /// The action taken.
    pub action: Action,
    /// The board changed.
    pub changed: bool,
    /// At least one merge happened.
    pub merged: bool,
    /// Points scored this turn.
    pub score_gained: u64,
    /// Combo multiplier after the turn settled.
    pub combo_after: u64,
    /// Tile spawned after a changing move.
    pub spawned: Option<TileId>,
    /// Merges in resolution order.
    pub merges: Vec<MergeEvent>,
}

// ─────────────────────────────────────────────────────────────
//  InProgress Phase
// ─────────────────────────────────────────────────────────────

/// Game in progress: accepts actions.
#[derive(Debug, Clone)]
pub struct GameInProgress {
    state: GameState,
    rng: StdRng,
    last_turn: Option<TurnReport>,
    turns: u64,
}

impl GameInProgress {
    /// Resumes play from an existing state, for example a loaded snapshot.
    ///
    /// A state that is already terminal comes back as `Finished`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InvariantViolation`] if the rules are not
    /// playable, the grid size disagrees with the rules, or the state breaks
    /// an invariant.
    #[instrument(skip_all)]
    pub fn resume(mut state: GameState, rng: StdRng) -> Result<GameResult, ActionError> {
        state
            .rules()
            .validate()
            .map_err(|e| ActionError::InvariantViolation(e.message))?;
        if state.grid().size() != *state.rules().grid_size() {
            warn!(
                grid = state.grid().size(),
                rules = *state.rules().grid_size(),
                "Resume with mismatched grid size"
            );
            return Err(ActionError::InvariantViolation(format!(
                "Grid size {} does not match rules grid_size {}",
                state.grid().size(),
                state.rules().grid_size()
            )));
        }
        check_state(&state).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            ActionError::InvariantViolation(format!("Resumed state invalid: {}", descriptions))
        })?;

        if engine::check_game_over(&mut state) {
            Ok(GameResult::Finished(GameFinished {
                state,
                last_turn: None,
                turns: 0,
            }))
        } else {
            Ok(GameResult::InProgress(Self {
                state,
                rng,
                last_turn: None,
                turns: 0,
            }))
        }
    }

    /// Applies one action as a full turn, consuming self.
    ///
    /// A slide runs the move engine, spawns a tile if the board changed, and
    /// settles the combo. A recolor spends a use only if it flipped a tile.
    /// Termination is evaluated after either.
    ///
    /// Contract enforcement:
    /// - Preconditions checked always
    /// - Postconditions checked in debug builds only
    #[instrument(skip(self, action), fields(action = %action, turn = self.turns + 1))]
    pub fn apply(self, action: Action) -> Result<GameResult, ActionError> {
        ActionContract::pre(&self.state, &action)?;

        #[cfg(debug_assertions)]
        let before = self.state.clone();

        let mut game = self;
        let report = match action {
            Action::Slide(direction) => {
                let outcome = engine::move_tiles(&mut game.state, direction, &mut game.rng);
                let spawned = if outcome.changed {
                    engine::try_spawn(&mut game.state, &mut game.rng).map(|s| s.id)
                } else {
                    None
                };
                TurnReport {
                    action,
                    changed: outcome.changed,
                    merged: outcome.merged,
                    score_gained: outcome.score_gained,
                    combo_after: game.state.combo_multiplier(),
                    spawned,
                    merges: outcome.merges,
                }
            }
            Action::Recolor(line) => {
                let changed = engine::change_line(&mut game.state, line.axis, line.index);
                TurnReport {
                    action,
                    changed,
                    merged: false,
                    score_gained: 0,
                    combo_after: game.state.combo_multiplier(),
                    spawned: None,
                    merges: Vec::new(),
                }
            }
        };
        game.turns += 1;
        game.last_turn = Some(report);

        #[cfg(debug_assertions)]
        ActionContract::post(&before, &game.state)?;

        if engine::check_game_over(&mut game.state) {
            return Ok(GameResult::Finished(GameFinished {
                state: game.state,
                last_turn: game.last_turn,
                turns: game.turns,
            }));
        }
        Ok(GameResult::InProgress(game))
    }

    /// Checks whether `action` may be applied, without consuming the game.
    pub fn check(&self, action: &Action) -> Result<(), ActionError> {
        ActionContract::pre(&self.state, action)
    }

    /// Returns the full state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Returns the board.
    pub fn grid(&self) -> &Grid {
        self.state.grid()
    }

    /// Returns the score.
    pub fn score(&self) -> u64 {
        self.state.score()
    }

    /// Returns the combo multiplier.
    pub fn combo_multiplier(&self) -> u64 {
        self.state.combo_multiplier()
    }

    /// Returns the recolor uses left.
    pub fn color_change_moves_remaining(&self) -> u32 {
        self.state.color_change_moves_remaining()
    }

    /// Returns the report of the most recent turn.
    pub fn last_turn(&self) -> Option<&TurnReport> {
        self.last_turn.as_ref()
    }

    /// Returns how many actions have been applied.
    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Directions that would change the board.
    pub fn legal_directions(&self) -> Vec<Direction> {
        movement::legal_directions(self.state.grid())
    }
}

// ─────────────────────────────────────────────────────────────
//  Finished Phase
// ─────────────────────────────────────────────────────────────

/// Game finished: the board is blocked and no recolor is left.
#[derive(Debug, Clone)]
pub struct GameFinished {
    state: GameState,
    last_turn: Option<TurnReport>,
    turns: u64,
}

impl GameFinished {
    /// Returns the final score.
    pub fn score(&self) -> u64 {
        self.state.score()
    }

    /// Returns the largest tile value on the final board.
    pub fn max_tile(&self) -> u32 {
        self.state.grid().max_value()
    }

    /// Returns the final board.
    pub fn grid(&self) -> &Grid {
        self.state.grid()
    }

    /// Returns the final state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Returns the report of the turn that ended the game.
    pub fn last_turn(&self) -> Option<&TurnReport> {
        self.last_turn.as_ref()
    }

    /// Returns how many actions were applied.
    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Restarts with the same rules (consumes finished, returns setup).
    #[instrument(skip(self))]
    pub fn restart(self) -> GameSetup {
        info!(final_score = self.state.score(), "Restarting");
        GameSetup {
            rules: self.state.rules,
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Result Type
// ─────────────────────────────────────────────────────────────

/// Result of applying an action.
#[derive(Debug)]
pub enum GameResult {
    /// Game continues.
    InProgress(GameInProgress),
    /// Game finished.
    Finished(GameFinished),
}
