//! Engine entry points an orchestrator calls.
//!
//! Every function takes the single owned [`GameState`] by reference, plus a
//! caller-supplied RNG wherever randomness is drawn. Nothing here spawns on
//! its own initiative except [`init_game`]; sequencing a turn (move, spawn,
//! termination check) belongs to the caller, as in
//! [`crate::GameInProgress::apply`].

use crate::action::{Axis, Direction};
use crate::config::{ComboPolicy, ConfigError, RulesConfig};
use crate::movement::{self, MoveOutcome};
use crate::recolor;
use crate::rules::should_end;
use crate::spawn::{Spawned, Spawner};
use crate::state::GameState;
use rand::Rng;
use tracing::{info, instrument, warn};

/// Creates a game with default rules on a `size`×`size` grid and spawns the
/// starting tiles.
///
/// # Errors
///
/// Returns [`ConfigError`] if `size` is too small for a playable grid.
#[instrument(skip(rng))]
pub fn init_game<R: Rng>(size: usize, rng: &mut R) -> Result<GameState, ConfigError> {
    init_game_with(RulesConfig::with_grid_size(size), rng)
}

/// Creates a game with the given rules and spawns `initial_tiles` tiles.
///
/// # Errors
///
/// Returns [`ConfigError`] if the rules fail [`RulesConfig::validate`].
pub fn init_game_with<R: Rng>(rules: RulesConfig, rng: &mut R) -> Result<GameState, ConfigError> {
    rules.validate()?;
    Ok(spawn_initial(rules, rng))
}

/// Builds a state from rules already validated and spawns the starting tiles.
#[instrument(
    skip_all,
    fields(grid_size = *rules.grid_size(), initial_tiles = *rules.initial_tiles())
)]
pub(crate) fn spawn_initial<R: Rng>(rules: RulesConfig, rng: &mut R) -> GameState {
    let mut state = GameState::new(rules);
    for _ in 0..*state.rules().initial_tiles() {
        if try_spawn(&mut state, rng).is_none() {
            break;
        }
    }
    info!(tiles = state.grid().tile_count(), "Game initialized");
    state
}

/// Slides the board, scores merges and settles the combo multiplier.
///
/// Does not spawn or check termination. On a finished game this is a no-op
/// returning an unchanged outcome.
#[instrument(skip(state, rng), fields(combo = state.combo_multiplier()))]
pub fn move_tiles<R: Rng>(state: &mut GameState, direction: Direction, rng: &mut R) -> MoveOutcome {
    if state.is_game_over() {
        warn!("Move on a finished game ignored");
        return MoveOutcome::default();
    }
    let outcome = movement::slide(state, direction, rng);
    settle_combo(state, &outcome);
    outcome
}

/// Applies the combo policy for a resolved move.
///
/// A merging move increments the multiplier; a move that only slid resets
/// it to 1; a move that changed nothing follows the configured
/// [`ComboPolicy`].
pub fn settle_combo(state: &mut GameState, outcome: &MoveOutcome) {
    state.combo_multiplier = if outcome.merged {
        state.combo_multiplier + 1
    } else if outcome.changed {
        1
    } else {
        match state.rules().idle_combo() {
            ComboPolicy::Keep => state.combo_multiplier,
            ComboPolicy::Reset => 1,
        }
    };
}

/// Spends one recolor use on the line `index` (1-based) along `axis`.
///
/// Returns `false`, consuming nothing, when no uses remain, the game is
/// over, the index is out of range, or the line holds no tiles.
#[instrument(skip(state), fields(remaining = state.color_change_moves_remaining()))]
pub fn change_line(state: &mut GameState, axis: Axis, index: usize) -> bool {
    if state.is_game_over() {
        warn!("Recolor on a finished game ignored");
        return false;
    }
    if state.color_change_moves_remaining() == 0 {
        warn!("No recolor moves remaining");
        return false;
    }
    if !recolor::change_line(&mut state.grid, axis, index) {
        return false;
    }
    state.color_change_moves_remaining -= 1;
    true
}

/// Places one random tile using the state's spawn weights.
///
/// `None` means the grid is full.
pub fn try_spawn<R: Rng>(state: &mut GameState, rng: &mut R) -> Option<Spawned> {
    let spawner = Spawner::new(*state.rules().spawn());
    spawner.try_spawn(&mut state.grid, &mut state.tile_ids, rng)
}

/// True if the game is over: already declared so, or blocked with no
/// recolor left that could help.
pub fn is_game_over(state: &GameState) -> bool {
    state.is_game_over() || should_end(state)
}

/// Evaluates termination and latches `game_over` once it is reached.
#[instrument(skip(state))]
pub fn check_game_over(state: &mut GameState) -> bool {
    if !state.game_over && should_end(state) {
        state.game_over = true;
        info!(
            score = state.score(),
            max_tile = state.grid().max_value(),
            "Game over"
        );
    }
    state.game_over
}
