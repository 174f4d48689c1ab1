//! Termination detection.

use super::merge::compatible;
use crate::grid::Grid;
use crate::state::GameState;
use tracing::instrument;

/// True if the board is full and no orthogonally adjacent pair can merge.
///
/// Pairs are judged with [`compatible`], so `merged_this_move` flags left
/// over from the previous move do not hide a merge the next move could make.
#[instrument(skip(grid))]
pub fn is_blocked(grid: &Grid) -> bool {
    if !grid.is_full() {
        return false;
    }
    for (cell, tile) in grid.occupied() {
        for neighbor in grid.neighbors(cell) {
            if grid.get(neighbor).is_some_and(|other| compatible(tile, other)) {
                return false;
            }
        }
    }
    true
}

/// True while a recolor could still change the board: uses remain and at
/// least one tile exists to flip.
pub fn recolor_possible(state: &GameState) -> bool {
    state.color_change_moves_remaining() > 0 && !state.grid().is_empty()
}

/// The full end-of-game policy: blocked, and no recolor left to try.
#[instrument(skip(state))]
pub fn should_end(state: &GameState) -> bool {
    is_blocked(state.grid()) && !recolor_possible(state)
}
