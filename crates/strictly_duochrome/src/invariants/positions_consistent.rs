//! Position invariant: a tile's stored coordinates match its cell.

use super::Invariant;
use crate::state::GameState;

/// Invariant: every tile's stored row/col equals the cell holding it.
pub struct PositionsConsistent;

impl Invariant<GameState> for PositionsConsistent {
    fn holds(state: &GameState) -> bool {
        state
            .grid()
            .occupied()
            .all(|(cell, tile)| tile.cell() == cell)
    }

    fn description() -> &'static str {
        "Every tile's stored position matches its grid cell"
    }
}
