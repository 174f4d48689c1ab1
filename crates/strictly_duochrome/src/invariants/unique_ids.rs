//! Identity invariant: tile ids are unique and already issued.

use super::Invariant;
use crate::state::GameState;
use std::collections::HashSet;

/// Invariant: no two tiles share an id, and every id is below the counter.
pub struct UniqueTileIds;

impl Invariant<GameState> for UniqueTileIds {
    fn holds(state: &GameState) -> bool {
        let next = state.tile_ids().peek();
        let mut seen = HashSet::new();
        state
            .grid()
            .tiles()
            .all(|tile| tile.id() < next && seen.insert(tile.id()))
    }

    fn description() -> &'static str {
        "Tile ids are unique and were issued by the id counter"
    }
}
