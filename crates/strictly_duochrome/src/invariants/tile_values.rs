//! Value invariant: tiles carry powers of two and the combo stays positive.

use super::Invariant;
use crate::state::GameState;

/// Invariant: every tile value is a power of two ≥ 2 and the combo
/// multiplier is at least 1.
pub struct TileValuesValid;

impl Invariant<GameState> for TileValuesValid {
    fn holds(state: &GameState) -> bool {
        state.combo_multiplier() >= 1
            && state
                .grid()
                .tiles()
                .all(|tile| tile.value() >= 2 && tile.value().is_power_of_two())
    }

    fn description() -> &'static str {
        "Tile values are powers of two of at least 2 and the combo is at least 1"
    }
}
