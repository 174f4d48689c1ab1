//! Complete per-game state.
//!
//! Everything that changes during play lives here, owned by one
//! orchestrator: the grid, scoring, the recolor budget, and the tile id
//! counter.

use crate::config::RulesConfig;
use crate::grid::Grid;
use crate::tile::TileId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Monotonic tile id source. Ids are never reused within a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileIdGenerator {
    next: u64,
}

impl TileIdGenerator {
    /// Starts counting from zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next id.
    pub fn next_id(&mut self) -> TileId {
        let id = TileId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call will return.
    pub fn peek(&self) -> TileId {
        TileId(self.next)
    }
}

/// Game state shared by every engine operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) rules: RulesConfig,
    pub(crate) grid: Grid,
    pub(crate) score: u64,
    pub(crate) combo_multiplier: u64,
    pub(crate) color_change_moves_remaining: u32,
    pub(crate) game_over: bool,
    pub(crate) tile_ids: TileIdGenerator,
}

impl GameState {
    /// Creates a fresh state with an empty grid.
    #[instrument(skip(rules), fields(grid_size = *rules.grid_size()))]
    pub fn new(rules: RulesConfig) -> Self {
        Self {
            grid: Grid::new(*rules.grid_size()),
            score: 0,
            combo_multiplier: 1,
            color_change_moves_remaining: *rules.color_change_moves(),
            game_over: false,
            tile_ids: TileIdGenerator::new(),
            rules,
        }
    }

    /// Returns the rules in force.
    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Returns the grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid access for setting up positions.
    ///
    /// Use [`GameState::next_tile_id`] when creating tiles so ids stay unique.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Returns the score.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Returns the combo multiplier (always at least 1).
    pub fn combo_multiplier(&self) -> u64 {
        self.combo_multiplier
    }

    /// Returns the recolor uses left.
    pub fn color_change_moves_remaining(&self) -> u32 {
        self.color_change_moves_remaining
    }

    /// True once the game has been declared over.
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Returns the tile id counter.
    pub fn tile_ids(&self) -> &TileIdGenerator {
        &self.tile_ids
    }

    /// Allocates a fresh tile id.
    pub fn next_tile_id(&mut self) -> TileId {
        self.tile_ids.next_id()
    }

    pub(crate) fn add_points(&mut self, value: u32) -> u64 {
        let points = u64::from(value) * self.combo_multiplier;
        self.score += points;
        points
    }
}
