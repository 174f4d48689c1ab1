//! Random tile placement.

use crate::config::SpawnWeights;
use crate::grid::{Cell, Grid};
use crate::state::TileIdGenerator;
use crate::tile::{Tile, TileColor, TileId, TileKind};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, instrument};

/// Where and what a successful spawn placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawned {
    /// The new tile's id.
    pub id: TileId,
    /// The cell it landed in.
    pub cell: Cell,
}

/// Draws tile value, color and special kind from fixed weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawner {
    weights: SpawnWeights,
}

impl Spawner {
    /// Creates a spawner.
    pub fn new(weights: SpawnWeights) -> Self {
        Self { weights }
    }

    /// Returns the weights in use.
    pub fn weights(&self) -> &SpawnWeights {
        &self.weights
    }

    /// Value: 4 with `four_chance`, else 2.
    pub fn draw_value<R: Rng>(&self, rng: &mut R) -> u32 {
        if rng.random::<f64>() < *self.weights.four_chance() {
            4
        } else {
            2
        }
    }

    /// Kind from a single uniform draw: wildcard band first, then converter.
    pub fn draw_kind<R: Rng>(&self, rng: &mut R) -> TileKind {
        let roll = rng.random::<f64>();
        let wildcard = *self.weights.wildcard_chance();
        if roll < wildcard {
            TileKind::Wildcard
        } else if roll < wildcard + *self.weights.converter_chance() {
            TileKind::Converter
        } else {
            TileKind::Normal
        }
    }

    /// Places one random tile on a uniformly chosen empty cell.
    ///
    /// Returns `None` when the grid is full; that is an expected condition,
    /// not an error.
    #[instrument(skip_all)]
    pub fn try_spawn<R: Rng>(
        &self,
        grid: &mut Grid,
        ids: &mut TileIdGenerator,
        rng: &mut R,
    ) -> Option<Spawned> {
        let empty = grid.empty_cells();
        let cell = *empty.choose(rng)?;

        let value = self.draw_value(rng);
        let color = TileColor::random(rng);
        let kind = self.draw_kind(rng);
        let id = ids.next_id();

        debug!(%id, %cell, value, %color, %kind, "Spawned tile");
        // `cell` came from `empty_cells`, so it is in bounds.
        grid.set(cell, Some(Tile::new(id, value, color, kind))).ok()?;
        Some(Spawned { id, cell })
    }
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new(SpawnWeights::default())
    }
}
