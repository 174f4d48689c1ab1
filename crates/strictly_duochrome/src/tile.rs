//! Core tile types: color, special kind, identity.

use crate::grid::Cell;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the two tile colors.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TileColor {
    /// Red tiles.
    Red,
    /// Blue tiles.
    Blue,
}

impl TileColor {
    /// Returns the other color.
    pub fn flipped(self) -> Self {
        match self {
            TileColor::Red => TileColor::Blue,
            TileColor::Blue => TileColor::Red,
        }
    }

    /// Draws a color uniformly at random.
    #[instrument(skip(rng))]
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) {
            TileColor::Red
        } else {
            TileColor::Blue
        }
    }

    /// Single-letter label used by the text renderer.
    pub fn letter(self) -> char {
        match self {
            TileColor::Red => 'r',
            TileColor::Blue => 'b',
        }
    }
}

/// Special behavior carried by a tile until it merges.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    /// Ordinary tile.
    #[default]
    Normal,
    /// Merges with any tile of equal value regardless of color.
    Wildcard,
    /// Flips the colors of the merge result's orthogonal neighbors.
    Converter,
}

impl TileKind {
    /// True for [`TileKind::Wildcard`].
    pub fn is_wildcard(self) -> bool {
        matches!(self, TileKind::Wildcard)
    }

    /// True for [`TileKind::Converter`].
    pub fn is_converter(self) -> bool {
        matches!(self, TileKind::Converter)
    }
}

/// Stable tile identity. Ids are handed out monotonically and never reused.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("#{}", _0)]
pub struct TileId(pub u64);

/// A single game piece.
///
/// The stored position is owned by [`crate::Grid`]: it is stamped whenever
/// the tile is placed, so it always matches the cell holding the tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    id: TileId,
    value: u32,
    color: TileColor,
    kind: TileKind,
    row: usize,
    col: usize,
    merged_this_move: bool,
}

impl Tile {
    /// Creates an unplaced tile.
    pub fn new(id: TileId, value: u32, color: TileColor, kind: TileKind) -> Self {
        debug_assert!(value >= 2 && value.is_power_of_two(), "bad tile value {value}");
        Self {
            id,
            value,
            color,
            kind,
            row: 0,
            col: 0,
            merged_this_move: false,
        }
    }

    /// Returns the tile id.
    pub fn id(&self) -> TileId {
        self.id
    }

    /// Returns the face value.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Returns the color.
    pub fn color(&self) -> TileColor {
        self.color
    }

    /// Returns the special kind.
    pub fn kind(&self) -> TileKind {
        self.kind
    }

    /// Returns the cell this tile was last placed in.
    pub fn cell(&self) -> Cell {
        Cell::new(self.row, self.col)
    }

    /// True if this tile absorbed a merge during the current move.
    pub fn merged_this_move(&self) -> bool {
        self.merged_this_move
    }

    /// Swaps the color.
    pub fn flip_color(&mut self) {
        self.color = self.color.flipped();
    }

    pub(crate) fn place_at(&mut self, cell: Cell) {
        self.row = cell.row;
        self.col = cell.col;
    }

    pub(crate) fn clear_merged(&mut self) {
        self.merged_this_move = false;
    }

    /// Turns this tile into the result of a merge.
    ///
    /// Special status is always lost, including the survivor's own.
    pub(crate) fn absorb(&mut self, value: u32, color: TileColor) {
        self.value = value;
        self.color = color;
        self.kind = TileKind::Normal;
        self.merged_this_move = true;
    }
}
