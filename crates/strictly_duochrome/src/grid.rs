//! Fixed-size square grid of optional tiles.

use crate::action::Direction;
use crate::tile::{Tile, TileKind};
use derive_more::{Display, Error};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{instrument, warn};

/// A cell coordinate, zero-based.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[display("({}, {})", row, col)]
pub struct Cell {
    /// Row index (0 is the top row).
    pub row: usize,
    /// Column index (0 is the leftmost column).
    pub col: usize,
}

impl Cell {
    /// Creates a cell coordinate.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Errors from the public placement gate.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GridError {
    /// The coordinate lies outside the grid.
    #[display("Cell ({}, {}) is outside a {}x{} grid", row, col, size, size)]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Grid side length.
        size: usize,
    },

    /// A stored grid has the wrong number of cells for its side length.
    #[display("Grid of side {} needs {} cells, found {}", size, size * size, cells)]
    CellCount {
        /// Declared side length.
        size: usize,
        /// Cells actually present.
        cells: usize,
    },
}

/// N×N grid. Each cell is empty or holds exactly one tile.
///
/// Deserializing rejects a cell list whose length is not `size * size` and
/// restamps every tile with the cell it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    size: usize,
    /// Cells in row-major order.
    cells: Vec<Option<Tile>>,
}

/// Wire shape of a [`Grid`] before its cells are checked.
#[derive(Deserialize)]
struct StoredGrid {
    size: usize,
    cells: Vec<Option<Tile>>,
}

impl TryFrom<StoredGrid> for Grid {
    type Error = GridError;

    fn try_from(stored: StoredGrid) -> Result<Self, Self::Error> {
        let StoredGrid { size, mut cells } = stored;
        if Some(cells.len()) != size.checked_mul(size) {
            return Err(GridError::CellCount {
                size,
                cells: cells.len(),
            });
        }
        for (i, slot) in cells.iter_mut().enumerate() {
            if let Some(tile) = slot {
                tile.place_at(Cell::new(i / size, i % size));
            }
        }
        Ok(Self { size, cells })
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = StoredGrid::deserialize(deserializer)?;
        Grid::try_from(stored).map_err(serde::de::Error::custom)
    }
}

impl Grid {
    /// Creates an empty grid of side `size`.
    #[instrument]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Bounds check on signed coordinates (`0..size` on both axes).
    pub fn is_valid_position(&self, row: isize, col: isize) -> bool {
        let n = self.size as isize;
        (0..n).contains(&row) && (0..n).contains(&col)
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        (cell.row < self.size && cell.col < self.size).then(|| cell.row * self.size + cell.col)
    }

    /// Returns the tile at `cell`, if any. Out-of-range cells read as empty.
    pub fn get(&self, cell: Cell) -> Option<&Tile> {
        self.index(cell).and_then(|i| self.cells[i].as_ref())
    }

    /// Mutable access to the tile at `cell`.
    pub fn get_mut(&mut self, cell: Cell) -> Option<&mut Tile> {
        self.index(cell).and_then(|i| self.cells[i].as_mut())
    }

    /// True if `cell` is in bounds and holds no tile.
    pub fn is_empty_cell(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| self.cells[i].is_none())
    }

    /// Places (or clears) a cell and returns whatever was there before.
    ///
    /// A placed tile has its stored position stamped to `cell` in the same
    /// step, so the grid and the tile never disagree.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `cell` is outside the grid.
    #[instrument(skip_all, fields(%cell))]
    pub fn set(&mut self, cell: Cell, tile: Option<Tile>) -> Result<Option<Tile>, GridError> {
        let Some(i) = self.index(cell) else {
            warn!(size = self.size, "Rejected placement outside grid");
            return Err(GridError::OutOfBounds {
                row: cell.row,
                col: cell.col,
                size: self.size,
            });
        };
        let tile = tile.map(|mut t| {
            t.place_at(cell);
            t
        });
        Ok(std::mem::replace(&mut self.cells[i], tile))
    }

    /// Removes and returns the tile at `cell`.
    pub fn take(&mut self, cell: Cell) -> Option<Tile> {
        self.index(cell).and_then(|i| self.cells[i].take())
    }

    /// Moves the tile at `from` into the empty cell `to`.
    pub(crate) fn relocate(&mut self, from: Cell, to: Cell) {
        debug_assert!(self.is_empty_cell(to), "relocate target {to} is occupied");
        let Some(i) = self.index(to) else { return };
        if let Some(mut tile) = self.take(from) {
            tile.place_at(to);
            self.cells[i] = Some(tile);
        }
    }

    /// The neighboring cell one step in `direction`, if in bounds.
    pub fn neighbor(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        let (dr, dc) = direction.delta();
        let row = cell.row as isize + dr;
        let col = cell.col as isize + dc;
        self.is_valid_position(row, col)
            .then(|| Cell::new(row as usize, col as usize))
    }

    /// In-bounds orthogonal neighbors of `cell` (up, down, left, right).
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |d| self.neighbor(cell, d))
    }

    /// Every cell coordinate in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        let n = self.size;
        (0..n).flat_map(move |row| (0..n).map(move |col| Cell::new(row, col)))
    }

    /// All empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Cell> {
        self.cells().filter(|c| self.is_empty_cell(*c)).collect()
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().flatten()
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.cells.iter_mut().flatten()
    }

    /// Tiles paired with the cell that holds them.
    pub fn occupied(&self) -> impl Iterator<Item = (Cell, &Tile)> {
        self.cells().zip(self.cells.iter()).filter_map(|(c, t)| t.as_ref().map(|t| (c, t)))
    }

    /// Number of tiles on the board.
    pub fn tile_count(&self) -> usize {
        self.tiles().count()
    }

    /// True if every cell holds a tile.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// True if no cell holds a tile.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Largest tile value, or 0 on an empty board.
    pub fn max_value(&self) -> u32 {
        self.tiles().map(Tile::value).max().unwrap_or(0)
    }

    /// Sum of all tile values.
    pub fn value_sum(&self) -> u64 {
        self.tiles().map(|t| u64::from(t.value())).sum()
    }

    /// Formats the board as a human-readable string.
    ///
    /// Each tile shows its value and color letter; `*` marks a wildcard and
    /// `~` a converter. Empty cells are dots.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..self.size {
            for col in 0..self.size {
                let symbol = match self.get(Cell::new(row, col)) {
                    None => ".".to_string(),
                    Some(tile) => {
                        let marker = match tile.kind() {
                            TileKind::Normal => "",
                            TileKind::Wildcard => "*",
                            TileKind::Converter => "~",
                        };
                        format!("{}{}{}", tile.value(), tile.color().letter(), marker)
                    }
                };
                result.push_str(&format!("{symbol:>7}"));
            }
            if row + 1 < self.size {
                result.push('\n');
            }
        }
        result
    }
}
