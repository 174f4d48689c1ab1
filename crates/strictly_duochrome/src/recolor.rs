//! The recolor power: flip every tile along one row or column.

use crate::action::Axis;
use crate::grid::{Cell, Grid};
use tracing::{debug, instrument, warn};

/// Flips the color of every tile in the given line.
///
/// `index` is 1-based. Returns `true` iff at least one tile was flipped, so
/// an index of 0, an index past the last line, and an empty line all return
/// `false` and leave the grid untouched.
#[instrument(skip(grid), fields(size = grid.size()))]
pub fn change_line(grid: &mut Grid, axis: Axis, index: usize) -> bool {
    let size = grid.size();
    let Some(line) = index.checked_sub(1).filter(|i| *i < size) else {
        warn!(index, "Recolor index out of range");
        return false;
    };

    let mut flipped = 0usize;
    for offset in 0..size {
        let cell = match axis {
            Axis::Row => Cell::new(line, offset),
            Axis::Col => Cell::new(offset, line),
        };
        if let Some(tile) = grid.get_mut(cell) {
            tile.flip_color();
            flipped += 1;
        }
    }
    debug!(flipped, "Line recolored");
    flipped > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Tile, TileColor, TileId, TileKind};

    fn grid_with(cells: &[(usize, usize, TileColor)]) -> Grid {
        let mut grid = Grid::new(4);
        for (i, (row, col, color)) in cells.iter().enumerate() {
            grid.set(
                Cell::new(*row, *col),
                Some(Tile::new(TileId(i as u64), 2, *color, TileKind::Normal)),
            )
            .unwrap();
        }
        grid
    }

    #[test]
    fn test_row_flip_only_touches_that_row() {
        let mut grid = grid_with(&[
            (1, 0, TileColor::Red),
            (1, 3, TileColor::Blue),
            (2, 0, TileColor::Red),
        ]);
        assert!(change_line(&mut grid, Axis::Row, 2));
        assert_eq!(grid.get(Cell::new(1, 0)).unwrap().color(), TileColor::Blue);
        assert_eq!(grid.get(Cell::new(1, 3)).unwrap().color(), TileColor::Red);
        assert_eq!(grid.get(Cell::new(2, 0)).unwrap().color(), TileColor::Red);
    }

    #[test]
    fn test_column_flip() {
        let mut grid = grid_with(&[(0, 3, TileColor::Red), (3, 3, TileColor::Red)]);
        assert!(change_line(&mut grid, Axis::Col, 4));
        assert!(grid.tiles().all(|t| t.color() == TileColor::Blue));
    }

    #[test]
    fn test_flip_twice_restores() {
        let mut grid = grid_with(&[(0, 0, TileColor::Red), (0, 2, TileColor::Blue)]);
        let before = grid.clone();
        change_line(&mut grid, Axis::Row, 1);
        change_line(&mut grid, Axis::Row, 1);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mut grid = grid_with(&[(0, 0, TileColor::Red)]);
        let before = grid.clone();
        assert!(!change_line(&mut grid, Axis::Row, 0));
        assert!(!change_line(&mut grid, Axis::Col, 5));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_empty_line_is_a_noop() {
        let mut grid = grid_with(&[(0, 0, TileColor::Red)]);
        assert!(!change_line(&mut grid, Axis::Row, 3));
        assert_eq!(grid.get(Cell::new(0, 0)).unwrap().color(), TileColor::Red);
    }
}
