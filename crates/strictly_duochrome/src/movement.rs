//! Slide and merge resolution.
//!
//! A move walks every tile in traversal order, front-most first, so a tile
//! always sees the settled position of the tiles ahead of it. Each tile
//! either merges into the first tile beyond its empty run, slides to the end
//! of that run, or stays put. A tile absorbs at most one merge per move.

use crate::action::Direction;
use crate::grid::{Cell, Grid};
use crate::rules::{can_merge, compatible, merge_color};
use crate::state::GameState;
use crate::tile::{TileColor, TileId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Row and column visiting order for one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traversal {
    /// Row indices in visiting order.
    pub rows: Vec<usize>,
    /// Column indices in visiting order.
    pub cols: Vec<usize>,
}

/// Builds the visiting order: ascending, except rows reverse for `Down`
/// and columns reverse for `Right`.
pub fn traversal_order(direction: Direction, size: usize) -> Traversal {
    let mut rows: Vec<usize> = (0..size).collect();
    let mut cols: Vec<usize> = (0..size).collect();
    match direction {
        Direction::Down => rows.reverse(),
        Direction::Right => cols.reverse(),
        Direction::Up | Direction::Left => {}
    }
    Traversal { rows, cols }
}

/// Where a tile's empty run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Farthest {
    /// Last empty cell reached, or the start cell if the way is blocked.
    pub farthest: Cell,
    /// The occupied cell just beyond the run, if still inside the grid.
    pub next: Option<Cell>,
}

/// Walks from `start` in `direction` through empty cells.
pub fn find_farthest(grid: &Grid, start: Cell, direction: Direction) -> Farthest {
    let mut farthest = start;
    let mut probe = grid.neighbor(start, direction);
    while let Some(cell) = probe {
        if !grid.is_empty_cell(cell) {
            break;
        }
        farthest = cell;
        probe = grid.neighbor(cell, direction);
    }
    Farthest {
        farthest,
        next: probe,
    }
}

/// One merge, as a presentation layer would want to animate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeEvent {
    /// Tile that absorbed the merge and keeps its id.
    pub survivor: TileId,
    /// Tile that was destroyed.
    pub consumed: TileId,
    /// Where the survivor sits.
    pub cell: Cell,
    /// Value after the merge.
    pub value: u32,
    /// Color after the merge.
    pub color: TileColor,
    /// Points added (value times the combo multiplier).
    pub points: u64,
    /// Neighbors whose color a converter flipped.
    pub converter_flips: Vec<Cell>,
}

/// Aggregate result of one move.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Any tile moved or merged.
    pub changed: bool,
    /// At least one merge happened.
    pub merged: bool,
    /// Points added to the score by this move.
    pub score_gained: u64,
    /// Every merge in resolution order.
    pub merges: Vec<MergeEvent>,
}

/// Slides every tile in `direction`, resolving merges and scoring them.
///
/// Does not spawn a tile, touch the combo multiplier, or check for game
/// over; those belong to the caller. A move that changes nothing leaves the
/// grid exactly as it was, apart from clearing `merged_this_move` flags.
#[instrument(skip(state, rng), fields(score = state.score))]
pub fn slide<R: Rng>(state: &mut GameState, direction: Direction, rng: &mut R) -> MoveOutcome {
    for tile in state.grid.tiles_mut() {
        tile.clear_merged();
    }

    let mut outcome = MoveOutcome::default();
    let order = traversal_order(direction, state.grid.size());

    for &row in &order.rows {
        for &col in &order.cols {
            let cell = Cell::new(row, col);
            if state.grid.get(cell).is_none() {
                continue;
            }
            let Farthest { farthest, next } = find_farthest(&state.grid, cell, direction);

            if let Some(next) = next
                && can_merge(state.grid.get(cell), state.grid.get(next))
                && let Some(event) = merge_tiles(state, cell, next, rng)
            {
                outcome.score_gained += event.points;
                outcome.merges.push(event);
                outcome.changed = true;
                outcome.merged = true;
            } else if farthest != cell {
                debug!(from = %cell, to = %farthest, "Slide");
                state.grid.relocate(cell, farthest);
                outcome.changed = true;
            }
        }
    }

    debug!(
        changed = outcome.changed,
        merged = outcome.merged,
        gained = outcome.score_gained,
        "Move resolved"
    );
    outcome
}

/// Merges the tile at `from` into the tile at `to`.
///
/// The caller has already checked [`can_merge`]. The survivor keeps its id
/// and position; `from` is removed from the grid. Returns `None`, touching
/// nothing, if either cell is empty or the doubled value would not fit.
fn merge_tiles<R: Rng>(
    state: &mut GameState,
    from: Cell,
    to: Cell,
    rng: &mut R,
) -> Option<MergeEvent> {
    let moving = state.grid.get(from)?;
    let target = state.grid.get(to)?;

    let new_value = target.value().checked_mul(2)?;
    let color = merge_color(moving, target, new_value, rng);
    let converter = moving.kind().is_converter() || target.kind().is_converter();
    let survivor = target.id();
    let consumed = moving.id();

    state.grid.take(from);
    state.grid.get_mut(to)?.absorb(new_value, color);
    let points = state.add_points(new_value);

    let converter_flips = if converter {
        apply_converter_effect(&mut state.grid, to)
    } else {
        Vec::new()
    };

    debug!(
        %survivor,
        %consumed,
        cell = %to,
        new_value,
        %color,
        points,
        flips = converter_flips.len(),
        "Merge"
    );

    Some(MergeEvent {
        survivor,
        consumed,
        cell: to,
        value: new_value,
        color,
        points,
        converter_flips,
    })
}

/// Flips the color of every occupied orthogonal neighbor of `cell`.
///
/// Runs once per converter merge and never cascades, even when a flipped
/// neighbor is itself a converter.
pub fn apply_converter_effect(grid: &mut Grid, cell: Cell) -> Vec<Cell> {
    let neighbors: Vec<Cell> = grid.neighbors(cell).collect();
    let mut flipped = Vec::new();
    for neighbor in neighbors {
        if let Some(tile) = grid.get_mut(neighbor) {
            tile.flip_color();
            flipped.push(neighbor);
        }
    }
    flipped
}

/// True if sliding in `direction` would change the board.
///
/// Judged without mutating the grid or drawing randomness: some tile must
/// have an empty cell or a compatible tile directly ahead of it.
pub fn can_slide(grid: &Grid, direction: Direction) -> bool {
    grid.occupied().any(|(cell, tile)| {
        grid.neighbor(cell, direction).is_some_and(|ahead| match grid.get(ahead) {
            None => true,
            Some(other) => compatible(tile, other),
        })
    })
}

/// Directions that would change the board, in [`Direction::ALL`] order.
pub fn legal_directions(grid: &Grid) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|d| can_slide(grid, *d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::tile::{Tile, TileKind};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn state(size: usize) -> GameState {
        GameState::new(RulesConfig::with_grid_size(size))
    }

    fn put(
        state: &mut GameState,
        row: usize,
        col: usize,
        value: u32,
        color: TileColor,
        kind: TileKind,
    ) -> TileId {
        let id = state.next_tile_id();
        state
            .grid_mut()
            .set(Cell::new(row, col), Some(Tile::new(id, value, color, kind)))
            .unwrap();
        id
    }

    fn value_at(state: &GameState, row: usize, col: usize) -> Option<u32> {
        state.grid().get(Cell::new(row, col)).map(|t| t.value())
    }

    #[test]
    fn test_traversal_order() {
        let t = traversal_order(Direction::Down, 3);
        assert_eq!(t.rows, vec![2, 1, 0]);
        assert_eq!(t.cols, vec![0, 1, 2]);
        let t = traversal_order(Direction::Right, 3);
        assert_eq!(t.rows, vec![0, 1, 2]);
        assert_eq!(t.cols, vec![2, 1, 0]);
        assert_eq!(traversal_order(Direction::Up, 3).rows, vec![0, 1, 2]);
        assert_eq!(traversal_order(Direction::Left, 3).cols, vec![0, 1, 2]);
    }

    #[test]
    fn test_find_farthest() {
        let mut s = state(4);
        put(&mut s, 0, 3, 2, TileColor::Red, TileKind::Normal);
        put(&mut s, 0, 0, 2, TileColor::Red, TileKind::Normal);
        let f = find_farthest(s.grid(), Cell::new(0, 3), Direction::Left);
        assert_eq!(f.farthest, Cell::new(0, 1));
        assert_eq!(f.next, Some(Cell::new(0, 0)));

        let f = find_farthest(s.grid(), Cell::new(0, 0), Direction::Left);
        assert_eq!(f.farthest, Cell::new(0, 0));
        assert_eq!(f.next, None);
    }

    #[test]
    fn test_slide_without_merge() {
        let mut s = state(4);
        let mut rng = StdRng::seed_from_u64(0);
        let id = put(&mut s, 2, 2, 2, TileColor::Red, TileKind::Normal);
        let outcome = slide(&mut s, Direction::Up, &mut rng);
        assert!(outcome.changed);
        assert!(!outcome.merged);
        let tile = s.grid().get(Cell::new(0, 2)).unwrap();
        assert_eq!(tile.id(), id);
        assert_eq!(tile.cell(), Cell::new(0, 2));
    }

    #[test]
    fn test_no_chain_merge() {
        // 2 2 4 -> 4 4, not 8.
        let mut s = state(4);
        let mut rng = StdRng::seed_from_u64(0);
        put(&mut s, 0, 0, 2, TileColor::Red, TileKind::Normal);
        put(&mut s, 0, 1, 2, TileColor::Red, TileKind::Normal);
        put(&mut s, 0, 2, 4, TileColor::Red, TileKind::Normal);
        let outcome = slide(&mut s, Direction::Left, &mut rng);
        assert_eq!(outcome.merges.len(), 1);
        assert_eq!(value_at(&s, 0, 0), Some(4));
        assert_eq!(value_at(&s, 0, 1), Some(4));
        assert_eq!(value_at(&s, 0, 2), None);
    }

    #[test]
    fn test_four_equal_tiles_make_two_merges() {
        let mut s = state(4);
        let mut rng = StdRng::seed_from_u64(0);
        for col in 0..4 {
            put(&mut s, 1, col, 2, TileColor::Blue, TileKind::Normal);
        }
        let outcome = slide(&mut s, Direction::Right, &mut rng);
        assert_eq!(outcome.merges.len(), 2);
        assert_eq!(value_at(&s, 1, 3), Some(4));
        assert_eq!(value_at(&s, 1, 2), Some(4));
        assert_eq!(value_at(&s, 1, 1), None);
        assert_eq!(outcome.score_gained, 8);
    }

    #[test]
    fn test_survivor_keeps_id_and_consumed_is_gone() {
        let mut s = state(4);
        let mut rng = StdRng::seed_from_u64(0);
        let front = put(&mut s, 3, 0, 8, TileColor::Red, TileKind::Normal);
        let back = put(&mut s, 1, 0, 8, TileColor::Red, TileKind::Normal);
        let outcome = slide(&mut s, Direction::Down, &mut rng);
        let event = &outcome.merges[0];
        assert_eq!(event.survivor, front);
        assert_eq!(event.consumed, back);
        assert_eq!(s.grid().get(Cell::new(3, 0)).unwrap().id(), front);
        assert!(s.grid().tiles().all(|t| t.id() != back));
    }

    #[test]
    fn test_score_uses_combo_for_every_merge() {
        let mut s = state(4);
        let mut rng = StdRng::seed_from_u64(0);
        s.combo_multiplier = 3;
        put(&mut s, 0, 0, 2, TileColor::Red, TileKind::Normal);
        put(&mut s, 0, 1, 2, TileColor::Red, TileKind::Normal);
        put(&mut s, 1, 0, 4, TileColor::Blue, TileKind::Normal);
        put(&mut s, 1, 1, 4, TileColor::Blue, TileKind::Normal);
        let outcome = slide(&mut s, Direction::Left, &mut rng);
        assert_eq!(outcome.score_gained, 4 * 3 + 8 * 3);
        assert_eq!(s.score(), 36);
    }

    #[test]
    fn test_merge_destroys_destination_special() {
        let mut s = state(4);
        let mut rng = StdRng::seed_from_u64(0);
        put(&mut s, 0, 0, 2, TileColor::Red, TileKind::Wildcard);
        put(&mut s, 0, 1, 2, TileColor::Blue, TileKind::Normal);
        slide(&mut s, Direction::Left, &mut rng);
        let tile = s.grid().get(Cell::new(0, 0)).unwrap();
        assert_eq!(tile.kind(), TileKind::Normal);
        assert_eq!(tile.value(), 4);
        // One wildcard: the other tile's color wins.
        assert_eq!(tile.color(), TileColor::Blue);
    }

    #[test]
    fn test_converter_flips_by_positions_at_merge_time() {
        let mut s = state(5);
        let mut rng = StdRng::seed_from_u64(0);
        // Row 1 resolves before row 2, so its 8 already sits at (1,0) when
        // the converter lands on (2,0). Row 3 moves afterwards and is spared.
        put(&mut s, 2, 2, 4, TileColor::Red, TileKind::Normal);
        put(&mut s, 2, 4, 4, TileColor::Red, TileKind::Converter);
        put(&mut s, 1, 2, 8, TileColor::Red, TileKind::Normal);
        put(&mut s, 3, 2, 16, TileColor::Blue, TileKind::Converter);
        let outcome = slide(&mut s, Direction::Left, &mut rng);

        assert_eq!(outcome.merges.len(), 1);
        let event = &outcome.merges[0];
        assert_eq!(event.cell, Cell::new(2, 0));
        assert_eq!(event.converter_flips, vec![Cell::new(1, 0)]);

        let color = |r, c| s.grid().get(Cell::new(r, c)).unwrap().color();
        assert_eq!(color(1, 0), TileColor::Blue);
        assert_eq!(color(3, 0), TileColor::Blue);
    }

    #[test]
    fn test_converter_cascade_exact_cells() {
        let mut s = state(5);
        let mut rng = StdRng::seed_from_u64(0);
        // Row 0 pins the neighbors of (1,2) so only column 2 merges.
        put(&mut s, 0, 1, 64, TileColor::Red, TileKind::Normal);
        put(&mut s, 0, 2, 2, TileColor::Red, TileKind::Normal);
        put(&mut s, 0, 3, 128, TileColor::Blue, TileKind::Normal);
        put(&mut s, 1, 1, 2, TileColor::Red, TileKind::Converter);
        put(&mut s, 1, 2, 4, TileColor::Blue, TileKind::Normal);
        put(&mut s, 1, 3, 2, TileColor::Blue, TileKind::Normal);
        put(&mut s, 2, 2, 4, TileColor::Blue, TileKind::Converter);
        let outcome = slide(&mut s, Direction::Up, &mut rng);

        assert_eq!(outcome.merges.len(), 1);
        let event = &outcome.merges[0];
        assert_eq!(event.cell, Cell::new(1, 2));
        assert_eq!(event.value, 8);
        assert_eq!(event.color, TileColor::Blue);
        let mut flips = event.converter_flips.clone();
        flips.sort();
        assert_eq!(flips, vec![Cell::new(0, 2), Cell::new(1, 1), Cell::new(1, 3)]);

        let color = |r, c| s.grid().get(Cell::new(r, c)).unwrap().color();
        assert_eq!(color(0, 2), TileColor::Blue);
        assert_eq!(color(1, 1), TileColor::Blue);
        assert_eq!(color(1, 3), TileColor::Red);
        assert_eq!(color(0, 1), TileColor::Red);
        assert_eq!(color(0, 3), TileColor::Blue);
        // The flipped converter keeps its kind and does not fire again.
        let flipped = s.grid().get(Cell::new(1, 1)).unwrap();
        assert_eq!(flipped.kind(), TileKind::Converter);
        assert_eq!(s.grid().get(Cell::new(1, 2)).unwrap().kind(), TileKind::Normal);
    }

    #[test]
    fn test_largest_tiles_slide_without_merging() {
        let mut s = state(4);
        let mut rng = StdRng::seed_from_u64(0);
        let top = 1 << 31;
        put(&mut s, 0, 0, top, TileColor::Red, TileKind::Normal);
        put(&mut s, 0, 2, top, TileColor::Red, TileKind::Normal);
        let outcome = slide(&mut s, Direction::Left, &mut rng);
        assert!(outcome.changed);
        assert!(!outcome.merged);
        assert_eq!(value_at(&s, 0, 0), Some(top));
        assert_eq!(value_at(&s, 0, 1), Some(top));
        assert_eq!(s.score(), 0);
        assert!(!can_slide(s.grid(), Direction::Left));
    }

    #[test]
    fn test_settled_board_second_move_is_noop() {
        let mut s = state(4);
        let mut rng = StdRng::seed_from_u64(0);
        put(&mut s, 3, 1, 2, TileColor::Red, TileKind::Normal);
        put(&mut s, 0, 1, 4, TileColor::Blue, TileKind::Normal);
        put(&mut s, 2, 3, 8, TileColor::Red, TileKind::Normal);
        assert!(slide(&mut s, Direction::Down, &mut rng).changed);
        let snapshot = s.grid().clone();
        let outcome = slide(&mut s, Direction::Down, &mut rng);
        assert!(!outcome.changed);
        assert_eq!(s.grid(), &snapshot);
    }

    #[test]
    fn test_can_slide_matches_slide() {
        let mut s = state(3);
        put(&mut s, 0, 0, 2, TileColor::Red, TileKind::Normal);
        put(&mut s, 0, 1, 4, TileColor::Red, TileKind::Normal);
        assert!(!can_slide(s.grid(), Direction::Up));
        assert!(!can_slide(s.grid(), Direction::Left));
        assert!(can_slide(s.grid(), Direction::Down));
        assert!(can_slide(s.grid(), Direction::Right));
        assert_eq!(
            legal_directions(s.grid()),
            vec![Direction::Down, Direction::Right]
        );
    }
}
