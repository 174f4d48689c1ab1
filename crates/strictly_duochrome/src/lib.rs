//! Strictly Duochrome - a two-color 2048 rules engine
//!
//! Tiles carry a value and one of two colors. Equal tiles merge only when
//! their colors match, unless one of them is a wildcard. Converter tiles
//! flip the colors around their merge, and a limited recolor power flips a
//! whole row or column.
//!
//! # Architecture
//!
//! - **Grid / Tile**: the board and its pieces, with stable tile ids
//! - **Spawner**: weighted random placement of new tiles
//! - **Movement**: traversal order, slide and merge resolution, converters
//! - **Recolor**: the row/column color flip
//! - **Rules**: merge eligibility, merge color, termination detection
//! - **Engine**: the functions an orchestrator calls on a [`GameState`]
//! - **Typestate**: `GameSetup → GameInProgress → GameFinished`, one full
//!   turn per [`Action`], guarded by contracts and invariants
//!
//! # Example
//!
//! ```
//! use strictly_duochrome::{Action, Direction, GameResult, GameSetup, RulesConfig};
//!
//! let game = GameSetup::new(RulesConfig::default()).unwrap().start_seeded(42);
//! match game.apply(Action::Slide(Direction::Left)).unwrap() {
//!     GameResult::InProgress(game) => assert_eq!(game.turns(), 1),
//!     GameResult::Finished(done) => println!("final score {}", done.score()),
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod action;
mod config;
mod contracts;
mod engine;
mod grid;
mod invariants;
mod movement;
mod recolor;
mod rules;
mod spawn;
mod state;
mod tile;
mod typestate;

// Crate-level exports - Actions
pub use action::{Action, ActionError, Axis, Direction, Line, ParseActionError};

// Crate-level exports - Configuration
pub use config::{ComboPolicy, ConfigError, RulesConfig, SpawnWeights};

// Crate-level exports - Board
pub use grid::{Cell, Grid, GridError};
pub use tile::{Tile, TileColor, TileId, TileKind};

// Crate-level exports - State and spawning
pub use spawn::{Spawned, Spawner};
pub use state::{GameState, TileIdGenerator};

// Crate-level exports - Engine operations
pub use engine::{
    change_line, check_game_over, init_game, init_game_with, is_game_over, move_tiles,
    settle_combo, try_spawn,
};
pub use movement::{
    Farthest, MergeEvent, MoveOutcome, Traversal, apply_converter_effect, can_slide,
    find_farthest, legal_directions, slide, traversal_order,
};
pub use rules::{
    COLOR_FLIP_VALUES, MAX_MERGEABLE_VALUE, can_merge, compatible, is_blocked, merge_color,
    recolor_possible, should_end,
};

// Crate-level exports - Typestate orchestration
pub use typestate::{GameFinished, GameInProgress, GameResult, GameSetup, TurnReport};

// Crate-level exports - Contracts and invariants
pub use contracts::{ActionContract, Contract, GameNotOver, RecolorAvailable};
pub use invariants::{
    DuochromeInvariants, Invariant, InvariantSet, InvariantViolation, PositionsConsistent,
    TileValuesValid, UniqueTileIds, check_state,
};

/// Flips every tile along a line of a bare grid, without touching any budget.
///
/// Re-exported under a distinct name from [`change_line`], which spends a
/// recolor use on a [`GameState`].
pub use recolor::change_line as recolor_grid_line;
