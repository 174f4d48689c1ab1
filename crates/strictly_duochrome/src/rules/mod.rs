//! Game rules.
//!
//! Pure functions that judge tiles and boards: which pairs may merge, what
//! color a merge produces, and when no action can change the board. Rules
//! are separated from the move engine so contracts and the termination
//! check can share them.

pub mod merge;
pub mod termination;

pub use merge::{COLOR_FLIP_VALUES, MAX_MERGEABLE_VALUE, can_merge, compatible, merge_color};
pub use termination::{is_blocked, recolor_possible, should_end};
