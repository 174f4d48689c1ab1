//! First-class action types.
//!
//! Actions are the player's intent: slide the whole board in a direction,
//! or spend one recolor use on a row or column. They can be validated
//! before they are applied and logged afterwards.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Direction tiles slide in.
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
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward row 0.
    Up,
    /// Toward the last row.
    Down,
    /// Toward column 0.
    Left,
    /// Toward the last column.
    Right,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Row and column step for one cell of travel.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// Which kind of line a recolor targets.
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
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// A horizontal line.
    #[strum(to_string = "row", serialize = "r")]
    Row,
    /// A vertical line.
    #[strum(to_string = "col", serialize = "column", serialize = "c")]
    Col,
}

/// A row or column addressed the way players see it: 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    /// Row or column.
    pub axis: Axis,
    /// 1-based index along the other axis.
    pub index: usize,
}

impl Line {
    /// Creates a line reference.
    pub fn new(axis: Axis, index: usize) -> Self {
        Self { axis, index }
    }

    /// A row, 1-based.
    pub fn row(index: usize) -> Self {
        Self::new(Axis::Row, index)
    }

    /// A column, 1-based.
    pub fn col(index: usize) -> Self {
        Self::new(Axis::Col, index)
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.axis, self.index)
    }
}

/// A player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Slide every tile in a direction.
    Slide(Direction),
    /// Flip the color of every tile along a line.
    Recolor(Line),
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Slide(direction) => write!(f, "slide {}", direction),
            Action::Recolor(line) => write!(f, "recolor {}", line),
        }
    }
}

/// Parse error for textual actions.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Unrecognized action: {:?}", input)]
pub struct ParseActionError {
    /// The text that failed to parse.
    pub input: String,
}

impl FromStr for Action {
    type Err = ParseActionError;

    /// Accepts `up|down|left|right`, `w|a|s|d`, and `row N` / `col N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseActionError {
            input: s.to_string(),
        };
        let mut words = s.split_whitespace();
        let head = words.next().ok_or_else(err)?;

        let slide = match head.to_ascii_lowercase().as_str() {
            "w" => Some(Direction::Up),
            "a" => Some(Direction::Left),
            "s" => Some(Direction::Down),
            "d" => Some(Direction::Right),
            other => Direction::from_str(other).ok(),
        };
        if let Some(direction) = slide {
            return match words.next() {
                None => Ok(Action::Slide(direction)),
                Some(_) => Err(err()),
            };
        }

        let axis = Axis::from_str(head).map_err(|_| err())?;
        let index = words
            .next()
            .and_then(|w| w.parse::<usize>().ok())
            .ok_or_else(err)?;
        if words.next().is_some() {
            return Err(err());
        }
        Ok(Action::Recolor(Line::new(axis, index)))
    }
}

/// Error that can occur when validating or applying an action.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ActionError {
    /// The game is already over.
    #[display("Game is already over")]
    GameOver,

    /// All recolor uses have been spent.
    #[display("No recolor moves remaining")]
    NoRecolorsRemaining,

    /// An invariant was violated (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for ActionError {}
