//! First-class invariants over [`GameState`].
//!
//! Each invariant is a logical property that must hold between turns. They
//! are checked as postconditions in debug builds and tested independently.

use crate::state::GameState;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants checked together.
///
/// Implemented for tuples of two and three invariants.
pub trait InvariantSet<S> {
    /// Checks every invariant in the set, collecting all violations.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

fn collect(violations: Vec<InvariantViolation>) -> Result<(), Vec<InvariantViolation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }
        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }
        if !I3::holds(state) {
            violations.push(InvariantViolation::new(I3::description()));
        }
        collect(violations)
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }
        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }
        collect(violations)
    }
}

pub mod positions_consistent;
pub mod tile_values;
pub mod unique_ids;

pub use positions_consistent::PositionsConsistent;
pub use tile_values::TileValuesValid;
pub use unique_ids::UniqueTileIds;

/// Every invariant that must hold between turns.
pub type DuochromeInvariants = (PositionsConsistent, UniqueTileIds, TileValuesValid);

/// Runs [`DuochromeInvariants`] against a state.
pub fn check_state(state: &GameState) -> Result<(), Vec<InvariantViolation>> {
    DuochromeInvariants::check_all(state)
}
