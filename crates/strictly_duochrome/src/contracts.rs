//! Contract-based validation for player actions.
//!
//! Preconditions decide whether an action may be attempted at all.
//! Postconditions compare the state before and after a turn.

use crate::action::{Action, ActionError};
use crate::invariants::{DuochromeInvariants, InvariantSet};
use crate::state::GameState;
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// Preconditions and postconditions for a state transition.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), ActionError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), ActionError>;
}

// ─────────────────────────────────────────────────────────────
//  Action Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the game has not been declared over.
pub struct GameNotOver;

impl GameNotOver {
    /// Fails with [`ActionError::GameOver`] on a finished game.
    #[instrument(skip(state))]
    pub fn check(state: &GameState) -> Result<(), ActionError> {
        if state.is_game_over() {
            warn!("Action on a finished game");
            Err(ActionError::GameOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: a recolor use is left.
pub struct RecolorAvailable;

impl RecolorAvailable {
    /// Fails with [`ActionError::NoRecolorsRemaining`] once the budget is spent.
    #[instrument(skip(state))]
    pub fn check(state: &GameState) -> Result<(), ActionError> {
        if state.color_change_moves_remaining() == 0 {
            warn!("Recolor requested with no uses left");
            Err(ActionError::NoRecolorsRemaining)
        } else {
            Ok(())
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Action Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for one turn.
///
/// Preconditions:
/// - The game is not over
/// - A recolor has a use left to spend
///
/// Postconditions:
/// - [`DuochromeInvariants`] hold
/// - Score never decreases
/// - The recolor budget never grows
pub struct ActionContract;

impl Contract<GameState, Action> for ActionContract {
    fn pre(state: &GameState, action: &Action) -> Result<(), ActionError> {
        GameNotOver::check(state)?;
        if let Action::Recolor(_) = action {
            RecolorAvailable::check(state)?;
        }
        Ok(())
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), ActionError> {
        DuochromeInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            ActionError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })?;

        if after.score() < before.score() {
            return Err(ActionError::InvariantViolation(format!(
                "Score decreased from {} to {}",
                before.score(),
                after.score()
            )));
        }
        if after.color_change_moves_remaining() > before.color_change_moves_remaining() {
            return Err(ActionError::InvariantViolation(
                "Recolor budget increased".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Direction, Line};
    use crate::config::RulesConfig;

    #[test]
    fn test_precondition_fresh_game() {
        let state = GameState::new(RulesConfig::default());
        assert!(ActionContract::pre(&state, &Action::Slide(Direction::Up)).is_ok());
        assert!(ActionContract::pre(&state, &Action::Recolor(Line::row(1))).is_ok());
    }

    #[test]
    fn test_precondition_game_over() {
        let mut state = GameState::new(RulesConfig::default());
        state.game_over = true;
        assert_eq!(
            ActionContract::pre(&state, &Action::Slide(Direction::Left)),
            Err(ActionError::GameOver)
        );
    }

    #[test]
    fn test_precondition_no_recolors_only_blocks_recolor() {
        let state = GameState::new(RulesConfig::default().with_color_change_moves(0));
        assert_eq!(
            ActionContract::pre(&state, &Action::Recolor(Line::col(2))),
            Err(ActionError::NoRecolorsRemaining)
        );
        assert!(ActionContract::pre(&state, &Action::Slide(Direction::Down)).is_ok());
    }

    #[test]
    fn test_postcondition_catches_score_drop() {
        let mut before = GameState::new(RulesConfig::default());
        before.score = 40;
        let after = GameState::new(RulesConfig::default());
        assert!(matches!(
            ActionContract::post(&before, &after),
            Err(ActionError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_postcondition_catches_budget_growth() {
        let mut before = GameState::new(RulesConfig::default());
        before.color_change_moves_remaining = 2;
        let after = GameState::new(RulesConfig::default());
        assert!(ActionContract::post(&before, &after).is_err());
        assert!(ActionContract::post(&after, &after).is_ok());
    }
}
