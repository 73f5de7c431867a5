//! Error taxonomy for session operations.
//!
//! Three families of failures:
//! - precondition failures: the operation is illegal right now (wrong phase,
//!   wrong seat, full zone, unpayable cost). Nothing is mutated.
//! - missing-data failures: a card or slot that should exist does not.
//! - decision-state failures: the single outstanding decision slot is
//!   occupied, empty, or answered with the wrong response kind.
//!
//! A human declining an optional choice is *not* an error — it resolves the
//! pending request with an empty result. Faults inside a computer turn are
//! caught by the turn driver and force the turn to its end step instead of
//! propagating out of the session.

use crate::cards::CardId;
use crate::core::Seat;
use crate::state::Phase;

/// Errors returned by session operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The operation is not legal in the current phase.
    #[error("operation not legal in {0:?} phase")]
    IllegalPhase(Phase),

    /// The acting seat is not the active seat.
    #[error("{0} is not the active seat")]
    NotYourTurn(Seat),

    /// The game has already ended.
    #[error("game is over")]
    GameOver,

    /// A zone is at capacity (battlefield or energy area).
    #[error("zone is full")]
    ZoneFull,

    /// The player cannot pay the card's cost.
    #[error("cost cannot be paid")]
    CannotPayCost,

    /// An energy card was already played this turn.
    #[error("an energy card was already played this turn")]
    EnergyAlreadyPlayed,

    /// No card at the referenced hand or battlefield position.
    #[error("no card at the referenced position")]
    EmptySlot,

    /// The attacker is tapped and cannot act.
    #[error("attacker is tapped")]
    AttackerTapped,

    /// The attacker has no power and cannot attack.
    #[error("attacker has no power")]
    Powerless,

    /// The friend was played this turn and cannot attack yet.
    #[error("friend has summoning sickness")]
    SummoningSickness,

    /// A decision request is already outstanding.
    #[error("a decision request is already pending")]
    DecisionPending,

    /// No decision request is outstanding, or the response kind is wrong.
    #[error("no matching decision request is pending")]
    NoSuchDecision,

    /// A human selection does not satisfy what was asked of it.
    #[error("selection is invalid: {0}")]
    SelectionInvalid(&'static str),

    /// A mandatory request cannot be cancelled.
    #[error("decision is mandatory and cannot be cancelled")]
    MandatoryDecision,

    /// The seat already took its mulligan.
    #[error("{0} already took a mulligan")]
    MulliganUsed(Seat),

    /// The card id is not in the catalog.
    #[error("card {0:?} not found in catalog")]
    CardNotFound(CardId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            GameError::NotYourTurn(Seat::Second).to_string(),
            "seat 2 is not the active seat"
        );
        assert_eq!(
            GameError::SelectionInvalid("short").to_string(),
            "selection is invalid: short"
        );
    }
}
