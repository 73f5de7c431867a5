//! The decision gateway boundary.
//!
//! When a human must choose, the session parks one of these requests and
//! suspends the operation that raised it. The embedding UI reads the
//! pending request and answers through the session's matching `resolve_*`
//! or `cancel_*` method. At most one request is outstanding at a time,
//! enforced by the session.

use serde::{Deserialize, Serialize};

use crate::abilities::TargetQuery;
use crate::cards::{CostProfile, InstanceId};
use crate::core::Seat;

/// Ask the defender whether to block an incoming attack, and with what.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingRequest {
    pub attacking_seat: Seat,
    pub attacker: InstanceId,
    /// The defender's untapped friends.
    pub candidate_blockers: Vec<InstanceId>,
}

/// Ask the defender whether to play a counter card against an unblocked
/// attack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRequest {
    pub attacker: InstanceId,
    /// Counter-usable, payable cards in the defender's hand.
    pub candidates: Vec<InstanceId>,
}

/// Ask the player which energy sources pay for a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSelectionRequest {
    /// The hand card being paid for.
    pub card: InstanceId,
    pub cost: CostProfile,
}

/// Ask the player to choose targets for a resolving ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSelectionRequest {
    /// The instance whose ability is resolving.
    pub source: InstanceId,
    pub query: TargetQuery,
}

/// The single outstanding interactive request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionRequest {
    Blocking(BlockingRequest),
    Counter(CounterRequest),
    CostSelection(CostSelectionRequest),
    TargetSelection(TargetSelectionRequest),
}

impl DecisionRequest {
    /// Short name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DecisionRequest::Blocking(_) => "blocking",
            DecisionRequest::Counter(_) => "counter",
            DecisionRequest::CostSelection(_) => "cost selection",
            DecisionRequest::TargetSelection(_) => "target selection",
        }
    }

    /// Whether the request may be cancelled (answered with nothing).
    #[must_use]
    pub fn cancellable(&self) -> bool {
        match self {
            DecisionRequest::Blocking(_)
            | DecisionRequest::Counter(_)
            | DecisionRequest::CostSelection(_) => true,
            DecisionRequest::TargetSelection(req) => !req.query.mandatory,
        }
    }
}
