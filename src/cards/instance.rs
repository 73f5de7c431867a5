//! Card instances - physical copies in a game.
//!
//! A `CardInstance` is one physical copy of a definition, owned by exactly
//! one seat and sitting in exactly one zone at any time. Zone membership is
//! tracked by stable instance id, never by array position, so cards keep
//! their identity as zones reorder around them.

use serde::{Deserialize, Serialize};

use super::definition::CardId;
use crate::core::Seat;

/// Unique identifier for a card instance within a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl InstanceId {
    /// Create a new instance ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Instance({})", self.0)
    }
}

/// The zones a card instance can occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    /// Face-down draw pile; ordered, drawn from the top.
    Deck,
    /// Hidden hand.
    Hand,
    /// Battlefield friend slots.
    Friends,
    /// Committed resource slots.
    Energy,
    /// Discard pile; insertion-ordered.
    Graveyard,
    /// Damage accumulator; face-up cards double as resources.
    NegativeEnergy,
    /// The single continuous-effect slot.
    Field,
}

/// A single physical copy of a card in a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique ID for this copy.
    pub id: InstanceId,

    /// The catalog definition this copy prints.
    pub card: CardId,

    /// The seat that owns this copy (fixed for the whole game).
    pub owner: Seat,

    /// Current zone.
    pub zone: Zone,
}

impl CardInstance {
    /// Create an instance in its owner's deck.
    #[must_use]
    pub fn new(id: InstanceId, card: CardId, owner: Seat) -> Self {
        Self { id, card, owner, zone: Zone::Deck }
    }
}
