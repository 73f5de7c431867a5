//! Per-seat board state: zones and battlefield slots.
//!
//! Zone membership is a list of stable instance ids (or a slot wrapping
//! one); moving a card is a remove-by-id / append-by-id pair. Deck order is
//! meaningful (front = top); graveyard and negative-energy order is
//! insertion order.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::InstanceId;

/// Maximum friends on the battlefield.
pub const MAX_FRIENDS: usize = 10;
/// Maximum committed energy slots.
pub const MAX_ENERGY: usize = 10;
/// Hand size enforced at the end step.
pub const HAND_LIMIT: usize = 7;
/// Negative-energy pile size that loses the game.
pub const NEGATIVE_ENERGY_LOSS: usize = 7;
/// Opening hand size.
pub const OPENING_HAND: usize = 5;

/// How long a power modifier lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierScope {
    /// Active only during the turn it was applied; pruned at that turn's
    /// end step.
    ThisTurn,
    /// Remains until the friend leaves the battlefield.
    Permanent,
}

/// A temporary or permanent power adjustment on a friend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerModifier {
    pub amount: i64,
    pub scope: ModifierScope,
    pub turn_applied: u32,
}

impl PowerModifier {
    /// Whether this modifier still applies on the given turn.
    #[must_use]
    pub fn is_active(&self, turn: u32) -> bool {
        match self.scope {
            ModifierScope::Permanent => true,
            ModifierScope::ThisTurn => self.turn_applied == turn,
        }
    }
}

/// A friend on the battlefield.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendSlot {
    pub instance: InstanceId,
    /// Has acted or blocked; cleared only by the owner's untap step.
    pub tapped: bool,
    /// Turn the friend entered the battlefield (summoning sickness).
    pub turn_played: u32,
    pub modifiers: SmallVec<[PowerModifier; 2]>,
}

impl FriendSlot {
    #[must_use]
    pub fn new(instance: InstanceId, turn_played: u32) -> Self {
        Self {
            instance,
            tapped: false,
            turn_played,
            modifiers: SmallVec::new(),
        }
    }

    /// Sum of modifiers active on the given turn.
    #[must_use]
    pub fn modifier_total(&self, turn: u32) -> i64 {
        self.modifiers
            .iter()
            .filter(|m| m.is_active(turn))
            .map(|m| m.amount)
            .sum()
    }

    /// Drop all this-turn modifiers. Run at the end step.
    pub fn prune_expired(&mut self) {
        self.modifiers.retain(|m| m.scope == ModifierScope::Permanent);
    }
}

/// A card committed to the energy area.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergySlot {
    pub instance: InstanceId,
    pub tapped: bool,
}

impl EnergySlot {
    #[must_use]
    pub fn new(instance: InstanceId) -> Self {
        Self { instance, tapped: false }
    }
}

/// A card in the negative-energy (damage) pile.
///
/// `face_up` cards are inspectable and spendable as energy; spending flips
/// them face down, which never reverses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegativeEnergySlot {
    pub instance: InstanceId,
    pub face_up: bool,
}

impl NegativeEnergySlot {
    #[must_use]
    pub fn new(instance: InstanceId) -> Self {
        Self { instance, face_up: true }
    }
}

/// The single continuous-effect slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSlot {
    pub instance: InstanceId,
}

/// Everything one seat owns.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlayerState {
    /// Draw pile, front = top.
    pub deck: Vec<InstanceId>,
    pub hand: Vec<InstanceId>,
    pub friends: Vec<FriendSlot>,
    pub energy: Vec<EnergySlot>,
    pub graveyard: Vec<InstanceId>,
    pub negative_energy: Vec<NegativeEnergySlot>,
    pub field: Option<FieldSlot>,
    /// One mulligan per seat, during setup only.
    pub mulligan_taken: bool,
}

impl PlayerState {
    /// Total cards across all zones. Conserved for the whole game.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.deck.len()
            + self.hand.len()
            + self.friends.len()
            + self.energy.len()
            + self.graveyard.len()
            + self.negative_energy.len()
            + usize::from(self.field.is_some())
    }

    /// Find a friend slot by instance id.
    #[must_use]
    pub fn friend_index(&self, instance: InstanceId) -> Option<usize> {
        self.friends.iter().position(|f| f.instance == instance)
    }

    /// Face-up cards in the negative-energy pile.
    #[must_use]
    pub fn face_up_negative(&self) -> usize {
        self.negative_energy.iter().filter(|n| n.face_up).count()
    }

    /// Untap friends and energy. The owner's start step.
    pub fn untap_all(&mut self) {
        for friend in &mut self.friends {
            friend.tapped = false;
        }
        for slot in &mut self.energy {
            slot.tapped = false;
        }
    }

    /// Prune expired this-turn modifiers from every friend.
    pub fn prune_expired_modifiers(&mut self) {
        for friend in &mut self.friends {
            friend.prune_expired();
        }
    }
}
