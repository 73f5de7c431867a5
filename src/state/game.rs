//! The full game state: both players, the instance table, and the turn
//! machine's bookkeeping.
//!
//! All zone transitions funnel through methods here so that zone lists and
//! the instance table never disagree.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::{CardCatalog, CardId, CardInstance, InstanceId, Zone};
use crate::core::{GameError, GameRng, Seat, SeatPair};
use crate::state::player::{NegativeEnergySlot, PlayerState, PowerModifier, HAND_LIMIT};

/// The turn/phase machine's current step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Decks seeded, opening hands drawn, mulligans available.
    Setup,
    Start,
    Draw,
    Energy,
    Main,
    End,
    GameOver,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Setup => "setup",
            Phase::Start => "start",
            Phase::Draw => "draw",
            Phase::Energy => "energy",
            Phase::Main => "main",
            Phase::End => "end",
            Phase::GameOver => "game over",
        };
        write!(f, "{name}")
    }
}

/// Complete state of one game in progress.
#[derive(Clone, Debug)]
pub struct GameState {
    players: SeatPair<PlayerState>,
    instances: FxHashMap<InstanceId, CardInstance>,
    next_instance: u32,
    pub active: Seat,
    pub turn: u32,
    pub phase: Phase,
    pub winner: Option<Seat>,
    pub energy_played_this_turn: bool,
    pub rng: GameRng,
}

impl GameState {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            players: SeatPair::default(),
            instances: FxHashMap::default(),
            next_instance: 0,
            active: Seat::First,
            turn: 1,
            phase: Phase::Setup,
            winner: None,
            energy_played_this_turn: false,
            rng: GameRng::new(seed),
        }
    }

    #[must_use]
    pub fn player(&self, seat: Seat) -> &PlayerState {
        self.players.get(seat)
    }

    pub fn player_mut(&mut self, seat: Seat) -> &mut PlayerState {
        self.players.get_mut(seat)
    }

    #[must_use]
    pub fn instance(&self, id: InstanceId) -> Option<&CardInstance> {
        self.instances.get(&id)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut CardInstance> {
        self.instances.get_mut(&id)
    }

    /// Definition id for an instance, erroring if the id is stale.
    pub fn card_of(&self, id: InstanceId) -> Result<CardId, GameError> {
        self.instances
            .get(&id)
            .map(|i| i.card)
            .ok_or(GameError::EmptySlot)
    }

    /// Create instances for a deck list and place them in the seat's deck.
    ///
    /// Panics if a card id is missing from the catalog; deck lists are
    /// validated at session construction.
    pub fn seed_deck(&mut self, seat: Seat, catalog: &CardCatalog, list: &[CardId]) {
        for &card in list {
            assert!(
                catalog.contains(card),
                "deck references unknown card {card:?}"
            );
            let id = InstanceId::new(self.next_instance);
            self.next_instance += 1;
            self.instances.insert(id, CardInstance::new(id, card, seat));
            self.players.get_mut(seat).deck.push(id);
        }
    }

    pub fn shuffle_deck(&mut self, seat: Seat) {
        let mut deck = std::mem::take(&mut self.players.get_mut(seat).deck);
        self.rng.shuffle(&mut deck);
        self.players.get_mut(seat).deck = deck;
    }

    /// Draw the top card into the seat's hand. `None` on an empty deck;
    /// deck-out is judged at the start step, not here.
    pub fn draw(&mut self, seat: Seat) -> Option<InstanceId> {
        let player = self.players.get_mut(seat);
        if player.deck.is_empty() {
            return None;
        }
        let id = player.deck.remove(0);
        player.hand.push(id);
        self.set_zone(id, Zone::Hand);
        Some(id)
    }

    /// Remove a card from the seat's hand by id.
    pub fn take_from_hand(&mut self, seat: Seat, id: InstanceId) -> Result<(), GameError> {
        let hand = &mut self.players.get_mut(seat).hand;
        let idx = hand
            .iter()
            .position(|&h| h == id)
            .ok_or(GameError::EmptySlot)?;
        hand.remove(idx);
        Ok(())
    }

    /// Put a card into the seat's graveyard.
    pub fn to_graveyard(&mut self, seat: Seat, id: InstanceId) {
        self.players.get_mut(seat).graveyard.push(id);
        self.set_zone(id, Zone::Graveyard);
    }

    /// Move the deck's top card onto the negative-energy pile, face up.
    /// `None` on an empty deck.
    pub fn inflict_negative_energy(&mut self, seat: Seat) -> Option<InstanceId> {
        let player = self.players.get_mut(seat);
        if player.deck.is_empty() {
            return None;
        }
        let id = player.deck.remove(0);
        player.negative_energy.push(NegativeEnergySlot::new(id));
        self.set_zone(id, Zone::NegativeEnergy);
        Some(id)
    }

    /// Discard from the end of the hand down to the hand limit, into the
    /// graveyard. Returns the discarded ids.
    pub fn discard_to_limit(&mut self, seat: Seat) -> Vec<InstanceId> {
        let mut discarded = Vec::new();
        while self.players.get(seat).hand.len() > HAND_LIMIT {
            let id = match self.players.get_mut(seat).hand.pop() {
                Some(id) => id,
                None => break,
            };
            self.to_graveyard(seat, id);
            discarded.push(id);
        }
        discarded
    }

    /// Locate a friend on either battlefield by instance id.
    #[must_use]
    pub fn find_friend(&self, id: InstanceId) -> Option<(Seat, usize)> {
        for seat in Seat::both() {
            if let Some(index) = self.players.get(seat).friend_index(id) {
                return Some((seat, index));
            }
        }
        None
    }

    /// Attach a power modifier to a friend, wherever it is. Returns false
    /// if the instance is not on a battlefield.
    pub fn add_modifier(&mut self, id: InstanceId, modifier: PowerModifier) -> bool {
        match self.find_friend(id) {
            Some((seat, index)) => {
                self.players.get_mut(seat).friends[index].modifiers.push(modifier);
                true
            }
            None => false,
        }
    }

    /// Remove a defeated friend from the battlefield into its owner's
    /// graveyard.
    pub fn defeat_friend(&mut self, seat: Seat, index: usize) -> Option<InstanceId> {
        let player = self.players.get_mut(seat);
        if index >= player.friends.len() {
            return None;
        }
        let slot = player.friends.remove(index);
        self.to_graveyard(seat, slot.instance);
        Some(slot.instance)
    }

    /// Move a card out of the seat's negative-energy pile into the
    /// graveyard. Returns false if the instance is not in the pile.
    pub fn remove_negative_energy(&mut self, seat: Seat, id: InstanceId) -> bool {
        let pile = &mut self.players.get_mut(seat).negative_energy;
        let Some(index) = pile.iter().position(|n| n.instance == id) else {
            return false;
        };
        pile.remove(index);
        self.to_graveyard(seat, id);
        true
    }

    /// Total cards a seat owns, across every zone.
    #[must_use]
    pub fn card_count(&self, seat: Seat) -> usize {
        self.players.get(seat).card_count()
    }

    pub(crate) fn set_zone(&mut self, id: InstanceId, zone: Zone) {
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.zone = zone;
        }
    }
}
