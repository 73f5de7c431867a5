//! Game state: zones, battlefield slots, and the turn machine's data.

mod game;
mod player;

pub use game::{GameState, Phase};
pub use player::{
    EnergySlot, FieldSlot, FriendSlot, ModifierScope, NegativeEnergySlot, PlayerState,
    PowerModifier, HAND_LIMIT, MAX_ENERGY, MAX_FRIENDS, NEGATIVE_ENERGY_LOSS, OPENING_HAND,
};
