//! The triggered/persistent ability engine: handler trait, dispatch
//! registry, effect stack and the built-in ability library.

mod ability;
mod library;
mod registry;
mod stack;

pub use ability::{Ability, AbilityCtx, TargetPreference, TargetQuery, TriggerKind};
pub use library::{
    DestroyWeakFriend, DiscardNegativeEnergy, DrawCards, FieldAura, HandSizeBonus, PumpAndDraw,
    WeakenAttacker,
};
pub use registry::AbilityRegistry;
pub use stack::{EffectStack, EffectStackItem, PersistentEffect};
