//! Ability dispatch by card id and trigger kind.

use rustc_hash::FxHashMap;

use crate::abilities::ability::{Ability, TriggerKind};
use crate::cards::CardId;

/// Maps `(card, trigger)` to its handler. Open-ended: adding a card's
/// ability is a registration, not an edit to a dispatcher.
#[derive(Default)]
pub struct AbilityRegistry {
    handlers: FxHashMap<(CardId, TriggerKind), Box<dyn Ability>>,
}

impl AbilityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler.
    ///
    /// # Panics
    /// Panics if the card already has a handler for this trigger.
    pub fn register(&mut self, card: CardId, kind: TriggerKind, ability: Box<dyn Ability>) {
        let prev = self.handlers.insert((card, kind), ability);
        assert!(
            prev.is_none(),
            "duplicate ability registration for {card:?} / {kind:?}"
        );
    }

    #[must_use]
    pub fn get(&self, card: CardId, kind: TriggerKind) -> Option<&dyn Ability> {
        self.handlers.get(&(card, kind)).map(Box::as_ref)
    }

    #[must_use]
    pub fn has(&self, card: CardId, kind: TriggerKind) -> bool {
        self.handlers.contains_key(&(card, kind))
    }

    /// Whether the card has any registered ability.
    #[must_use]
    pub fn has_any(&self, card: CardId) -> bool {
        self.handlers.keys().any(|(c, _)| *c == card)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for AbilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbilityRegistry")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
