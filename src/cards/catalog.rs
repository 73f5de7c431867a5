//! Card catalog for definition lookup.
//!
//! The catalog is the session's read-only view of the card database. It is
//! populated up front by the embedding application and never mutated during
//! a game.

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardId, CardKind};

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use tcg_sim::cards::{CardCatalog, CardDefinition, CardId, CardKind, Color};
///
/// let mut catalog = CardCatalog::new();
/// catalog.register(CardDefinition::new(CardId::new(1), "Red Apprentice", CardKind::Friend, Color::Red));
///
/// assert_eq!(catalog.get(CardId::new(1)).unwrap().name, "Red Apprentice");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: FxHashMap<CardId, CardDefinition>,
    next_id: u32,
}

impl CardCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition.
    ///
    /// Panics if a card with the same ID already exists.
    pub fn register(&mut self, card: CardDefinition) {
        if self.cards.contains_key(&card.id) {
            panic!("Card with ID {:?} already registered", card.id);
        }
        self.next_id = self.next_id.max(card.id.raw() + 1);
        self.cards.insert(card.id, card);
    }

    /// Next unused card ID, for incremental catalog building.
    #[must_use]
    pub fn next_id(&self) -> CardId {
        CardId::new(self.next_id)
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    /// Get a card definition by ID, panicking if not found.
    ///
    /// Use when the ID is known to come from this catalog.
    #[must_use]
    pub fn get_unchecked(&self, id: CardId) -> &CardDefinition {
        self.cards.get(&id).expect("Card not found in catalog")
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all definitions.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }

    /// Iterate over definitions of a given kind.
    pub fn of_kind(&self, kind: CardKind) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values().filter(move |c| c.kind == kind)
    }
}
