//! In-flight ability tracking.

use serde::{Deserialize, Serialize};

use crate::cards::InstanceId;
use crate::core::Seat;

/// One ability currently resolving.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectStackItem {
    pub source: InstanceId,
    pub owner: Seat,
    pub description: String,
}

/// LIFO list of resolving abilities. Effects execute one at a time; the
/// stack only nests when resolving one effect fires another.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EffectStack {
    items: Vec<EffectStackItem>,
}

impl EffectStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: EffectStackItem) {
        self.items.push(item);
    }

    pub fn pop(&mut self) -> Option<EffectStackItem> {
        self.items.pop()
    }

    /// The effect currently on top, if any.
    #[must_use]
    pub fn active(&self) -> Option<&EffectStackItem> {
        self.items.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A continuous effect in force (Field cards, static abilities). Tracked
/// for presentation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentEffect {
    pub source: InstanceId,
    pub description: String,
    pub active: bool,
}
