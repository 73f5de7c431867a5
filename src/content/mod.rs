//! Demo card pool and deck building.
//!
//! The engine's external contracts are plain data: a `CardCatalog` plus an
//! ordered deck list per seat. This module supplies a small playable pool
//! with its ability registrations, and a deck builder that fills 50 slots
//! from low/mid/high cost bands the way the scripted opponent likes them.

use crate::abilities::{
    AbilityRegistry, DestroyWeakFriend, DiscardNegativeEnergy, DrawCards, FieldAura,
    HandSizeBonus, PumpAndDraw, TriggerKind, WeakenAttacker,
};
use crate::cards::{CardCatalog, CardDefinition, CardId, CardKind, Color, CostProfile};

/// Deck size every seat plays with.
pub const DECK_SIZE: usize = 50;

/// Build the demo card pool and its ability registry.
#[must_use]
pub fn demo_catalog() -> (CardCatalog, AbilityRegistry) {
    let mut catalog = CardCatalog::new();
    let mut registry = AbilityRegistry::new();

    // Plain friends.
    let ember_cub = catalog.next_id();
    catalog.register(
        CardDefinition::new(ember_cub, "Ember Cub", CardKind::Friend, Color::Red)
            .with_cost(CostProfile::colorless(1))
            .with_power(1000),
    );
    let flame_dancer = catalog.next_id();
    catalog.register(
        CardDefinition::new(flame_dancer, "Flame Dancer", CardKind::Friend, Color::Red)
            .with_cost(CostProfile {
                total: 2,
                red: 1,
                ..CostProfile::free()
            })
            .with_power(2000),
    );
    let stone_guard = catalog.next_id();
    catalog.register(
        CardDefinition::new(stone_guard, "Stone Guard", CardKind::Friend, Color::Blue)
            .with_cost(CostProfile::colorless(3))
            .with_power(3000),
    );
    let blaze_champion = catalog.next_id();
    catalog.register(
        CardDefinition::new(blaze_champion, "Blaze Champion", CardKind::Friend, Color::Red)
            .with_cost(CostProfile {
                total: 4,
                red: 2,
                ..CostProfile::free()
            })
            .with_power(4000),
    );

    // A counter-usable friend; played from hand it weakens the attacker.
    let tide_sprite = catalog.next_id();
    catalog.register(
        CardDefinition::new(tide_sprite, "Tide Sprite", CardKind::Friend, Color::Blue)
            .with_cost(CostProfile::colorless(1))
            .with_power(1000)
            .with_counter(),
    );
    registry.register(tide_sprite, TriggerKind::Counter, Box::new(WeakenAttacker::new(1000)));

    // Static bonus scaling with hand size.
    let wave_scholar = catalog.next_id();
    catalog.register(
        CardDefinition::new(wave_scholar, "Wave Scholar", CardKind::Friend, Color::Blue)
            .with_cost(CostProfile {
                total: 2,
                blue: 1,
                ..CostProfile::free()
            })
            .with_power(1000),
    );
    registry.register(
        wave_scholar,
        TriggerKind::Persistent,
        Box::new(HandSizeBonus::new(1000)),
    );

    // Attacks the turn it is played.
    let gale_scout = catalog.next_id();
    catalog.register(
        CardDefinition::new(gale_scout, "Gale Scout", CardKind::Friend, Color::Green)
            .with_cost(CostProfile::colorless(1))
            .with_power(1000)
            .with_haste(),
    );

    // Card advantage on attack.
    let thorn_stalker = catalog.next_id();
    catalog.register(
        CardDefinition::new(thorn_stalker, "Thorn Stalker", CardKind::Friend, Color::Green)
            .with_cost(CostProfile {
                total: 3,
                green: 1,
                ..CostProfile::free()
            })
            .with_power(3000),
    );
    registry.register(thorn_stalker, TriggerKind::OnAttack, Box::new(DrawCards::new(1)));

    // Damage relief on attack.
    let sun_priest = catalog.next_id();
    catalog.register(
        CardDefinition::new(sun_priest, "Sun Priest", CardKind::Friend, Color::Yellow)
            .with_cost(CostProfile {
                total: 2,
                yellow: 1,
                ..CostProfile::free()
            })
            .with_power(2000),
    );
    registry.register(
        sun_priest,
        TriggerKind::OnAttack,
        Box::new(DiscardNegativeEnergy::new()),
    );

    // Targeted removal on attack.
    let storm_herald = catalog.next_id();
    catalog.register(
        CardDefinition::new(storm_herald, "Storm Herald", CardKind::Friend, Color::Yellow)
            .with_cost(CostProfile {
                total: 4,
                yellow: 1,
                ..CostProfile::free()
            })
            .with_power(3000),
    );
    registry.register(
        storm_herald,
        TriggerKind::OnAttack,
        Box::new(DestroyWeakFriend::new(3000)),
    );

    // Support: one-shot pump plus draw.
    let rally_banner = catalog.next_id();
    catalog.register(
        CardDefinition::new(rally_banner, "Rally Banner", CardKind::Support, Color::Red)
            .with_cost(CostProfile::colorless(2)),
    );
    registry.register(
        rally_banner,
        TriggerKind::Main,
        Box::new(PumpAndDraw::new(1000, 2)),
    );

    // Field: continuous aura for the controller.
    let verdant_garden = catalog.next_id();
    catalog.register(
        CardDefinition::new(verdant_garden, "Verdant Garden", CardKind::Field, Color::Green)
            .with_cost(CostProfile::colorless(3)),
    );
    registry.register(
        verdant_garden,
        TriggerKind::Persistent,
        Box::new(FieldAura::new(500)),
    );

    (catalog, registry)
}

/// Fill a 50-card deck from the pool's cost bands: mostly cheap friends,
/// a mid-cost core, a handful of finishers.
#[must_use]
pub fn scripted_deck(catalog: &CardCatalog) -> Vec<CardId> {
    let mut low = Vec::new();
    let mut mid = Vec::new();
    let mut high = Vec::new();
    for card in catalog.iter() {
        if card.kind != CardKind::Friend {
            continue;
        }
        match card.cost.total {
            0..=2 => low.push(card.id),
            3 => mid.push(card.id),
            _ => high.push(card.id),
        }
    }
    low.sort();
    mid.sort();
    high.sort();

    let mut deck = Vec::with_capacity(DECK_SIZE);
    fill_from(&mut deck, &low, 24);
    fill_from(&mut deck, &mid, 16);
    fill_from(&mut deck, &high, 10);
    // Bands can be empty in a trimmed pool; pad from whatever exists.
    let mut all: Vec<CardId> = catalog.iter().map(|card| card.id).collect();
    all.sort();
    let remaining = DECK_SIZE.saturating_sub(deck.len());
    fill_from(&mut deck, &all, remaining);
    deck.truncate(DECK_SIZE);
    deck
}

fn fill_from(deck: &mut Vec<CardId>, band: &[CardId], count: usize) {
    if band.is_empty() {
        return;
    }
    for i in 0..count {
        deck.push(band[i % band.len()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog_wiring() {
        let (catalog, registry) = demo_catalog();
        assert!(catalog.len() >= 10);
        assert!(!registry.is_empty());

        // Every counter-usable card has a counter handler.
        for card in catalog.iter() {
            if card.counter {
                assert!(registry.has(card.id, TriggerKind::Counter));
            }
        }
    }

    #[test]
    fn test_scripted_deck_is_full_and_valid() {
        let (catalog, _registry) = demo_catalog();
        let deck = scripted_deck(&catalog);

        assert_eq!(deck.len(), DECK_SIZE);
        for &card in &deck {
            assert!(catalog.contains(card));
        }
    }

    #[test]
    fn test_scripted_deck_pads_from_trimmed_pool() {
        // One cheap friend: the mid and high bands are empty, so the deck
        // must be topped up from the pool at large.
        let mut catalog = CardCatalog::new();
        let id = catalog.next_id();
        catalog.register(
            CardDefinition::new(id, "Lone Cub", CardKind::Friend, Color::Red)
                .with_cost(CostProfile::colorless(1))
                .with_power(1000),
        );

        let deck = scripted_deck(&catalog);
        assert_eq!(deck.len(), DECK_SIZE);
        assert!(deck.iter().all(|&card| card == id));
    }

    #[test]
    fn test_scripted_deck_band_shape() {
        let (catalog, _registry) = demo_catalog();
        let deck = scripted_deck(&catalog);

        let cheap = deck
            .iter()
            .filter(|&&id| catalog.get_unchecked(id).cost.total <= 2)
            .count();
        assert!(cheap >= 24, "cheap cards: {cheap}");
    }
}
