//! Cost and energy resolution.
//!
//! Payable sources are untapped energy slots and face-up negative-energy
//! slots; each contributes its card's energy value in the card's color.
//! `can_pay_cost` is pure and is the authoritative contract: callers check
//! it before committing, and payment application assumes it held.

use serde::{Deserialize, Serialize};

use crate::cards::{CardCatalog, Color, CostProfile};
use crate::core::{GameError, Seat};
use crate::state::GameState;

/// One selected energy source, by index into the owning list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentSource {
    /// Index into the seat's energy slots.
    Energy(usize),
    /// Index into the seat's negative-energy pile.
    Negative(usize),
}

/// A concrete set of sources covering one cost.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub sources: Vec<PaymentSource>,
}

/// Color and energy value of every spendable source, in selection order
/// (energy slots by index, then negative-energy slots by index).
fn source_pool(
    state: &GameState,
    catalog: &CardCatalog,
    seat: Seat,
) -> Vec<(PaymentSource, Color, u8)> {
    let player = state.player(seat);
    let mut pool = Vec::new();
    for (i, slot) in player.energy.iter().enumerate() {
        if slot.tapped {
            continue;
        }
        if let Some(instance) = state.instance(slot.instance) {
            let card = catalog.get_unchecked(instance.card);
            pool.push((PaymentSource::Energy(i), card.color, card.energy_value));
        }
    }
    for (i, slot) in player.negative_energy.iter().enumerate() {
        if !slot.face_up {
            continue;
        }
        if let Some(instance) = state.instance(slot.instance) {
            let card = catalog.get_unchecked(instance.card);
            pool.push((PaymentSource::Negative(i), card.color, card.energy_value));
        }
    }
    pool
}

fn covers(cost: &CostProfile, selected: &[(PaymentSource, Color, u8)]) -> bool {
    for color in Color::all() {
        let have: u32 = selected
            .iter()
            .filter(|(_, c, _)| *c == color)
            .map(|(_, _, v)| u32::from(*v))
            .sum();
        if have < u32::from(cost.of_color(color)) {
            return false;
        }
    }
    let total: u32 = selected.iter().map(|(_, _, v)| u32::from(*v)).sum();
    total >= u32::from(cost.total)
}

/// Whether the seat can pay the cost right now. Pure.
///
/// True iff every per-color requirement is met by sources of that color
/// and the total available energy meets the total cost.
#[must_use]
pub fn can_pay_cost(
    state: &GameState,
    catalog: &CardCatalog,
    seat: Seat,
    cost: &CostProfile,
) -> bool {
    covers(cost, &source_pool(state, catalog, seat))
}

/// The scripted player's deterministic payment plan.
///
/// Per required color: matching untapped energy first, then matching
/// face-up negative energy. The colorless remainder is then drawn from
/// remaining sources, regular energy before negative energy. `None` when
/// the cost is not payable.
#[must_use]
pub fn auto_payment(
    state: &GameState,
    catalog: &CardCatalog,
    seat: Seat,
    cost: &CostProfile,
) -> Option<Payment> {
    let pool = source_pool(state, catalog, seat);
    if !covers(cost, &pool) {
        return None;
    }

    let mut taken = vec![false; pool.len()];
    let mut total_value = 0_u32;

    // Pool order already prefers regular energy over negative energy.
    for color in Color::all() {
        let mut need = u32::from(cost.of_color(color));
        for (i, (_, source_color, value)) in pool.iter().enumerate() {
            if need == 0 {
                break;
            }
            if taken[i] || *source_color != color {
                continue;
            }
            taken[i] = true;
            total_value += u32::from(*value);
            need = need.saturating_sub(u32::from(*value));
        }
    }
    for (i, (_, _, value)) in pool.iter().enumerate() {
        if total_value >= u32::from(cost.total) {
            break;
        }
        if taken[i] {
            continue;
        }
        taken[i] = true;
        total_value += u32::from(*value);
    }

    let sources = pool
        .iter()
        .zip(&taken)
        .filter(|(_, &t)| t)
        .map(|((source, _, _), _)| *source)
        .collect();
    Some(Payment { sources })
}

/// Check a human-chosen payment against the cost. No mutation.
pub fn validate_payment(
    state: &GameState,
    catalog: &CardCatalog,
    seat: Seat,
    cost: &CostProfile,
    payment: &Payment,
) -> Result<(), GameError> {
    let pool = source_pool(state, catalog, seat);
    let mut selected = Vec::with_capacity(payment.sources.len());
    for &source in &payment.sources {
        if selected.iter().any(|(s, _, _)| *s == source) {
            return Err(GameError::SelectionInvalid("duplicate energy source"));
        }
        let entry = pool
            .iter()
            .find(|(s, _, _)| *s == source)
            .ok_or(GameError::SelectionInvalid("source not spendable"))?;
        selected.push(*entry);
    }
    if !covers(cost, &selected) {
        return Err(GameError::SelectionInvalid("selection does not cover cost"));
    }
    Ok(())
}

/// Commit a payment: tap regular sources, flip negative sources face down.
///
/// Callers validate first (`validate_payment` or `auto_payment`); indices
/// out of range are ignored here rather than panicking.
pub fn apply_payment(state: &mut GameState, seat: Seat, payment: &Payment) {
    let player = state.player_mut(seat);
    for &source in &payment.sources {
        match source {
            PaymentSource::Energy(i) => {
                if let Some(slot) = player.energy.get_mut(i) {
                    slot.tapped = true;
                }
            }
            PaymentSource::Negative(i) => {
                if let Some(slot) = player.negative_energy.get_mut(i) {
                    slot.face_up = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardKind};
    use crate::state::{EnergySlot, NegativeEnergySlot};

    fn setup(colors: &[Color]) -> (GameState, CardCatalog) {
        let mut catalog = CardCatalog::new();
        let mut cards = Vec::new();
        for &color in colors {
            let id = catalog.next_id();
            catalog.register(
                CardDefinition::new(id, format!("{color:?} source"), CardKind::Friend, color)
                    .with_cost(CostProfile::colorless(1))
                    .with_power(1000),
            );
            cards.push(id);
        }
        let mut state = GameState::new(1);
        state.seed_deck(Seat::First, &catalog, &cards);
        // Commit the whole deck as energy.
        while let Some(id) = {
            let deck = &mut state.player_mut(Seat::First).deck;
            if deck.is_empty() { None } else { Some(deck.remove(0)) }
        } {
            state.player_mut(Seat::First).energy.push(EnergySlot::new(id));
        }
        (state, catalog)
    }

    #[test]
    fn test_color_requirement_blocks_despite_total() {
        // 2 red + 1 colorless against 1 red and 2 blue: total suffices,
        // red does not.
        let (state, catalog) = setup(&[Color::Red, Color::Blue, Color::Blue]);
        let cost = CostProfile {
            total: 3,
            red: 2,
            ..CostProfile::free()
        };
        assert!(!can_pay_cost(&state, &catalog, Seat::First, &cost));

        let payable = CostProfile {
            total: 3,
            red: 1,
            ..CostProfile::free()
        };
        assert!(can_pay_cost(&state, &catalog, Seat::First, &payable));
    }

    #[test]
    fn test_tapped_sources_do_not_count() {
        let (mut state, catalog) = setup(&[Color::Red, Color::Red]);
        let cost = CostProfile {
            total: 2,
            red: 2,
            ..CostProfile::free()
        };
        assert!(can_pay_cost(&state, &catalog, Seat::First, &cost));

        state.player_mut(Seat::First).energy[0].tapped = true;
        assert!(!can_pay_cost(&state, &catalog, Seat::First, &cost));
    }

    fn add_negative(state: &mut GameState, catalog: &mut CardCatalog, color: Color) {
        let id = catalog.next_id();
        catalog.register(
            CardDefinition::new(id, "Pile card", CardKind::Friend, color).with_power(1000),
        );
        state.seed_deck(Seat::First, catalog, &[id]);
        let instance = state.player_mut(Seat::First).deck.pop().unwrap();
        state
            .player_mut(Seat::First)
            .negative_energy
            .push(NegativeEnergySlot::new(instance));
    }

    #[test]
    fn test_auto_payment_prefers_regular_energy() {
        let (mut state, mut catalog) = setup(&[Color::Red]);
        add_negative(&mut state, &mut catalog, Color::Red);

        let cost = CostProfile {
            total: 1,
            red: 1,
            ..CostProfile::free()
        };
        let payment = auto_payment(&state, &catalog, Seat::First, &cost).unwrap();
        assert_eq!(payment.sources, vec![PaymentSource::Energy(0)]);

        // With the regular source tapped, the negative source is used.
        state.player_mut(Seat::First).energy[0].tapped = true;
        let payment = auto_payment(&state, &catalog, Seat::First, &cost).unwrap();
        assert_eq!(payment.sources, vec![PaymentSource::Negative(0)]);
    }

    #[test]
    fn test_auto_payment_colorless_remainder() {
        let (state, catalog) = setup(&[Color::Red, Color::Blue, Color::Green]);
        let cost = CostProfile {
            total: 2,
            blue: 1,
            ..CostProfile::free()
        };
        let payment = auto_payment(&state, &catalog, Seat::First, &cost).unwrap();
        // Blue requirement from index 1, remainder from the first free
        // slot; sources are listed in pool order.
        assert_eq!(
            payment.sources,
            vec![PaymentSource::Energy(0), PaymentSource::Energy(1)]
        );
    }

    #[test]
    fn test_validate_rejects_insufficient_selection() {
        let (state, catalog) = setup(&[Color::Red, Color::Red]);
        let cost = CostProfile {
            total: 2,
            red: 2,
            ..CostProfile::free()
        };
        let short = Payment {
            sources: vec![PaymentSource::Energy(0)],
        };
        assert!(matches!(
            validate_payment(&state, &catalog, Seat::First, &cost, &short),
            Err(GameError::SelectionInvalid(_))
        ));

        let duplicate = Payment {
            sources: vec![PaymentSource::Energy(0), PaymentSource::Energy(0)],
        };
        assert!(matches!(
            validate_payment(&state, &catalog, Seat::First, &cost, &duplicate),
            Err(GameError::SelectionInvalid(_))
        ));

        let full = Payment {
            sources: vec![PaymentSource::Energy(0), PaymentSource::Energy(1)],
        };
        assert!(validate_payment(&state, &catalog, Seat::First, &cost, &full).is_ok());
    }

    #[test]
    fn test_apply_payment_taps_and_flips() {
        let (mut state, mut catalog) = setup(&[Color::Red]);
        add_negative(&mut state, &mut catalog, Color::Red);

        let payment = Payment {
            sources: vec![PaymentSource::Energy(0), PaymentSource::Negative(0)],
        };
        apply_payment(&mut state, Seat::First, &payment);

        assert!(state.player(Seat::First).energy[0].tapped);
        assert!(!state.player(Seat::First).negative_energy[0].face_up);
    }
}
