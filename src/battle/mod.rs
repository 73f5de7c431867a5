//! Combat resolution.
//!
//! Friends attack the opposing player; defense is reactive blocking. The
//! session controller owns the interactive steps (block and counter
//! decisions); this module supplies attack legality, effective power, the
//! blocked-clash and unblocked-hit resolutions, and the transient result
//! log the presentation layer drains.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::abilities::{AbilityRegistry, TriggerKind};
use crate::cards::{CardCatalog, InstanceId};
use crate::core::{GameError, Seat};
use crate::state::{GameState, NEGATIVE_ENERGY_LOSS};

/// How one attack ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatOutcome {
    /// Blocked; equal effective power removed both friends.
    MutualDestruction,
    /// Blocked; only the blocker was defeated.
    BlockerDefeated,
    /// Blocked; only the attacker was defeated.
    AttackerDefeated,
    /// Unblocked; the defender took a negative-energy card.
    Hit {
        /// The hit brought the pile to the losing threshold.
        lethal: bool,
    },
}

/// One resolved attack, for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleEvent {
    pub attacking_seat: Seat,
    pub attacker: InstanceId,
    pub attacker_power: i64,
    pub blocker: Option<InstanceId>,
    pub blocker_power: Option<i64>,
    pub outcome: CombatOutcome,
}

/// Drainable log of resolved attacks. Never read by game logic.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BattleRecord {
    events: Vec<BattleEvent>,
}

impl BattleRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    /// Take all pending events, oldest first.
    pub fn drain(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Effective power of a friend on the battlefield: printed power, plus
/// active temporary modifiers, plus its own static ability bonus, plus
/// the controller's field aura.
#[must_use]
pub fn effective_power(
    state: &GameState,
    catalog: &CardCatalog,
    registry: &AbilityRegistry,
    id: InstanceId,
) -> i64 {
    let Some((seat, index)) = state.find_friend(id) else {
        return 0;
    };
    let slot = &state.player(seat).friends[index];
    let Some(instance) = state.instance(id) else {
        return 0;
    };

    let mut power = catalog.get_unchecked(instance.card).base_power();
    power += slot.modifier_total(state.turn);

    if let Some(ability) = registry.get(instance.card, TriggerKind::Persistent) {
        power += ability.static_power_bonus(state, catalog, seat, id, id);
    }
    if let Some(field) = &state.player(seat).field {
        if let Some(field_instance) = state.instance(field.instance) {
            if let Some(aura) = registry.get(field_instance.card, TriggerKind::Persistent) {
                power += aura.static_power_bonus(state, catalog, seat, field.instance, id);
            }
        }
    }
    power
}

/// Check that a friend slot may declare an attack.
pub fn check_attack_legal(
    state: &GameState,
    catalog: &CardCatalog,
    seat: Seat,
    index: usize,
) -> Result<InstanceId, GameError> {
    let player = state.player(seat);
    let slot = player.friends.get(index).ok_or(GameError::EmptySlot)?;
    let instance = state.instance(slot.instance).ok_or(GameError::EmptySlot)?;
    let card = catalog.get_unchecked(instance.card);

    if card.base_power() <= 0 {
        return Err(GameError::Powerless);
    }
    if slot.tapped {
        return Err(GameError::AttackerTapped);
    }
    if slot.turn_played == state.turn && !card.haste {
        return Err(GameError::SummoningSickness);
    }
    Ok(slot.instance)
}

/// Resolve a blocked attack: compare effective powers and move defeated
/// friends to their owners' graveyards. Symmetric: the blocker is defeated
/// on attacker power >= blocker power, the attacker on blocker power >=
/// attacker power, both on equality.
pub fn resolve_clash(
    state: &mut GameState,
    catalog: &CardCatalog,
    registry: &AbilityRegistry,
    attacking_seat: Seat,
    attacker: InstanceId,
    blocker: InstanceId,
    record: &mut BattleRecord,
) -> CombatOutcome {
    let attacker_power = effective_power(state, catalog, registry, attacker);
    let blocker_power = effective_power(state, catalog, registry, blocker);

    let outcome = if attacker_power == blocker_power {
        CombatOutcome::MutualDestruction
    } else if attacker_power > blocker_power {
        CombatOutcome::BlockerDefeated
    } else {
        CombatOutcome::AttackerDefeated
    };

    if attacker_power >= blocker_power {
        if let Some((seat, index)) = state.find_friend(blocker) {
            state.defeat_friend(seat, index);
        }
    }
    if blocker_power >= attacker_power {
        if let Some((seat, index)) = state.find_friend(attacker) {
            state.defeat_friend(seat, index);
        }
    }

    debug!(
        %attacking_seat,
        attacker_power,
        blocker_power,
        ?outcome,
        "blocked attack resolved"
    );
    record.push(BattleEvent {
        attacking_seat,
        attacker,
        attacker_power,
        blocker: Some(blocker),
        blocker_power: Some(blocker_power),
        outcome,
    });
    outcome
}

/// Resolve an unblocked hit: the defender's top deck card joins their
/// negative-energy pile face up. Returns the outcome; `lethal` means the
/// pile reached the losing threshold and the game ends at once.
pub fn resolve_hit(
    state: &mut GameState,
    catalog: &CardCatalog,
    registry: &AbilityRegistry,
    attacking_seat: Seat,
    attacker: InstanceId,
    record: &mut BattleRecord,
) -> CombatOutcome {
    let defender = attacking_seat.rival();
    let attacker_power = effective_power(state, catalog, registry, attacker);

    state.inflict_negative_energy(defender);
    let lethal = state.player(defender).negative_energy.len() >= NEGATIVE_ENERGY_LOSS;

    debug!(%attacking_seat, lethal, "unblocked hit landed");
    let outcome = CombatOutcome::Hit { lethal };
    record.push(BattleEvent {
        attacking_seat,
        attacker,
        attacker_power,
        blocker: None,
        blocker_power: None,
        outcome,
    });
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardKind, Color};
    use crate::state::{FriendSlot, ModifierScope, PowerModifier};

    fn arena(attacker_power: i64, blocker_power: i64) -> (GameState, CardCatalog, InstanceId, InstanceId) {
        let mut catalog = CardCatalog::new();
        let a = catalog.next_id();
        catalog.register(
            CardDefinition::new(a, "Attacker", CardKind::Friend, Color::Red)
                .with_power(attacker_power),
        );
        let b = catalog.next_id();
        catalog.register(
            CardDefinition::new(b, "Blocker", CardKind::Friend, Color::Blue)
                .with_power(blocker_power),
        );

        let mut state = GameState::new(9);
        state.seed_deck(Seat::First, &catalog, &[a, a, a]);
        state.seed_deck(Seat::Second, &catalog, &[b, b, b]);
        let attacker = state.player_mut(Seat::First).deck.pop().unwrap();
        let blocker = state.player_mut(Seat::Second).deck.pop().unwrap();
        state.turn = 2;
        state
            .player_mut(Seat::First)
            .friends
            .push(FriendSlot::new(attacker, 1));
        state
            .player_mut(Seat::Second)
            .friends
            .push(FriendSlot::new(blocker, 1));
        (state, catalog, attacker, blocker)
    }

    #[test]
    fn test_equal_power_is_mutual_destruction() {
        let (mut state, catalog, attacker, blocker) = arena(2000, 2000);
        let registry = AbilityRegistry::new();
        let mut record = BattleRecord::new();

        let outcome = resolve_clash(
            &mut state,
            &catalog,
            &registry,
            Seat::First,
            attacker,
            blocker,
            &mut record,
        );

        assert_eq!(outcome, CombatOutcome::MutualDestruction);
        assert!(state.player(Seat::First).friends.is_empty());
        assert!(state.player(Seat::Second).friends.is_empty());
        assert_eq!(state.player(Seat::First).graveyard, vec![attacker]);
        assert_eq!(state.player(Seat::Second).graveyard, vec![blocker]);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_stronger_attacker_defeats_blocker_only() {
        let (mut state, catalog, attacker, blocker) = arena(3000, 2000);
        let registry = AbilityRegistry::new();
        let mut record = BattleRecord::new();

        let outcome = resolve_clash(
            &mut state,
            &catalog,
            &registry,
            Seat::First,
            attacker,
            blocker,
            &mut record,
        );

        assert_eq!(outcome, CombatOutcome::BlockerDefeated);
        assert_eq!(state.player(Seat::First).friends.len(), 1);
        assert!(state.player(Seat::Second).friends.is_empty());
    }

    #[test]
    fn test_stronger_blocker_defeats_attacker_only() {
        let (mut state, catalog, attacker, blocker) = arena(2000, 3000);
        let registry = AbilityRegistry::new();
        let mut record = BattleRecord::new();

        let outcome = resolve_clash(
            &mut state,
            &catalog,
            &registry,
            Seat::First,
            attacker,
            blocker,
            &mut record,
        );

        assert_eq!(outcome, CombatOutcome::AttackerDefeated);
        assert!(state.player(Seat::First).friends.is_empty());
        assert_eq!(state.player(Seat::Second).friends.len(), 1);
    }

    #[test]
    fn test_modifiers_change_the_outcome() {
        let (mut state, catalog, attacker, blocker) = arena(2000, 2000);
        let registry = AbilityRegistry::new();
        let mut record = BattleRecord::new();

        state.add_modifier(
            blocker,
            PowerModifier {
                amount: 1000,
                scope: ModifierScope::ThisTurn,
                turn_applied: state.turn,
            },
        );

        let outcome = resolve_clash(
            &mut state,
            &catalog,
            &registry,
            Seat::First,
            attacker,
            blocker,
            &mut record,
        );
        assert_eq!(outcome, CombatOutcome::AttackerDefeated);
    }

    #[test]
    fn test_hit_grows_pile_face_up() {
        let (mut state, catalog, attacker, _blocker) = arena(3000, 2000);
        state.player_mut(Seat::Second).friends.clear();
        let registry = AbilityRegistry::new();
        let mut record = BattleRecord::new();

        let outcome = resolve_hit(
            &mut state,
            &catalog,
            &registry,
            Seat::First,
            attacker,
            &mut record,
        );

        assert_eq!(outcome, CombatOutcome::Hit { lethal: false });
        let pile = &state.player(Seat::Second).negative_energy;
        assert_eq!(pile.len(), 1);
        assert!(pile[0].face_up);
        assert_eq!(state.player(Seat::Second).deck.len(), 1);
    }

    #[test]
    fn test_seventh_hit_is_lethal() {
        let (mut state, catalog, attacker, _blocker) = arena(3000, 2000);
        state.player_mut(Seat::Second).friends.clear();
        let registry = AbilityRegistry::new();
        let mut record = BattleRecord::new();

        // Move six cards into the pile ahead of time.
        let filler = catalog.iter().next().map(|card| card.id).unwrap();
        for _ in 0..6 {
            state.seed_deck(Seat::Second, &catalog, &[filler]);
            state.inflict_negative_energy(Seat::Second);
        }

        let outcome = resolve_hit(
            &mut state,
            &catalog,
            &registry,
            Seat::First,
            attacker,
            &mut record,
        );
        assert_eq!(outcome, CombatOutcome::Hit { lethal: true });
        assert_eq!(state.player(Seat::Second).negative_energy.len(), 7);
    }

    #[test]
    fn test_attack_legality_checks() {
        let (mut state, catalog, attacker, _blocker) = arena(2000, 2000);
        let seat = Seat::First;

        assert_eq!(check_attack_legal(&state, &catalog, seat, 0), Ok(attacker));
        assert!(matches!(
            check_attack_legal(&state, &catalog, seat, 5),
            Err(GameError::EmptySlot)
        ));

        state.player_mut(seat).friends[0].tapped = true;
        assert!(matches!(
            check_attack_legal(&state, &catalog, seat, 0),
            Err(GameError::AttackerTapped)
        ));
        state.player_mut(seat).friends[0].tapped = false;

        state.player_mut(seat).friends[0].turn_played = state.turn;
        assert!(matches!(
            check_attack_legal(&state, &catalog, seat, 0),
            Err(GameError::SummoningSickness)
        ));
    }

    #[test]
    fn test_haste_waives_summoning_sickness() {
        let mut catalog = CardCatalog::new();
        let rusher = catalog.next_id();
        catalog.register(
            CardDefinition::new(rusher, "Rusher", CardKind::Friend, Color::Green)
                .with_power(1000)
                .with_haste(),
        );

        let mut state = GameState::new(3);
        state.seed_deck(Seat::First, &catalog, &[rusher]);
        let id = state.player_mut(Seat::First).deck.pop().unwrap();
        let turn = state.turn;
        state
            .player_mut(Seat::First)
            .friends
            .push(FriendSlot::new(id, turn));

        assert_eq!(check_attack_legal(&state, &catalog, Seat::First, 0), Ok(id));
    }

    #[test]
    fn test_effective_power_includes_statics() {
        use crate::abilities::{FieldAura, HandSizeBonus};

        let mut catalog = CardCatalog::new();
        let friend = catalog.next_id();
        catalog.register(
            CardDefinition::new(friend, "Scholar", CardKind::Friend, Color::Yellow)
                .with_power(1000),
        );
        let field = catalog.next_id();
        catalog.register(CardDefinition::new(field, "Garden", CardKind::Field, Color::Green));

        let mut registry = AbilityRegistry::new();
        registry.register(friend, TriggerKind::Persistent, Box::new(HandSizeBonus::new(1000)));
        registry.register(field, TriggerKind::Persistent, Box::new(FieldAura::new(500)));

        let mut state = GameState::new(4);
        state.seed_deck(Seat::First, &catalog, &[friend, friend, friend, field]);
        let field_id = state.player_mut(Seat::First).deck.pop().unwrap();
        let friend_id = state.player_mut(Seat::First).deck.pop().unwrap();
        state
            .player_mut(Seat::First)
            .friends
            .push(FriendSlot::new(friend_id, 0));
        state.player_mut(Seat::First).field = Some(crate::state::FieldSlot { instance: field_id });
        // Two cards left in the deck; move them to hand for the bonus.
        state.draw(Seat::First);
        state.draw(Seat::First);

        assert_eq!(
            effective_power(&state, &catalog, &registry, friend_id),
            1000 + 1000 + 500
        );
    }
}
