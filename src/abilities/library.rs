//! Built-in ability handlers.
//!
//! These cover the demo catalog: draw effects, targeted removal,
//! negative-energy relief, static and aura power bonuses, Support pumps
//! and the counter response. New card abilities are added by registering
//! another handler, never by editing a dispatcher.

use tracing::debug;

use crate::abilities::ability::{Ability, AbilityCtx, TargetPreference, TargetQuery};
use crate::cards::{CardCatalog, InstanceId};
use crate::core::{GameError, Seat};
use crate::state::{GameState, ModifierScope, PowerModifier};

fn base_power_of(state: &GameState, catalog: &CardCatalog, id: InstanceId) -> i64 {
    state
        .instance(id)
        .map(|i| catalog.get_unchecked(i.card).base_power())
        .unwrap_or(0)
}

/// Draw N cards when the trigger fires.
pub struct DrawCards {
    count: usize,
    description: String,
}

impl DrawCards {
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            count,
            description: format!("Draw {count} card(s)"),
        }
    }
}

impl Ability for DrawCards {
    fn description(&self) -> &str {
        &self.description
    }

    fn resolve(&self, ctx: &mut AbilityCtx<'_>, _targets: &[InstanceId]) -> Result<(), GameError> {
        for _ in 0..self.count {
            if ctx.state.draw(ctx.owner).is_none() {
                debug!(seat = %ctx.owner, "draw effect hit an empty deck");
                break;
            }
        }
        Ok(())
    }
}

/// Destroy one opposing friend whose printed power is at most the limit.
/// Optional; skipped when no candidate exists.
pub struct DestroyWeakFriend {
    max_power: i64,
    description: String,
}

impl DestroyWeakFriend {
    #[must_use]
    pub fn new(max_power: i64) -> Self {
        Self {
            max_power,
            description: format!("Destroy an opposing friend with power {max_power} or less"),
        }
    }
}

impl Ability for DestroyWeakFriend {
    fn description(&self) -> &str {
        &self.description
    }

    fn target_request(
        &self,
        state: &GameState,
        catalog: &CardCatalog,
        owner: Seat,
        _source: InstanceId,
    ) -> Option<TargetQuery> {
        let candidates: Vec<InstanceId> = state
            .player(owner.rival())
            .friends
            .iter()
            .map(|f| f.instance)
            .filter(|&id| base_power_of(state, catalog, id) <= self.max_power)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(TargetQuery {
            candidates,
            min: 1,
            max: 1,
            mandatory: false,
            preference: TargetPreference::Strongest,
            description: self.description.clone(),
        })
    }

    fn resolve(&self, ctx: &mut AbilityCtx<'_>, targets: &[InstanceId]) -> Result<(), GameError> {
        for &target in targets {
            if let Some((seat, index)) = ctx.state.find_friend(target) {
                ctx.state.defeat_friend(seat, index);
                debug!(%seat, ?target, "friend destroyed by ability");
            }
        }
        Ok(())
    }
}

/// Move one of your negative-energy cards to the graveyard. Optional.
pub struct DiscardNegativeEnergy {
    description: String,
}

impl DiscardNegativeEnergy {
    #[must_use]
    pub fn new() -> Self {
        Self {
            description: "Discard a card from your negative-energy pile".into(),
        }
    }
}

impl Default for DiscardNegativeEnergy {
    fn default() -> Self {
        Self::new()
    }
}

impl Ability for DiscardNegativeEnergy {
    fn description(&self) -> &str {
        &self.description
    }

    fn target_request(
        &self,
        state: &GameState,
        _catalog: &CardCatalog,
        owner: Seat,
        _source: InstanceId,
    ) -> Option<TargetQuery> {
        let candidates: Vec<InstanceId> = state
            .player(owner)
            .negative_energy
            .iter()
            .map(|n| n.instance)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(TargetQuery {
            candidates,
            min: 1,
            max: 1,
            mandatory: false,
            preference: TargetPreference::Weakest,
            description: self.description.clone(),
        })
    }

    fn resolve(&self, ctx: &mut AbilityCtx<'_>, targets: &[InstanceId]) -> Result<(), GameError> {
        for &target in targets {
            ctx.state.remove_negative_energy(ctx.owner, target);
        }
        Ok(())
    }
}

/// Static self-bonus scaling with the controller's hand size.
pub struct HandSizeBonus {
    per_two_cards: i64,
    description: String,
}

impl HandSizeBonus {
    #[must_use]
    pub fn new(per_two_cards: i64) -> Self {
        Self {
            per_two_cards,
            description: format!("+{per_two_cards} power for every 2 cards in your hand"),
        }
    }
}

impl Ability for HandSizeBonus {
    fn description(&self) -> &str {
        &self.description
    }

    fn resolve(&self, _ctx: &mut AbilityCtx<'_>, _targets: &[InstanceId]) -> Result<(), GameError> {
        Ok(())
    }

    fn static_power_bonus(
        &self,
        state: &GameState,
        _catalog: &CardCatalog,
        owner: Seat,
        source: InstanceId,
        subject: InstanceId,
    ) -> i64 {
        if subject != source {
            return 0;
        }
        let pairs = state.player(owner).hand.len() / 2;
        self.per_two_cards * pairs as i64
    }
}

/// Give one of your friends a this-turn power boost, then draw.
pub struct PumpAndDraw {
    amount: i64,
    draw: usize,
    description: String,
}

impl PumpAndDraw {
    #[must_use]
    pub fn new(amount: i64, draw: usize) -> Self {
        Self {
            amount,
            draw,
            description: format!("A friend gets +{amount} power this turn; draw {draw}"),
        }
    }
}

impl Ability for PumpAndDraw {
    fn description(&self) -> &str {
        &self.description
    }

    fn target_request(
        &self,
        state: &GameState,
        _catalog: &CardCatalog,
        owner: Seat,
        _source: InstanceId,
    ) -> Option<TargetQuery> {
        let candidates: Vec<InstanceId> = state
            .player(owner)
            .friends
            .iter()
            .map(|f| f.instance)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(TargetQuery {
            candidates,
            min: 1,
            max: 1,
            mandatory: false,
            preference: TargetPreference::Strongest,
            description: self.description.clone(),
        })
    }

    fn resolve(&self, ctx: &mut AbilityCtx<'_>, targets: &[InstanceId]) -> Result<(), GameError> {
        let turn = ctx.state.turn;
        for &target in targets {
            ctx.state.add_modifier(
                target,
                PowerModifier {
                    amount: self.amount,
                    scope: ModifierScope::ThisTurn,
                    turn_applied: turn,
                },
            );
        }
        for _ in 0..self.draw {
            if ctx.state.draw(ctx.owner).is_none() {
                break;
            }
        }
        Ok(())
    }
}

/// Continuous aura: the controller's friends get a flat power bonus.
pub struct FieldAura {
    amount: i64,
    description: String,
}

impl FieldAura {
    #[must_use]
    pub fn new(amount: i64) -> Self {
        Self {
            amount,
            description: format!("Your friends get +{amount} power"),
        }
    }
}

impl Ability for FieldAura {
    fn description(&self) -> &str {
        &self.description
    }

    fn resolve(&self, _ctx: &mut AbilityCtx<'_>, _targets: &[InstanceId]) -> Result<(), GameError> {
        Ok(())
    }

    fn static_power_bonus(
        &self,
        state: &GameState,
        _catalog: &CardCatalog,
        owner: Seat,
        _source: InstanceId,
        subject: InstanceId,
    ) -> i64 {
        match state.find_friend(subject) {
            Some((seat, _)) if seat == owner => self.amount,
            _ => 0,
        }
    }
}

/// Counter response: the attacking friend loses power this turn. The
/// battle resolver supplies the attacker as the single target.
pub struct WeakenAttacker {
    amount: i64,
    description: String,
}

impl WeakenAttacker {
    #[must_use]
    pub fn new(amount: i64) -> Self {
        Self {
            amount,
            description: format!("The attacking friend gets -{amount} power this turn"),
        }
    }
}

impl Ability for WeakenAttacker {
    fn description(&self) -> &str {
        &self.description
    }

    fn resolve(&self, ctx: &mut AbilityCtx<'_>, targets: &[InstanceId]) -> Result<(), GameError> {
        let turn = ctx.state.turn;
        for &target in targets {
            ctx.state.add_modifier(
                target,
                PowerModifier {
                    amount: -self.amount,
                    scope: ModifierScope::ThisTurn,
                    turn_applied: turn,
                },
            );
        }
        Ok(())
    }
}
