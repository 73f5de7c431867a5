//! Scripted-opponent decision policies.
//!
//! Three difficulty tiers over the same decision shape. All tiers share
//! the pre-processing: eligible attackers and a strategic snapshot of both
//! boards. Attack and block choices return stable instance ids; the
//! session maps them back to slots at execution time, so friends that die
//! mid-sequence are skipped rather than mis-indexed.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::abilities::{AbilityRegistry, TargetPreference, TargetQuery};
use crate::battle::effective_power;
use crate::cards::{CardCatalog, InstanceId};
use crate::core::{GameRng, Seat};
use crate::state::GameState;

/// Scripted-opponent tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

/// Strategic read of both boards, shared by every tier.
#[derive(Clone, Debug)]
pub struct BoardSnapshot {
    /// Untapped friends with power that may legally attack, in slot order.
    pub eligible_attackers: Vec<InstanceId>,
    pub my_friends: usize,
    pub their_friends: usize,
    /// Highest effective power among eligible attackers.
    pub my_max_power: i64,
    /// Highest effective power among the defender's untapped friends.
    pub their_max_power: i64,
    /// The defender has strictly more available blockers than we have
    /// eligible attackers, and a strictly higher maximum power.
    pub outnumbered_and_outpowered: bool,
    outnumbered: bool,
    outpowered: bool,
}

impl BoardSnapshot {
    #[must_use]
    pub fn outnumbered(&self) -> bool {
        self.outnumbered
    }

    #[must_use]
    pub fn outpowered(&self) -> bool {
        self.outpowered
    }
}

/// Build the snapshot for the attacking seat.
#[must_use]
pub fn snapshot(
    state: &GameState,
    catalog: &CardCatalog,
    registry: &AbilityRegistry,
    seat: Seat,
) -> BoardSnapshot {
    let me = state.player(seat);
    let rival = state.player(seat.rival());

    let mut eligible = Vec::new();
    for (index, slot) in me.friends.iter().enumerate() {
        if crate::battle::check_attack_legal(state, catalog, seat, index).is_ok() {
            eligible.push(slot.instance);
        }
    }

    let my_max_power = eligible
        .iter()
        .map(|&id| effective_power(state, catalog, registry, id))
        .max()
        .unwrap_or(0);
    let blockers: Vec<InstanceId> = rival
        .friends
        .iter()
        .filter(|f| !f.tapped)
        .map(|f| f.instance)
        .collect();
    let their_max_power = blockers
        .iter()
        .map(|&id| effective_power(state, catalog, registry, id))
        .max()
        .unwrap_or(0);

    let outnumbered = blockers.len() > eligible.len();
    let outpowered = their_max_power > my_max_power;
    BoardSnapshot {
        my_friends: me.friends.len(),
        their_friends: rival.friends.len(),
        my_max_power,
        their_max_power,
        outnumbered_and_outpowered: outnumbered && outpowered,
        outnumbered,
        outpowered,
        eligible_attackers: eligible,
    }
}

/// The hand card to commit as energy: the lowest-cost card, but only while
/// fewer than 3 energy slots are held.
#[must_use]
pub fn choose_energy_card(
    state: &GameState,
    catalog: &CardCatalog,
    seat: Seat,
) -> Option<InstanceId> {
    if state.player(seat).energy.len() >= 3 {
        return None;
    }
    state
        .player(seat)
        .hand
        .iter()
        .filter_map(|&id| {
            let instance = state.instance(id)?;
            Some((id, catalog.get_unchecked(instance.card).cost.total))
        })
        .min_by_key(|&(_, cost)| cost)
        .map(|(id, _)| id)
}

/// Whether a friend of this power is worth playing right now.
///
/// Yes when the rival holds the wider board, the candidate is a real
/// threat, or our own board is thin.
#[must_use]
pub fn wants_friend(state: &GameState, seat: Seat, power: i64) -> bool {
    let mine = state.player(seat).friends.len();
    let theirs = state.player(seat.rival()).friends.len();
    theirs > mine || power >= 2000 || mine < 2
}

/// Which friends attack, and in what order.
#[must_use]
pub fn plan_attacks(
    state: &GameState,
    catalog: &CardCatalog,
    registry: &AbilityRegistry,
    seat: Seat,
    difficulty: Difficulty,
    rng: &mut GameRng,
) -> Vec<InstanceId> {
    let board = snapshot(state, catalog, registry, seat);
    let plan = match difficulty {
        Difficulty::Easy => {
            let heed_board = rng.gen_bool(0.5);
            if heed_board && board.outnumbered_and_outpowered {
                Vec::new()
            } else {
                board
                    .eligible_attackers
                    .iter()
                    .copied()
                    .filter(|_| rng.gen_bool(0.7))
                    .collect()
            }
        }
        Difficulty::Normal => {
            if board.outnumbered_and_outpowered {
                Vec::new()
            } else {
                board.eligible_attackers.clone()
            }
        }
        Difficulty::Hard => {
            let mut by_power: Vec<InstanceId> = board.eligible_attackers.clone();
            by_power.sort_by_key(|&id| std::cmp::Reverse(effective_power(state, catalog, registry, id)));
            if board.outnumbered() && !board.outpowered() {
                by_power.truncate(1);
            }
            by_power
        }
    };
    debug!(%seat, ?difficulty, attackers = plan.len(), "attack plan");
    plan
}

/// Outcome read of one blocking option.
#[derive(Clone, Copy, Debug)]
struct BlockOption {
    blocker: InstanceId,
    power: i64,
    mutual: bool,
    defeats_attacker: bool,
    survives: bool,
}

fn read_options(
    state: &GameState,
    catalog: &CardCatalog,
    registry: &AbilityRegistry,
    attacker: InstanceId,
    candidates: &[InstanceId],
) -> SmallVec<[BlockOption; 8]> {
    let attacker_power = effective_power(state, catalog, registry, attacker);
    candidates
        .iter()
        .map(|&blocker| {
            let power = effective_power(state, catalog, registry, blocker);
            BlockOption {
                blocker,
                power,
                mutual: power == attacker_power,
                defeats_attacker: power >= attacker_power,
                survives: power > attacker_power,
            }
        })
        .collect()
}

fn best_mutual(options: &[BlockOption]) -> Option<InstanceId> {
    options
        .iter()
        .filter(|o| o.mutual)
        .max_by_key(|o| o.power)
        .map(|o| o.blocker)
}

/// The blocking decision for one incoming attack. `None` declines.
#[must_use]
pub fn choose_blocker(
    state: &GameState,
    catalog: &CardCatalog,
    registry: &AbilityRegistry,
    attacker: InstanceId,
    candidates: &[InstanceId],
    difficulty: Difficulty,
    rng: &mut GameRng,
) -> Option<InstanceId> {
    if candidates.is_empty() {
        return None;
    }
    let options = read_options(state, catalog, registry, attacker, candidates);

    match difficulty {
        Difficulty::Easy => {
            if !rng.gen_bool(0.4) {
                return None;
            }
            if let Some(mutual) = best_mutual(&options) {
                if rng.gen_bool(0.3) {
                    return Some(mutual);
                }
            }
            let killers: SmallVec<[InstanceId; 8]> = options
                .iter()
                .filter(|o| o.defeats_attacker)
                .map(|o| o.blocker)
                .collect();
            if !killers.is_empty() && rng.gen_bool(0.5) {
                return killers.first().copied();
            }
            rng.choose(candidates).copied()
        }
        Difficulty::Normal => {
            if let Some(mutual) = best_mutual(&options) {
                return Some(mutual);
            }
            if let Some(survivor) = options.iter().find(|o| o.survives) {
                return Some(survivor.blocker);
            }
            if let Some(killer) = options.iter().find(|o| o.defeats_attacker) {
                return Some(killer.blocker);
            }
            if rng.gen_bool(0.6) {
                return candidates.first().copied();
            }
            None
        }
        Difficulty::Hard => {
            if let Some(mutual) = best_mutual(&options) {
                return Some(mutual);
            }
            if let Some(survivor) = options
                .iter()
                .filter(|o| o.survives)
                .min_by_key(|o| o.power)
            {
                return Some(survivor.blocker);
            }
            if let Some(trade) = options
                .iter()
                .filter(|o| o.defeats_attacker)
                .min_by_key(|o| o.power)
            {
                return Some(trade.blocker);
            }
            if rng.gen_bool(0.8) {
                return options.iter().min_by_key(|o| o.power).map(|o| o.blocker);
            }
            None
        }
    }
}

/// Tier-agnostic target choice for a resolving ability.
#[must_use]
pub fn pick_targets(
    state: &GameState,
    catalog: &CardCatalog,
    registry: &AbilityRegistry,
    query: &TargetQuery,
) -> Vec<InstanceId> {
    let mut ranked: Vec<InstanceId> = query.candidates.clone();
    match query.preference {
        TargetPreference::Strongest => ranked.sort_by_key(|&id| {
            std::cmp::Reverse(effective_power(state, catalog, registry, id))
        }),
        TargetPreference::Weakest => {
            ranked.sort_by_key(|&id| effective_power(state, catalog, registry, id));
        }
    }
    // The scripted player always uses an optional ability when it can.
    let count = query.min.max(1).min(query.max).min(ranked.len());
    ranked.truncate(count);
    ranked
}

/// Counter-usable, currently payable cards in the seat's hand. Used to
/// build the human counter request; the scripted player never counters.
#[must_use]
pub fn counter_candidates(
    state: &GameState,
    catalog: &CardCatalog,
    seat: Seat,
) -> Vec<InstanceId> {
    state
        .player(seat)
        .hand
        .iter()
        .copied()
        .filter(|&id| {
            state
                .instance(id)
                .map(|i| {
                    let card = catalog.get_unchecked(i.card);
                    card.counter && crate::cost::can_pay_cost(state, catalog, seat, &card.cost)
                })
                .unwrap_or(false)
        })
        .collect()
}
