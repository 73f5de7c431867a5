//! The game session: phase state machine, decision suspension and the
//! scripted-opponent turn driver.
//!
//! A `GameSession` owns everything for one game. All operations are
//! synchronous; when a human must choose, the operation parks a
//! `DecisionRequest` together with a resume point and returns. Answering
//! through the matching `resolve_*` method continues exactly where the
//! operation left off. At most one request is ever outstanding.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::abilities::{
    AbilityCtx, AbilityRegistry, EffectStack, EffectStackItem, PersistentEffect, TriggerKind,
};
use crate::battle::{self, BattleEvent, BattleRecord, CombatOutcome};
use crate::cards::{CardCatalog, CardId, CardKind, InstanceId, Zone};
use crate::core::{GameError, Seat, SeatPair};
use crate::cost::{self, Payment};
use crate::cpu::{self, Difficulty};
use crate::gateway::{
    BlockingRequest, CostSelectionRequest, CounterRequest, DecisionRequest, TargetSelectionRequest,
};
use crate::session::config::{ActorKind, SessionConfig};
use crate::state::{
    EnergySlot, FieldSlot, FriendSlot, GameState, Phase, MAX_ENERGY, MAX_FRIENDS, OPENING_HAND,
};

/// The attack being resolved across suspension points.
#[derive(Clone, Copy, Debug)]
struct AttackContext {
    seat: Seat,
    attacker: InstanceId,
}

/// What to run once a suspended ability resolution completes.
#[derive(Clone, Copy, Debug)]
enum AfterAbility {
    Nothing,
    ContinueAttack(AttackContext),
    ResolveClash {
        attack: AttackContext,
        blocker: InstanceId,
    },
}

/// Where a resolved decision picks the suspended operation back up.
#[derive(Clone, Debug)]
enum Resume {
    PayFor {
        seat: Seat,
        card: InstanceId,
    },
    AbilityTargets {
        seat: Seat,
        source: InstanceId,
        kind: TriggerKind,
        then: AfterAbility,
    },
    Block(AttackContext),
    Counter(AttackContext),
}

#[derive(Debug)]
struct PendingDecision {
    request: DecisionRequest,
    resume: Resume,
}

/// Why a scripted turn was aborted.
enum CpuFault {
    Timeout,
    Game(GameError),
}

impl From<GameError> for CpuFault {
    fn from(err: GameError) -> Self {
        CpuFault::Game(err)
    }
}

/// One game in progress.
pub struct GameSession {
    catalog: CardCatalog,
    registry: AbilityRegistry,
    config: SessionConfig,
    state: GameState,
    stack: EffectStack,
    persistent: Vec<PersistentEffect>,
    record: BattleRecord,
    pending: Option<PendingDecision>,
    /// Remaining planned attackers for the scripted turn in progress.
    cpu_queue: Option<Vec<InstanceId>>,
}

impl GameSession {
    /// Build a session: seed and shuffle both decks, draw opening hands.
    /// The session starts in the setup phase; call `begin` to start play.
    pub fn new(
        catalog: CardCatalog,
        registry: AbilityRegistry,
        decks: SeatPair<Vec<CardId>>,
        config: SessionConfig,
    ) -> Result<Self, GameError> {
        for seat in Seat::both() {
            for &card in decks.get(seat) {
                if !catalog.contains(card) {
                    return Err(GameError::CardNotFound(card));
                }
            }
        }

        let mut state = GameState::new(config.seed);
        for seat in Seat::both() {
            state.seed_deck(seat, &catalog, decks.get(seat));
            state.shuffle_deck(seat);
            for _ in 0..OPENING_HAND {
                state.draw(seat);
            }
        }
        info!(seed = config.seed, "session created");

        Ok(Self {
            catalog,
            registry,
            config,
            state,
            stack: EffectStack::new(),
            persistent: Vec::new(),
            record: BattleRecord::new(),
            pending: None,
            cpu_queue: None,
        })
    }

    // Accessors.

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn registry(&self) -> &AbilityRegistry {
        &self.registry
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    #[must_use]
    pub fn active_seat(&self) -> Seat {
        self.state.active
    }

    #[must_use]
    pub fn winner(&self) -> Option<Seat> {
        self.state.winner
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.state.phase == Phase::GameOver
    }

    /// The outstanding decision request, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&DecisionRequest> {
        self.pending.as_ref().map(|p| &p.request)
    }

    /// Abilities currently resolving, outermost first.
    #[must_use]
    pub fn effect_stack(&self) -> &EffectStack {
        &self.stack
    }

    /// Continuous effects seen this game, in play order.
    #[must_use]
    pub fn persistent_effects(&self) -> &[PersistentEffect] {
        &self.persistent
    }

    /// Take all battle events recorded since the last call.
    pub fn drain_battle_events(&mut self) -> Vec<BattleEvent> {
        self.record.drain()
    }

    // Setup.

    /// Return the seat's opening hand to the deck, reshuffle and redraw.
    /// Allowed once per seat, during setup only.
    pub fn mulligan(&mut self, seat: Seat) -> Result<(), GameError> {
        if self.state.phase != Phase::Setup {
            return Err(GameError::IllegalPhase(self.state.phase));
        }
        if self.state.player(seat).mulligan_taken {
            return Err(GameError::MulliganUsed(seat));
        }

        let hand = std::mem::take(&mut self.state.player_mut(seat).hand);
        for id in hand {
            self.state.player_mut(seat).deck.push(id);
            self.state.set_zone(id, Zone::Deck);
        }
        self.state.shuffle_deck(seat);
        for _ in 0..OPENING_HAND {
            self.state.draw(seat);
        }
        self.state.player_mut(seat).mulligan_taken = true;
        info!(%seat, "mulligan taken");
        Ok(())
    }

    /// Leave setup and start the first turn.
    pub fn begin(&mut self) -> Result<(), GameError> {
        if self.state.phase != Phase::Setup {
            return Err(GameError::IllegalPhase(self.state.phase));
        }
        self.start_turn();
        Ok(())
    }

    // Turn structure.

    fn start_turn(&mut self) {
        if self.is_over() {
            return;
        }
        self.state.phase = Phase::Start;
        let seat = self.state.active;
        self.state.player_mut(seat).untap_all();
        self.prune_modifiers();

        // The seat to move loses on an empty deck or a full damage pile.
        let player = self.state.player(seat);
        if player.deck.is_empty() {
            info!(%seat, "deck out");
            self.set_winner(seat.rival());
            return;
        }
        if player.negative_energy.len() >= crate::state::NEGATIVE_ENERGY_LOSS {
            info!(%seat, "negative energy threshold reached");
            self.set_winner(seat.rival());
            return;
        }

        self.state.phase = Phase::Draw;
        // The starting seat skips the game's very first draw.
        if !(self.state.turn == 1 && seat == Seat::First) {
            self.state.draw(seat);
        }
        self.state.phase = Phase::Energy;
        info!(turn = self.state.turn, %seat, "turn started");
    }

    fn run_end_step(&mut self) {
        if self.is_over() {
            return;
        }
        self.state.phase = Phase::End;
        let seat = self.state.active;
        let discarded = self.state.discard_to_limit(seat);
        if !discarded.is_empty() {
            debug!(%seat, count = discarded.len(), "discarded to hand limit");
        }
        self.prune_modifiers();

        self.state.active = seat.rival();
        if self.state.active == Seat::First {
            self.state.turn += 1;
        }
        self.state.energy_played_this_turn = false;
        self.cpu_queue = None;
    }

    fn prune_modifiers(&mut self) {
        for seat in Seat::both() {
            self.state.player_mut(seat).prune_expired_modifiers();
        }
    }

    fn set_winner(&mut self, seat: Seat) {
        if self.state.winner.is_none() {
            self.state.winner = Some(seat);
            self.state.phase = Phase::GameOver;
            info!(winner = %seat, "game over");
        }
    }

    fn guard_action(&self, seat: Seat, phase: Phase) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if self.state.phase != phase {
            return Err(GameError::IllegalPhase(self.state.phase));
        }
        if self.state.active != seat {
            return Err(GameError::NotYourTurn(seat));
        }
        if self.pending.is_some() {
            return Err(GameError::DecisionPending);
        }
        Ok(())
    }

    // Energy phase.

    /// Commit a hand card as an energy resource. One per turn.
    pub fn play_energy(&mut self, seat: Seat, hand_index: usize) -> Result<(), GameError> {
        self.guard_action(seat, Phase::Energy)?;
        if self.state.energy_played_this_turn {
            return Err(GameError::EnergyAlreadyPlayed);
        }
        if self.state.player(seat).energy.len() >= MAX_ENERGY {
            return Err(GameError::ZoneFull);
        }
        let id = *self
            .state
            .player(seat)
            .hand
            .get(hand_index)
            .ok_or(GameError::EmptySlot)?;

        self.commit_energy(seat, id)?;
        self.state.phase = Phase::Main;
        Ok(())
    }

    /// Skip the energy play and move to the main phase.
    pub fn pass_energy(&mut self, seat: Seat) -> Result<(), GameError> {
        self.guard_action(seat, Phase::Energy)?;
        self.state.phase = Phase::Main;
        Ok(())
    }

    fn commit_energy(&mut self, seat: Seat, id: InstanceId) -> Result<(), GameError> {
        self.state.take_from_hand(seat, id)?;
        self.state.player_mut(seat).energy.push(EnergySlot::new(id));
        self.state.set_zone(id, Zone::Energy);
        self.state.energy_played_this_turn = true;
        debug!(%seat, "energy committed");
        Ok(())
    }

    // Main phase.

    /// Play a hand card. Friends enter the battlefield, Supports resolve
    /// and are trashed, a Field replaces any previous one.
    ///
    /// For a human seat with a non-free cost this parks a cost-selection
    /// request; the play completes (or aborts) when it is answered.
    pub fn play_card(&mut self, seat: Seat, hand_index: usize) -> Result<(), GameError> {
        self.guard_action(seat, Phase::Main)?;
        let id = *self
            .state
            .player(seat)
            .hand
            .get(hand_index)
            .ok_or(GameError::EmptySlot)?;
        let card = self.catalog.get_unchecked(self.state.card_of(id)?);

        if card.kind == CardKind::Friend && self.state.player(seat).friends.len() >= MAX_FRIENDS {
            return Err(GameError::ZoneFull);
        }
        let cost = card.cost;
        if !cost::can_pay_cost(&self.state, &self.catalog, seat, &cost) {
            return Err(GameError::CannotPayCost);
        }

        if cost.is_free() {
            return self.finish_play(seat, id);
        }
        if self.config.actors[seat].is_human() {
            return self.park(
                DecisionRequest::CostSelection(CostSelectionRequest { card: id, cost }),
                Resume::PayFor { seat, card: id },
            );
        }
        let payment = cost::auto_payment(&self.state, &self.catalog, seat, &cost)
            .ok_or(GameError::CannotPayCost)?;
        cost::apply_payment(&mut self.state, seat, &payment);
        self.finish_play(seat, id)
    }

    fn finish_play(&mut self, seat: Seat, id: InstanceId) -> Result<(), GameError> {
        self.state.take_from_hand(seat, id)?;
        let card = self.catalog.get_unchecked(self.state.card_of(id)?);
        let kind = card.kind;
        debug!(%seat, name = %card.name, "card played");

        match kind {
            CardKind::Friend => {
                let turn = self.state.turn;
                self.state
                    .player_mut(seat)
                    .friends
                    .push(FriendSlot::new(id, turn));
                self.state.set_zone(id, Zone::Friends);
                self.fire_trigger(seat, id, TriggerKind::OnPlay, AfterAbility::Nothing)
            }
            CardKind::Support => {
                self.state.to_graveyard(seat, id);
                self.fire_trigger(seat, id, TriggerKind::Main, AfterAbility::Nothing)
            }
            CardKind::Field => {
                if let Some(old) = self.state.player_mut(seat).field.take() {
                    self.state.to_graveyard(seat, old.instance);
                    for effect in &mut self.persistent {
                        if effect.source == old.instance {
                            effect.active = false;
                        }
                    }
                }
                self.state.player_mut(seat).field = Some(FieldSlot { instance: id });
                self.state.set_zone(id, Zone::Field);
                let card_id = self.state.card_of(id)?;
                let description = self
                    .registry
                    .get(card_id, TriggerKind::Persistent)
                    .map(|a| a.description().to_owned())
                    .unwrap_or_else(|| self.catalog.get_unchecked(card_id).name.clone());
                self.persistent.push(PersistentEffect {
                    source: id,
                    description,
                    active: true,
                });
                Ok(())
            }
        }
    }

    /// Declare an attack with the friend in the given slot.
    pub fn declare_attack(&mut self, seat: Seat, slot_index: usize) -> Result<(), GameError> {
        self.guard_action(seat, Phase::Main)?;
        let attacker = battle::check_attack_legal(&self.state, &self.catalog, seat, slot_index)?;
        self.state.player_mut(seat).friends[slot_index].tapped = true;
        debug!(%seat, slot_index, "attack declared");
        self.fire_trigger(
            seat,
            attacker,
            TriggerKind::OnAttack,
            AfterAbility::ContinueAttack(AttackContext { seat, attacker }),
        )
    }

    /// End the main phase, run the end step and start the rival's turn.
    pub fn end_turn(&mut self, seat: Seat) -> Result<(), GameError> {
        self.guard_action(seat, Phase::Main)?;
        self.run_end_step();
        self.start_turn();
        Ok(())
    }

    // Ability plumbing.

    fn park(&mut self, request: DecisionRequest, resume: Resume) -> Result<(), GameError> {
        if self.pending.is_some() {
            return Err(GameError::DecisionPending);
        }
        debug!(kind = request.kind(), "decision request parked");
        self.pending = Some(PendingDecision { request, resume });
        Ok(())
    }

    /// Fire a trigger on `source`, then continue with `then`. Suspends for
    /// human target selection; the scripted player picks synchronously.
    fn fire_trigger(
        &mut self,
        seat: Seat,
        source: InstanceId,
        kind: TriggerKind,
        then: AfterAbility,
    ) -> Result<(), GameError> {
        let card = self.state.card_of(source)?;
        let Some(ability) = self.registry.get(card, kind) else {
            return self.continue_after(then);
        };
        self.stack.push(EffectStackItem {
            source,
            owner: seat,
            description: ability.description().to_owned(),
        });

        let query = ability.target_request(&self.state, &self.catalog, seat, source);
        match query {
            Some(query) => {
                if self.config.actors[seat].is_human() {
                    self.park(
                        DecisionRequest::TargetSelection(TargetSelectionRequest {
                            source,
                            query,
                        }),
                        Resume::AbilityTargets {
                            seat,
                            source,
                            kind,
                            then,
                        },
                    )
                } else {
                    let targets = cpu::pick_targets(&self.state, &self.catalog, &self.registry, &query);
                    self.resolve_ability_now(seat, source, kind, &targets, then)
                }
            }
            None => self.resolve_ability_now(seat, source, kind, &[], then),
        }
    }

    /// Run an ability whose targets are settled and pop it off the stack.
    fn resolve_ability_now(
        &mut self,
        seat: Seat,
        source: InstanceId,
        kind: TriggerKind,
        targets: &[InstanceId],
        then: AfterAbility,
    ) -> Result<(), GameError> {
        let card = self.state.card_of(source)?;
        if let Some(ability) = self.registry.get(card, kind) {
            let mut ctx = AbilityCtx {
                state: &mut self.state,
                catalog: &self.catalog,
                owner: seat,
                source,
            };
            ability.resolve(&mut ctx, targets)?;
        }
        self.stack.pop();
        self.continue_after(then)
    }

    fn continue_after(&mut self, then: AfterAbility) -> Result<(), GameError> {
        match then {
            AfterAbility::Nothing => Ok(()),
            AfterAbility::ContinueAttack(attack) => self.continue_attack(attack),
            AfterAbility::ResolveClash { attack, blocker } => self.finish_clash(attack, blocker),
        }
    }

    // Combat.

    fn continue_attack(&mut self, attack: AttackContext) -> Result<(), GameError> {
        if self.is_over() {
            return Ok(());
        }
        // The on-attack ability may have removed the attacker.
        if self.state.find_friend(attack.attacker).is_none() {
            return Ok(());
        }
        let defender = attack.seat.rival();
        let candidates: Vec<InstanceId> = self
            .state
            .player(defender)
            .friends
            .iter()
            .filter(|f| !f.tapped)
            .map(|f| f.instance)
            .collect();

        if candidates.is_empty() {
            return self.unblocked(attack);
        }
        match self.config.actors[defender] {
            ActorKind::Human => self.park(
                DecisionRequest::Blocking(BlockingRequest {
                    attacking_seat: attack.seat,
                    attacker: attack.attacker,
                    candidate_blockers: candidates,
                }),
                Resume::Block(attack),
            ),
            ActorKind::Cpu(difficulty) => {
                let mut rng = self.state.rng.clone();
                let choice = cpu::choose_blocker(
                    &self.state,
                    &self.catalog,
                    &self.registry,
                    attack.attacker,
                    &candidates,
                    difficulty,
                    &mut rng,
                );
                self.state.rng = rng;
                match choice {
                    Some(blocker) => self.block_with(attack, blocker),
                    None => self.unblocked(attack),
                }
            }
        }
    }

    fn block_with(&mut self, attack: AttackContext, blocker: InstanceId) -> Result<(), GameError> {
        let defender = attack.seat.rival();
        if let Some((seat, index)) = self.state.find_friend(blocker) {
            if seat == defender {
                self.state.player_mut(seat).friends[index].tapped = true;
            }
        }
        self.fire_trigger(
            defender,
            blocker,
            TriggerKind::OnBlock,
            AfterAbility::ResolveClash { attack, blocker },
        )
    }

    fn unblocked(&mut self, attack: AttackContext) -> Result<(), GameError> {
        let defender = attack.seat.rival();
        if self.config.actors[defender].is_human() {
            let candidates = cpu::counter_candidates(&self.state, &self.catalog, defender);
            if !candidates.is_empty() {
                return self.park(
                    DecisionRequest::Counter(CounterRequest {
                        attacker: attack.attacker,
                        candidates,
                    }),
                    Resume::Counter(attack),
                );
            }
        }
        self.finish_hit(attack)
    }

    fn finish_clash(&mut self, attack: AttackContext, blocker: InstanceId) -> Result<(), GameError> {
        // An on-block ability may have removed a participant; the clash
        // only happens between friends still on the battlefield.
        if self.state.find_friend(attack.attacker).is_none()
            || self.state.find_friend(blocker).is_none()
        {
            return Ok(());
        }
        battle::resolve_clash(
            &mut self.state,
            &self.catalog,
            &self.registry,
            attack.seat,
            attack.attacker,
            blocker,
            &mut self.record,
        );
        Ok(())
    }

    fn finish_hit(&mut self, attack: AttackContext) -> Result<(), GameError> {
        let outcome = battle::resolve_hit(
            &mut self.state,
            &self.catalog,
            &self.registry,
            attack.seat,
            attack.attacker,
            &mut self.record,
        );
        if outcome == (CombatOutcome::Hit { lethal: true }) {
            self.set_winner(attack.seat);
        }
        Ok(())
    }

    // Decision resolution.

    /// Answer a blocking request. `None` declines the block.
    pub fn resolve_blocking(&mut self, choice: Option<InstanceId>) -> Result<(), GameError> {
        let valid = match &self.pending {
            Some(PendingDecision {
                request: DecisionRequest::Blocking(req),
                ..
            }) => choice.map_or(true, |b| req.candidate_blockers.contains(&b)),
            _ => return Err(GameError::NoSuchDecision),
        };
        if !valid {
            return Err(GameError::SelectionInvalid("not a legal blocker"));
        }
        let Some(PendingDecision {
            resume: Resume::Block(attack),
            ..
        }) = self.pending.take()
        else {
            return Err(GameError::NoSuchDecision);
        };
        match choice {
            Some(blocker) => self.block_with(attack, blocker),
            None => self.unblocked(attack),
        }
    }

    /// Answer a counter request. `None` lets the hit land as-is. The
    /// counter's own cost is paid with the deterministic auto-payment.
    pub fn resolve_counter(&mut self, choice: Option<InstanceId>) -> Result<(), GameError> {
        let valid = match &self.pending {
            Some(PendingDecision {
                request: DecisionRequest::Counter(req),
                ..
            }) => choice.map_or(true, |c| req.candidates.contains(&c)),
            _ => return Err(GameError::NoSuchDecision),
        };
        if !valid {
            return Err(GameError::SelectionInvalid("not a playable counter"));
        }
        let Some(PendingDecision {
            resume: Resume::Counter(attack),
            ..
        }) = self.pending.take()
        else {
            return Err(GameError::NoSuchDecision);
        };

        if let Some(counter) = choice {
            let defender = attack.seat.rival();
            let card_id = self.state.card_of(counter)?;
            let cost = self.catalog.get_unchecked(card_id).cost;
            if let Some(payment) = cost::auto_payment(&self.state, &self.catalog, defender, &cost)
            {
                cost::apply_payment(&mut self.state, defender, &payment);
            }
            self.state.take_from_hand(defender, counter)?;
            self.state.to_graveyard(defender, counter);

            if self.registry.has(card_id, TriggerKind::Counter) {
                self.stack.push(EffectStackItem {
                    source: counter,
                    owner: defender,
                    description: self
                        .registry
                        .get(card_id, TriggerKind::Counter)
                        .map(|a| a.description().to_owned())
                        .unwrap_or_default(),
                });
                // The attacker is the implicit target of a counter.
                let targets = [attack.attacker];
                let card = self.state.card_of(counter)?;
                if let Some(ability) = self.registry.get(card, TriggerKind::Counter) {
                    let mut ctx = AbilityCtx {
                        state: &mut self.state,
                        catalog: &self.catalog,
                        owner: defender,
                        source: counter,
                    };
                    ability.resolve(&mut ctx, &targets)?;
                }
                self.stack.pop();
            }
        }
        self.finish_hit(attack)
    }

    /// Answer a cost-selection request. `None` aborts the play with no
    /// state change; an insufficient selection is rejected and the request
    /// stays outstanding.
    pub fn resolve_cost_selection(&mut self, selection: Option<Payment>) -> Result<(), GameError> {
        let (seat, card) = match &self.pending {
            Some(PendingDecision {
                request: DecisionRequest::CostSelection(_),
                resume: Resume::PayFor { seat, card },
            }) => (*seat, *card),
            _ => return Err(GameError::NoSuchDecision),
        };
        let Some(payment) = selection else {
            self.pending = None;
            debug!(%seat, "cost selection cancelled");
            return Ok(());
        };

        let cost = self.catalog.get_unchecked(self.state.card_of(card)?).cost;
        cost::validate_payment(&self.state, &self.catalog, seat, &cost, &payment)?;
        self.pending = None;
        cost::apply_payment(&mut self.state, seat, &payment);
        self.finish_play(seat, card)
    }

    /// Answer a target-selection request. An empty selection declines an
    /// optional effect; an invalid one is rejected and the request stays
    /// outstanding.
    pub fn resolve_target_selection(
        &mut self,
        targets: Vec<InstanceId>,
    ) -> Result<(), GameError> {
        let ok = match &self.pending {
            Some(PendingDecision {
                request: DecisionRequest::TargetSelection(req),
                ..
            }) => {
                let query = &req.query;
                let distinct = targets
                    .iter()
                    .all(|t| targets.iter().filter(|u| *u == t).count() == 1);
                let known = targets.iter().all(|t| query.candidates.contains(t));
                let count_ok = if targets.is_empty() {
                    !query.mandatory
                } else {
                    targets.len() >= query.min && targets.len() <= query.max
                };
                distinct && known && count_ok
            }
            _ => return Err(GameError::NoSuchDecision),
        };
        if !ok {
            return Err(GameError::SelectionInvalid("bad target selection"));
        }
        let Some(PendingDecision {
            resume:
                Resume::AbilityTargets {
                    seat,
                    source,
                    kind,
                    then,
                },
            ..
        }) = self.pending.take()
        else {
            return Err(GameError::NoSuchDecision);
        };

        if targets.is_empty() {
            // Declined: the ability leaves the stack without resolving.
            self.stack.pop();
            return self.continue_after(then);
        }
        self.resolve_ability_now(seat, source, kind, &targets, then)
    }

    /// Cancel the outstanding request, if it permits cancellation.
    pub fn cancel_pending(&mut self) -> Result<(), GameError> {
        let request = self
            .pending
            .as_ref()
            .map(|p| &p.request)
            .ok_or(GameError::NoSuchDecision)?;
        if !request.cancellable() {
            return Err(GameError::MandatoryDecision);
        }
        match request {
            DecisionRequest::Blocking(_) => self.resolve_blocking(None),
            DecisionRequest::Counter(_) => self.resolve_counter(None),
            DecisionRequest::CostSelection(_) => self.resolve_cost_selection(None),
            DecisionRequest::TargetSelection(_) => self.resolve_target_selection(Vec::new()),
        }
    }

    // Scripted turn driver.

    /// Advance the scripted player's turn as far as possible.
    ///
    /// Returns with the turn ended, the game over, or a decision request
    /// parked for the human defender; call again after resolving it. Any
    /// fault or budget overrun force-ends the turn instead of propagating.
    pub fn run_cpu_turn(&mut self) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        let seat = self.state.active;
        let ActorKind::Cpu(difficulty) = self.config.actors[seat] else {
            return Err(GameError::NotYourTurn(seat));
        };
        if self.pending.is_some() {
            return Err(GameError::DecisionPending);
        }

        let deadline = Instant::now() + self.config.cpu_turn_budget;
        match self.cpu_turn_inner(seat, difficulty, deadline) {
            Ok(()) => Ok(()),
            Err(CpuFault::Timeout) => {
                warn!(%seat, "scripted turn exceeded its budget, forcing end of turn");
                self.force_end_turn();
                Ok(())
            }
            Err(CpuFault::Game(err)) => {
                warn!(%seat, %err, "scripted turn faulted, forcing end of turn");
                self.force_end_turn();
                Ok(())
            }
        }
    }

    fn cpu_turn_inner(
        &mut self,
        seat: Seat,
        difficulty: Difficulty,
        deadline: Instant,
    ) -> Result<(), CpuFault> {
        let check = |deadline: Instant| -> Result<(), CpuFault> {
            if Instant::now() >= deadline {
                Err(CpuFault::Timeout)
            } else {
                Ok(())
            }
        };

        if self.state.phase == Phase::Energy {
            check(deadline)?;
            if !self.state.energy_played_this_turn
                && self.state.player(seat).energy.len() < MAX_ENERGY
            {
                if let Some(card) = cpu::choose_energy_card(&self.state, &self.catalog, seat) {
                    self.commit_energy(seat, card)?;
                }
            }
            self.state.phase = Phase::Main;
        }
        if self.state.phase != Phase::Main {
            return Ok(());
        }

        if self.cpu_queue.is_none() {
            // Develop the board before attacking.
            loop {
                check(deadline)?;
                let Some(index) = self.cpu_friend_to_play(seat) else {
                    break;
                };
                self.play_card(seat, index)?;
                if self.is_over() {
                    return Ok(());
                }
            }
            let mut rng = self.state.rng.clone();
            let mut plan = cpu::plan_attacks(
                &self.state,
                &self.catalog,
                &self.registry,
                seat,
                difficulty,
                &mut rng,
            );
            self.state.rng = rng;
            plan.reverse();
            self.cpu_queue = Some(plan);
        }

        while let Some(attacker) = self.cpu_queue.as_mut().and_then(|queue| queue.pop()) {
            check(deadline)?;
            if self.is_over() {
                return Ok(());
            }
            let slot = match self.state.find_friend(attacker) {
                Some((s, index)) if s == seat => index,
                _ => continue,
            };
            match self.declare_attack(seat, slot) {
                Ok(()) => {}
                // Plans are made before attacks resolve; a friend tapped
                // or weakened in the meantime is skipped, not a fault.
                Err(GameError::AttackerTapped | GameError::Powerless | GameError::EmptySlot) => {
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
            if self.pending.is_some() {
                // Waiting on the human defender; the queue keeps the rest.
                return Ok(());
            }
        }

        self.cpu_queue = None;
        // The last planned attack may have ended the game.
        if self.is_over() {
            return Ok(());
        }
        self.run_end_step();
        self.start_turn();
        Ok(())
    }

    /// Hand index of the next friend the scripted player wants to play.
    fn cpu_friend_to_play(&self, seat: Seat) -> Option<usize> {
        if self.state.player(seat).friends.len() >= MAX_FRIENDS {
            return None;
        }
        for (index, &id) in self.state.player(seat).hand.iter().enumerate() {
            let Some(instance) = self.state.instance(id) else {
                continue;
            };
            let card = self.catalog.get_unchecked(instance.card);
            if card.kind != CardKind::Friend {
                continue;
            }
            if !cost::can_pay_cost(&self.state, &self.catalog, seat, &card.cost) {
                continue;
            }
            if cpu::wants_friend(&self.state, seat, card.base_power()) {
                return Some(index);
            }
        }
        None
    }

    fn force_end_turn(&mut self) {
        self.pending = None;
        self.cpu_queue = None;
        while self.stack.pop().is_some() {}
        self.run_end_step();
        self.start_turn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, Color, CostProfile};

    fn vanilla_pool() -> (CardCatalog, AbilityRegistry, CardId) {
        let mut catalog = CardCatalog::new();
        let id = catalog.next_id();
        catalog.register(
            CardDefinition::new(id, "Vanilla", CardKind::Friend, Color::Red)
                .with_cost(CostProfile::free())
                .with_power(2000),
        );
        (catalog, AbilityRegistry::new(), id)
    }

    fn session_of(size: usize, config: SessionConfig) -> GameSession {
        let (catalog, registry, card) = vanilla_pool();
        GameSession::new(
            catalog,
            registry,
            SeatPair::with_value(vec![card; size]),
            config,
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_deck_card_is_rejected() {
        let (catalog, registry, card) = vanilla_pool();
        let mut deck = vec![card; 10];
        deck.push(CardId::new(999));
        let result = GameSession::new(
            catalog,
            registry,
            SeatPair::with_value(deck),
            SessionConfig::default(),
        );
        assert!(matches!(result, Err(GameError::CardNotFound(_))));
    }

    #[test]
    fn test_setup_draws_opening_hands() {
        let session = session_of(50, SessionConfig::default());
        for seat in Seat::both() {
            assert_eq!(session.state().player(seat).hand.len(), 5);
            assert_eq!(session.state().player(seat).deck.len(), 45);
        }
        assert_eq!(session.phase(), Phase::Setup);
    }

    #[test]
    fn test_first_draw_is_skipped_for_starting_seat() {
        let mut session = session_of(50, SessionConfig::default());
        session.begin().unwrap();

        assert_eq!(session.phase(), Phase::Energy);
        assert_eq!(session.state().player(Seat::First).hand.len(), 5);

        session.pass_energy(Seat::First).unwrap();
        session.end_turn(Seat::First).unwrap();
        // The second seat does draw on its first turn.
        assert_eq!(session.state().player(Seat::Second).hand.len(), 6);
    }

    #[test]
    fn test_mulligan_once_per_seat() {
        let mut session = session_of(50, SessionConfig::default());
        session.mulligan(Seat::First).unwrap();

        assert_eq!(session.state().player(Seat::First).hand.len(), 5);
        assert_eq!(session.state().card_count(Seat::First), 50);
        assert!(matches!(
            session.mulligan(Seat::First),
            Err(GameError::MulliganUsed(Seat::First))
        ));

        session.begin().unwrap();
        assert!(matches!(
            session.mulligan(Seat::Second),
            Err(GameError::IllegalPhase(_))
        ));
    }

    #[test]
    fn test_energy_limit_per_turn() {
        let mut session = session_of(50, SessionConfig::default());
        session.begin().unwrap();

        session.play_energy(Seat::First, 0).unwrap();
        assert_eq!(session.phase(), Phase::Main);
        assert_eq!(session.state().player(Seat::First).energy.len(), 1);
        // The phase advanced, so a second energy play is an illegal-phase
        // failure before the per-turn flag is even consulted.
        assert!(session.play_energy(Seat::First, 0).is_err());
    }

    #[test]
    fn test_wrong_seat_is_rejected() {
        let mut session = session_of(50, SessionConfig::default());
        session.begin().unwrap();

        assert!(matches!(
            session.pass_energy(Seat::Second),
            Err(GameError::NotYourTurn(Seat::Second))
        ));
    }

    #[test]
    fn test_summoning_sickness_blocks_fresh_attacker() {
        let mut session = session_of(50, SessionConfig::default());
        session.begin().unwrap();
        session.pass_energy(Seat::First).unwrap();
        session.play_card(Seat::First, 0).unwrap();

        assert!(matches!(
            session.declare_attack(Seat::First, 0),
            Err(GameError::SummoningSickness)
        ));
    }

    #[test]
    fn test_winner_is_immutable() {
        let mut session = session_of(50, SessionConfig::default());
        session.begin().unwrap();
        session.set_winner(Seat::First);
        session.set_winner(Seat::Second);

        assert_eq!(session.winner(), Some(Seat::First));
        assert_eq!(session.phase(), Phase::GameOver);
    }

    #[test]
    fn test_deck_out_detected_at_start_of_turn() {
        // Six-card decks: five drawn at setup, one left.
        let mut session = session_of(6, SessionConfig::default());
        session.begin().unwrap();

        // First seat skips its draw, ends. Second draws its last card.
        session.pass_energy(Seat::First).unwrap();
        session.end_turn(Seat::First).unwrap();
        session.pass_energy(Seat::Second).unwrap();
        session.end_turn(Seat::Second).unwrap();
        // First draws its last card, ends. Second starts with an empty
        // deck and loses on the spot.
        session.pass_energy(Seat::First).unwrap();
        session.end_turn(Seat::First).unwrap();

        assert_eq!(session.winner(), Some(Seat::First));
        assert!(session.is_over());
    }

    #[test]
    fn test_end_step_discards_to_hand_limit() {
        let mut session = session_of(50, SessionConfig::default());
        session.begin().unwrap();

        // Stuff the hand past the limit by hand; the end step trims it.
        for _ in 0..5 {
            session.state.draw(Seat::First);
        }
        assert_eq!(session.state().player(Seat::First).hand.len(), 10);

        session.pass_energy(Seat::First).unwrap();
        session.end_turn(Seat::First).unwrap();

        assert_eq!(session.state().player(Seat::First).hand.len(), 7);
        assert_eq!(session.state().player(Seat::First).graveyard.len(), 3);
        assert_eq!(session.state().card_count(Seat::First), 50);
    }

    #[test]
    fn test_lethal_hit_on_last_planned_attack_ends_game() {
        let mut catalog = CardCatalog::new();
        let card = catalog.next_id();
        catalog.register(
            CardDefinition::new(card, "Raider", CardKind::Friend, Color::Red)
                .with_cost(CostProfile::colorless(1))
                .with_power(2000),
        );
        let config = SessionConfig::default()
            .with_actor(Seat::First, ActorKind::Cpu(Difficulty::Normal));
        let mut session = GameSession::new(
            catalog,
            AbilityRegistry::new(),
            SeatPair::with_value(vec![card; 50]),
            config,
        )
        .unwrap();
        session.begin().unwrap();
        for _ in 0..6 {
            session.state.inflict_negative_energy(Seat::Second);
        }

        // Turn 1: one energy, one friend, no attack (summoning sickness).
        session.run_cpu_turn().unwrap();
        assert_eq!(session.active_seat(), Seat::Second);
        session.pass_energy(Seat::Second).unwrap();
        session.end_turn(Seat::Second).unwrap();

        // Turn 2: exactly one attacker is eligible, so the lethal seventh
        // hit comes from the final entry in the attack queue. The turn
        // must end in game_over, not roll into another end step.
        session.run_cpu_turn().unwrap();

        assert!(session.is_over());
        assert_eq!(session.winner(), Some(Seat::First));
        assert_eq!(session.phase(), Phase::GameOver);
        assert_eq!(session.active_seat(), Seat::First);
        assert!(matches!(session.run_cpu_turn(), Err(GameError::GameOver)));
    }

    #[test]
    fn test_watchdog_forces_turn_end() {
        let config = SessionConfig::default()
            .with_actor(Seat::First, ActorKind::Cpu(Difficulty::Normal))
            .with_cpu_turn_budget(std::time::Duration::ZERO);
        let mut session = session_of(50, config);
        session.begin().unwrap();

        session.run_cpu_turn().unwrap();

        assert_eq!(session.active_seat(), Seat::Second);
        assert!(!session.is_over());
    }

    #[test]
    fn test_force_end_clears_decision_state() {
        let mut session = session_of(50, SessionConfig::default());
        session.begin().unwrap();
        session.pending = Some(PendingDecision {
            request: DecisionRequest::Blocking(BlockingRequest {
                attacking_seat: Seat::First,
                attacker: InstanceId::new(0),
                candidate_blockers: vec![],
            }),
            resume: Resume::Block(AttackContext {
                seat: Seat::First,
                attacker: InstanceId::new(0),
            }),
        });
        session.state.phase = Phase::Main;

        session.force_end_turn();

        assert!(session.pending().is_none());
        assert_eq!(session.active_seat(), Seat::Second);
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("phase", &self.state.phase)
            .field("active", &self.state.active)
            .field("turn", &self.state.turn)
            .field("winner", &self.state.winner)
            .field("pending", &self.pending.as_ref().map(|p| p.request.kind()))
            .finish()
    }
}
