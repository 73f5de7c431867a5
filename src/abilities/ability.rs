//! The ability handler interface.

use serde::{Deserialize, Serialize};

use crate::cards::{CardCatalog, InstanceId};
use crate::core::{GameError, Seat};
use crate::state::GameState;

/// When an ability fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    /// A Friend enters the battlefield.
    OnPlay,
    /// A Friend declares an attack.
    OnAttack,
    /// A Friend blocks.
    OnBlock,
    /// A Support card is played during the main phase.
    Main,
    /// Continuous while the source is in play (Field cards and static
    /// friend abilities).
    Persistent,
    /// A counter card is played against an incoming attack.
    Counter,
}

/// Which candidate the scripted player picks when an ability needs a
/// target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetPreference {
    Strongest,
    Weakest,
}

/// A request for targets raised by an ability activation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetQuery {
    pub candidates: Vec<InstanceId>,
    pub min: usize,
    pub max: usize,
    pub mandatory: bool,
    pub preference: TargetPreference,
    pub description: String,
}

/// Mutable context an ability resolves against.
pub struct AbilityCtx<'a> {
    pub state: &'a mut GameState,
    pub catalog: &'a CardCatalog,
    /// Seat controlling the ability.
    pub owner: Seat,
    /// Instance the ability is printed on.
    pub source: InstanceId,
}

/// One triggered or persistent ability.
///
/// Activation is two-phase so a human can be consulted between them:
/// `target_request` names the choice (if any), `resolve` applies the
/// effect once the targets are known.
pub trait Ability: Send + Sync {
    /// Human-readable effect text.
    fn description(&self) -> &str;

    /// Targets this activation needs, or `None` for an untargeted effect.
    /// `None` is also correct when no legal candidate exists; `resolve`
    /// then runs with no targets.
    fn target_request(
        &self,
        state: &GameState,
        catalog: &CardCatalog,
        owner: Seat,
        source: InstanceId,
    ) -> Option<TargetQuery> {
        let _ = (state, catalog, owner, source);
        None
    }

    /// Apply the effect. `targets` is empty for untargeted effects and for
    /// declined optional ones.
    fn resolve(&self, ctx: &mut AbilityCtx<'_>, targets: &[InstanceId]) -> Result<(), GameError>;

    /// Continuous power contribution to `subject` while the source is in
    /// play. Zero for non-static abilities.
    fn static_power_bonus(
        &self,
        state: &GameState,
        catalog: &CardCatalog,
        owner: Seat,
        source: InstanceId,
        subject: InstanceId,
    ) -> i64 {
        let _ = (state, catalog, owner, source, subject);
        0
    }
}
