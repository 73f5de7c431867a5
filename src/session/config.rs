//! Session configuration.

use std::time::Duration;

use crate::core::SeatPair;
use crate::cpu::Difficulty;

/// Who is playing a seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorKind {
    /// Decisions arrive through the decision gateway.
    Human,
    /// Decisions are computed by the strategy engine.
    Cpu(Difficulty),
}

impl ActorKind {
    #[must_use]
    pub fn is_human(self) -> bool {
        matches!(self, ActorKind::Human)
    }
}

/// Options fixed for the lifetime of one session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// RNG seed; the same seed with the same decisions replays the game.
    pub seed: u64,
    pub actors: SeatPair<ActorKind>,
    /// Computation budget for one `run_cpu_turn` call. On overrun the turn
    /// is force-ended instead of left wedged.
    pub cpu_turn_budget: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            actors: SeatPair::with_value(ActorKind::Human),
            cpu_turn_budget: Duration::from_secs(5),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_actor(mut self, seat: crate::core::Seat, actor: ActorKind) -> Self {
        *self.actors.get_mut(seat) = actor;
        self
    }

    #[must_use]
    pub fn with_cpu_turn_budget(mut self, budget: Duration) -> Self {
        self.cpu_turn_budget = budget;
        self
    }
}
