//! # tcg-sim
//!
//! A game session engine for a two-player collectible-card battle: the
//! turn/phase state machine, cost and energy resolution, combat with
//! blocking and countering, a triggered-ability engine and a scripted
//! opponent at three difficulty tiers.
//!
//! The crate is the simulation core only. Presentation, pacing, deck
//! editing and persistence live outside; they talk to a [`GameSession`]
//! through plain method calls and answer its pending
//! [`DecisionRequest`]s.
//!
//! ```
//! use tcg_sim::{
//!     content, ActorKind, Difficulty, GameSession, Seat, SeatPair, SessionConfig,
//! };
//!
//! let (catalog, registry) = content::demo_catalog();
//! let deck = content::scripted_deck(&catalog);
//! let config = SessionConfig::default()
//!     .with_seed(7)
//!     .with_actor(Seat::First, ActorKind::Cpu(Difficulty::Normal))
//!     .with_actor(Seat::Second, ActorKind::Cpu(Difficulty::Hard));
//!
//! let mut session = GameSession::new(
//!     catalog,
//!     registry,
//!     SeatPair::with_value(deck),
//!     config,
//! )
//! .unwrap();
//! session.begin().unwrap();
//! while !session.is_over() {
//!     session.run_cpu_turn().unwrap();
//! }
//! assert!(session.winner().is_some());
//! ```

pub mod abilities;
pub mod battle;
pub mod cards;
pub mod content;
pub mod core;
pub mod cost;
pub mod cpu;
pub mod gateway;
pub mod session;
pub mod state;

pub use abilities::{Ability, AbilityRegistry, TargetPreference, TargetQuery, TriggerKind};
pub use battle::{BattleEvent, BattleRecord, CombatOutcome};
pub use cards::{
    CardCatalog, CardDefinition, CardId, CardInstance, CardKind, Color, CostProfile, InstanceId,
    Zone,
};
pub use crate::core::{GameError, GameRng, Seat, SeatPair};
pub use cost::{Payment, PaymentSource};
pub use cpu::Difficulty;
pub use gateway::DecisionRequest;
pub use session::{ActorKind, GameSession, SessionConfig};
pub use state::{GameState, Phase};
