//! Session control: the phase state machine, decision suspension and the
//! scripted-opponent turn driver.

mod config;
mod game;

pub use config::{ActorKind, SessionConfig};
pub use game::GameSession;
