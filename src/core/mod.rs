//! Core primitives: seats, deterministic RNG, errors.

mod error;
mod rng;
mod seat;

pub use error::GameError;
pub use rng::GameRng;
pub use seat::{Seat, SeatPair};
