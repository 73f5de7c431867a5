//! Seat identification and per-seat data storage.
//!
//! The engine is strictly two-player: every game has a first seat and a
//! second seat. `Seat` is the identifier; `SeatPair` stores one value per
//! seat with `Index`/`IndexMut` access.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two seats in a game.
///
/// The first seat takes the first turn. Which seat is human or computer is
/// session configuration, not a property of the seat itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    /// The opposing seat.
    #[must_use]
    pub const fn rival(self) -> Self {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    /// 0-based index, First = 0.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }

    /// Both seats, first seat first.
    #[must_use]
    pub const fn both() -> [Seat; 2] {
        [Seat::First, Seat::Second]
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Seat::First => write!(f, "seat 1"),
            Seat::Second => write!(f, "seat 2"),
        }
    }
}

/// Per-seat data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use tcg_sim::core::{Seat, SeatPair};
///
/// let mut flags = SeatPair::with_value(false);
/// flags[Seat::First] = true;
/// assert!(flags[Seat::First]);
/// assert!(!flags[Seat::Second]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatPair<T> {
    data: [T; 2],
}

impl<T> SeatPair<T> {
    /// Create a pair with values from a factory function.
    pub fn new(factory: impl Fn(Seat) -> T) -> Self {
        Self {
            data: [factory(Seat::First), factory(Seat::Second)],
        }
    }

    /// Create a pair with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Get a reference to a seat's value.
    #[must_use]
    pub fn get(&self, seat: Seat) -> &T {
        &self.data[seat.index()]
    }

    /// Get a mutable reference to a seat's value.
    pub fn get_mut(&mut self, seat: Seat) -> &mut T {
        &mut self.data[seat.index()]
    }

    /// Iterate over `(Seat, &T)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Seat, &T)> {
        Seat::both().into_iter().map(move |s| (s, self.get(s)))
    }
}

impl<T: Default> Default for SeatPair<T> {
    fn default() -> Self {
        Self::new(|_| T::default())
    }
}

impl<T> Index<Seat> for SeatPair<T> {
    type Output = T;

    fn index(&self, seat: Seat) -> &Self::Output {
        self.get(seat)
    }
}

impl<T> IndexMut<Seat> for SeatPair<T> {
    fn index_mut(&mut self, seat: Seat) -> &mut Self::Output {
        self.get_mut(seat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rival() {
        assert_eq!(Seat::First.rival(), Seat::Second);
        assert_eq!(Seat::Second.rival(), Seat::First);
        assert_eq!(Seat::First.rival().rival(), Seat::First);
    }

    #[test]
    fn test_index() {
        assert_eq!(Seat::First.index(), 0);
        assert_eq!(Seat::Second.index(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Seat::First), "seat 1");
        assert_eq!(format!("{}", Seat::Second), "seat 2");
    }

    #[test]
    fn test_seat_pair_factory() {
        let pair = SeatPair::new(|s| s.index() * 10);
        assert_eq!(pair[Seat::First], 0);
        assert_eq!(pair[Seat::Second], 10);
    }

    #[test]
    fn test_seat_pair_mutation() {
        let mut pair = SeatPair::with_value(0);
        pair[Seat::Second] = 7;
        assert_eq!(pair[Seat::First], 0);
        assert_eq!(pair[Seat::Second], 7);
    }

    #[test]
    fn test_seat_pair_iter() {
        let pair = SeatPair::new(|s| s.index() as i32);
        let entries: Vec<_> = pair.iter().collect();
        assert_eq!(entries, vec![(Seat::First, &0), (Seat::Second, &1)]);
    }

    #[test]
    fn test_serialization() {
        let pair = SeatPair::new(|s| s.index() as i32 + 1);
        let json = serde_json::to_string(&pair).unwrap();
        let back: SeatPair<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(pair, back);
    }
}
