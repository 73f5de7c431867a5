//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable catalog entry for a card: kind,
//! color, cost profile, printed power, energy value and rule flags.
//! Instance-specific data (zone, tapped, modifiers) lives in `CardInstance`
//! and the battlefield slot types.

use serde::{Deserialize, Serialize};

/// Unique identifier for a card definition.
///
/// Identifies the printing ("Hiyakeratops"), not a physical copy in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// The three playable card kinds.
///
/// Any card, regardless of kind, may instead be committed face-up to the
/// energy area as a resource; there is no separate energy kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    /// Battlefield creature that attacks and blocks.
    Friend,
    /// One-shot effect, discarded after resolution.
    Support,
    /// Continuous effect occupying the single field slot.
    Field,
}

/// Card colors. Costs may additionally have a colorless component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Yellow,
    Green,
}

impl Color {
    /// All colors, in the canonical payment order.
    #[must_use]
    pub const fn all() -> [Color; 4] {
        [Color::Red, Color::Blue, Color::Yellow, Color::Green]
    }
}

/// A card's cost: total plus up to four color-specific components.
///
/// The colorless remainder is `total - sum(color components)`; it can be
/// paid with energy of any color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostProfile {
    pub total: u8,
    pub red: u8,
    pub blue: u8,
    pub yellow: u8,
    pub green: u8,
}

impl CostProfile {
    /// A free cost.
    #[must_use]
    pub const fn free() -> Self {
        Self { total: 0, red: 0, blue: 0, yellow: 0, green: 0 }
    }

    /// A purely colorless cost.
    #[must_use]
    pub const fn colorless(total: u8) -> Self {
        Self { total, red: 0, blue: 0, yellow: 0, green: 0 }
    }

    /// The component required in a specific color.
    #[must_use]
    pub const fn of_color(&self, color: Color) -> u8 {
        match color {
            Color::Red => self.red,
            Color::Blue => self.blue,
            Color::Yellow => self.yellow,
            Color::Green => self.green,
        }
    }

    /// The colorless remainder of the total cost.
    #[must_use]
    pub fn colorless_part(&self) -> u8 {
        let colored = self.red + self.blue + self.yellow + self.green;
        self.total.saturating_sub(colored)
    }

    /// True if nothing needs to be paid.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.total == 0
    }
}

/// Static card definition - the immutable catalog entry.
///
/// ## Example
///
/// ```
/// use tcg_sim::cards::{CardDefinition, CardId, CardKind, Color, CostProfile};
///
/// let card = CardDefinition::new(CardId::new(1), "Red Apprentice", CardKind::Friend, Color::Red)
///     .with_cost(CostProfile { total: 2, red: 1, ..CostProfile::free() })
///     .with_power(1500);
///
/// assert_eq!(card.power, Some(1500));
/// assert_eq!(card.cost.colorless_part(), 1);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier for this card definition.
    pub id: CardId,

    /// Card name (for display/debugging).
    pub name: String,

    /// Card kind.
    pub kind: CardKind,

    /// Card color.
    pub color: Color,

    /// Cost profile.
    pub cost: CostProfile,

    /// Printed power. `Some` for Friends only.
    pub power: Option<i64>,

    /// Energy contributed when committed as a resource. Default 1.
    pub energy_value: u8,

    /// May be played reactively from hand against an unblocked attack.
    pub counter: bool,

    /// May attack the turn it is played (no summoning sickness).
    pub haste: bool,
}

impl CardDefinition {
    /// Create a new card definition with a free cost and default flags.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, kind: CardKind, color: Color) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            color,
            cost: CostProfile::free(),
            power: None,
            energy_value: 1,
            counter: false,
            haste: false,
        }
    }

    /// Set the cost (builder pattern).
    #[must_use]
    pub fn with_cost(mut self, cost: CostProfile) -> Self {
        self.cost = cost;
        self
    }

    /// Set the printed power (builder pattern).
    #[must_use]
    pub fn with_power(mut self, power: i64) -> Self {
        self.power = Some(power);
        self
    }

    /// Set the energy value (builder pattern).
    #[must_use]
    pub fn with_energy_value(mut self, value: u8) -> Self {
        self.energy_value = value;
        self
    }

    /// Mark as counter-usable (builder pattern).
    #[must_use]
    pub fn with_counter(mut self) -> Self {
        self.counter = true;
        self
    }

    /// Mark as able to attack the turn it is played (builder pattern).
    #[must_use]
    pub fn with_haste(mut self) -> Self {
        self.haste = true;
        self
    }

    /// Printed power, zero for non-Friends.
    #[must_use]
    pub fn base_power(&self) -> i64 {
        self.power.unwrap_or(0)
    }
}
