//! Card definitions - static card data.
//!
//! A `CardDefinition` is immutable once the catalog is loaded and is shared
//! by `Arc` between decks, hands and the board.

use serde::{Deserialize, Serialize};

/// Unique identifier for a card definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
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

/// The closed set of ability kinds.
///
/// Serialized with the names the bundled card file uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Owner gains `magnitude` points.
    GainPoints,
    /// Move up to `magnitude` points from opponent to owner.
    StealPoints,
    /// Owner draws `magnitude` cards.
    DrawExtraCard,
    /// Opponent loses `magnitude` random cards from hand.
    DiscardOpponentRandomCard,
    /// Card's power is multiplied by `magnitude`.
    DoublePower,
    /// Removes up to `magnitude` of the opponent's committed cards before
    /// they score.
    DestroyOpponentCardInPlay,
}

impl AbilityKind {
    /// Whether this ability runs in the destructive pass.
    #[must_use]
    pub const fn is_destructive(self) -> bool {
        matches!(self, AbilityKind::DestroyOpponentCardInPlay)
    }
}

/// A card ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ability {
    #[serde(rename = "type")]
    pub kind: AbilityKind,
    #[serde(rename = "value")]
    pub magnitude: u32,
}

impl Ability {
    #[must_use]
    pub const fn new(kind: AbilityKind, magnitude: u32) -> Self {
        Self { kind, magnitude }
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use duel_ccg::cards::{AbilityKind, CardDefinition, CardId};
///
/// let card = CardDefinition::new(CardId::new(1), "Pickpocket", 2, 1)
///     .with_ability(AbilityKind::StealPoints, 3);
///
/// assert_eq!(card.cost, 2);
/// assert_eq!(card.ability.unwrap().magnitude, 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    pub cost: u32,
    pub power: u32,
    #[serde(default)]
    pub ability: Option<Ability>,
}

impl CardDefinition {
    /// Create a card without an ability.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, cost: u32, power: u32) -> Self {
        Self {
            id,
            name: name.into(),
            cost,
            power,
            ability: None,
        }
    }

    /// Attach an ability (builder pattern).
    #[must_use]
    pub fn with_ability(mut self, kind: AbilityKind, magnitude: u32) -> Self {
        self.ability = Some(Ability::new(kind, magnitude));
        self
    }

    /// Power this card scores, after any power multiplier.
    #[must_use]
    pub fn effective_power(&self) -> u32 {
        match self.ability {
            Some(Ability {
                kind: AbilityKind::DoublePower,
                magnitude,
            }) => self.power.saturating_mul(magnitude),
            _ => self.power,
        }
    }

    /// Kind of this card's ability, if any.
    #[must_use]
    pub fn ability_kind(&self) -> Option<AbilityKind> {
        self.ability.map(|a| a.kind)
    }
}
