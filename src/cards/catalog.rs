//! Card catalog: id -> definition lookup.
//!
//! The catalog is a collaborator of the engine, read-only once loaded.
//! `CardCatalog` is the seam the engine depends on; `CardRegistry` is the
//! in-memory implementation loaded from the bundled JSON card list.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardId};

/// Read-only card lookup.
pub trait CardCatalog {
    /// Look up a definition by id.
    fn lookup(&self, id: CardId) -> Option<Arc<CardDefinition>>;

    /// All definitions in load order.
    fn all(&self) -> Vec<Arc<CardDefinition>>;
}

/// In-memory catalog.
///
/// ## Example
///
/// ```
/// use duel_ccg::cards::{CardCatalog, CardDefinition, CardId, CardRegistry};
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardDefinition::new(CardId::new(1), "Scout", 1, 1));
///
/// assert_eq!(registry.lookup(CardId::new(1)).unwrap().name, "Scout");
/// assert!(registry.lookup(CardId::new(2)).is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, Arc<CardDefinition>>,
    order: Vec<CardId>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the bundled card list: a JSON array of definitions.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let cards: Vec<CardDefinition> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for card in cards {
            registry.register(card);
        }
        tracing::debug!(cards = registry.len(), "card catalog loaded");
        Ok(registry)
    }

    /// Register a card definition.
    ///
    /// A later definition with the same id replaces the earlier one, keeping
    /// its original load position.
    pub fn register(&mut self, card: CardDefinition) {
        let id = card.id;
        if self.cards.insert(id, Arc::new(card)).is_none() {
            self.order.push(id);
        }
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CardCatalog for CardRegistry {
    fn lookup(&self, id: CardId) -> Option<Arc<CardDefinition>> {
        self.cards.get(&id).cloned()
    }

    fn all(&self) -> Vec<Arc<CardDefinition>> {
        self.order
            .iter()
            .filter_map(|id| self.cards.get(id).cloned())
            .collect()
    }
}

impl<C: CardCatalog + ?Sized> CardCatalog for Arc<C> {
    fn lookup(&self, id: CardId) -> Option<Arc<CardDefinition>> {
        (**self).lookup(id)
    }

    fn all(&self) -> Vec<Arc<CardDefinition>> {
        (**self).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::AbilityKind;

    const CARDS_JSON: &str = r#"[
        {"id": 1, "name": "Spark", "cost": 1, "power": 1},
        {"id": 2, "name": "Thief", "cost": 2, "power": 1,
         "ability": {"type": "StealPoints", "value": 2}},
        {"id": 3, "name": "Giant", "cost": 3, "power": 4,
         "ability": {"type": "DoublePower", "value": 2}}
    ]"#;

    #[test]
    fn test_from_json() {
        let registry = CardRegistry::from_json_str(CARDS_JSON).unwrap();
        assert_eq!(registry.len(), 3);

        let thief = registry.lookup(CardId::new(2)).unwrap();
        assert_eq!(thief.ability_kind(), Some(AbilityKind::StealPoints));
    }

    #[test]
    fn test_all_preserves_load_order() {
        let registry = CardRegistry::from_json_str(CARDS_JSON).unwrap();
        let ids: Vec<_> = registry.all().iter().map(|c| c.id.raw()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_reregister_keeps_position() {
        let mut registry = CardRegistry::new();
        registry.register(CardDefinition::new(CardId::new(1), "Old", 1, 1));
        registry.register(CardDefinition::new(CardId::new(2), "Other", 1, 1));
        registry.register(CardDefinition::new(CardId::new(1), "New", 1, 2));

        let all = registry.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "New");
    }

    #[test]
    fn test_malformed_json() {
        assert!(CardRegistry::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_arc_catalog() {
        let registry = Arc::new(CardRegistry::from_json_str(CARDS_JSON).unwrap());
        assert!(registry.lookup(CardId::new(3)).is_some());
        assert_eq!(CardCatalog::all(&registry).len(), 3);
    }
}
