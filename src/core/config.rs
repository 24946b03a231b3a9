//! Engine configuration.
//!
//! Fixed game parameters are supplied once at construction. Everything here
//! is authority-side: replicas learn the values they need (`totalTurns`,
//! `availableCost`) from events.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::cards::CardId;

/// Number of participants in every game.
pub const PLAYER_COUNT: usize = 2;

/// Complete engine configuration.
///
/// ```
/// use std::time::Duration;
/// use duel_ccg::core::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_total_turns(4)
///     .with_turn_duration(Duration::from_secs(10))
///     .with_seed(7);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.max_cost(), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of turns in a game. Also the cost cap.
    pub total_turns: u32,

    /// Cards dealt into each deck at game start.
    pub deck_size: usize,

    /// Cards drawn into each hand at game start.
    pub initial_hand_size: usize,

    /// Time each turn allows before empty submissions are forced.
    pub turn_duration: Duration,

    /// Cadence at which the hosting runtime samples the deadline.
    pub tick_interval: Duration,

    /// Authority RNG seed.
    pub seed: u64,

    /// Fixed deck list used for every player. `None` picks randomly from
    /// the catalog.
    pub deck_list: Option<Vec<CardId>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            total_turns: 6,
            deck_size: 12,
            initial_hand_size: 3,
            turn_duration: Duration::from_secs(30),
            tick_interval: Duration::from_millis(100),
            seed: 0,
            deck_list: None,
        }
    }
}

impl EngineConfig {
    /// Set the number of turns.
    #[must_use]
    pub fn with_total_turns(mut self, turns: u32) -> Self {
        self.total_turns = turns;
        self
    }

    /// Set the deck size.
    #[must_use]
    pub fn with_deck_size(mut self, size: usize) -> Self {
        self.deck_size = size;
        self
    }

    /// Set the opening hand size.
    #[must_use]
    pub fn with_initial_hand_size(mut self, size: usize) -> Self {
        self.initial_hand_size = size;
        self
    }

    /// Set the per-turn deadline.
    #[must_use]
    pub fn with_turn_duration(mut self, duration: Duration) -> Self {
        self.turn_duration = duration;
        self
    }

    /// Set the deadline sampling cadence.
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Use a fixed deck list.
    #[must_use]
    pub fn with_deck_list(mut self, ids: impl IntoIterator<Item = CardId>) -> Self {
        self.deck_list = Some(ids.into_iter().collect());
        self
    }

    /// Highest cost budget any turn can have.
    #[must_use]
    pub fn max_cost(&self) -> u32 {
        self.total_turns
    }

    /// Cost budget for a 1-based turn number.
    #[must_use]
    pub fn available_cost(&self, turn_number: u32) -> u32 {
        turn_number.clamp(1, self.max_cost().max(1))
    }

    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_turns == 0 {
            return Err(ConfigError::Invalid {
                field: "total_turns",
                message: "must be at least 1".to_string(),
            });
        }
        if self.deck_list.is_none() && self.deck_size == 0 {
            return Err(ConfigError::Invalid {
                field: "deck_size",
                message: "must be at least 1".to_string(),
            });
        }
        if self.turn_duration.is_zero() {
            return Err(ConfigError::Invalid {
                field: "turn_duration",
                message: "must be positive".to_string(),
            });
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::Invalid {
                field: "tick_interval",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.total_turns, 6);
        assert_eq!(config.deck_size, 12);
        assert_eq!(config.initial_hand_size, 3);
        assert_eq!(config.turn_duration, Duration::from_secs(30));
        assert_eq!(config.tick_interval, Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_available_cost_clamps() {
        let config = EngineConfig::default();
        assert_eq!(config.available_cost(0), 1);
        assert_eq!(config.available_cost(1), 1);
        assert_eq!(config.available_cost(4), 4);
        assert_eq!(config.available_cost(6), 6);
        assert_eq!(config.available_cost(9), 6);
    }

    #[test]
    fn test_validate_rejects_zero_turns() {
        let err = EngineConfig::default().with_total_turns(0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "total_turns", .. }));
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let err = EngineConfig::default()
            .with_turn_duration(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "turn_duration", .. }));
    }

    #[test]
    fn test_deck_list_allows_zero_deck_size() {
        let config = EngineConfig::default()
            .with_deck_size(0)
            .with_deck_list([CardId::new(1), CardId::new(2)]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serde_fills_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"total_turns": 3}"#).unwrap();
        assert_eq!(config.total_turns, 3);
        assert_eq!(config.deck_size, 12);
    }
}
