//! Domain events.
//!
//! Events are the only way state changes leave the authority. Once published
//! they are never retracted or mutated, and their order is part of the
//! contract: replicas replay them in exactly the order the authority emitted
//! them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::core::PlayerId;

/// Something that happened in the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Sessions were created; turn 1 follows.
    GameStarted {
        player_ids: Vec<PlayerId>,
        total_turns: u32,
    },

    /// A turn opened for submissions.
    ///
    /// `current_player_id` is a nominal alternating seat for display; both
    /// players act every turn.
    TurnStarted {
        turn_number: u32,
        current_player_id: PlayerId,
        available_cost: u32,
    },

    /// A submission was accepted (possibly an empty one forced by the
    /// deadline).
    TurnSubmitted {
        player_id: PlayerId,
        selected_card_ids: Vec<CardId>,
    },

    /// A player's committed cards became visible.
    CardsRevealed {
        player_id: PlayerId,
        card_ids: Vec<CardId>,
    },

    ScoreChanged {
        player_id: PlayerId,
        new_score: u32,
    },

    /// Full hand contents after a change.
    HandChanged {
        player_id: PlayerId,
        hand_card_ids: Vec<CardId>,
    },

    /// Final result. `winner_id` is `None` on a tie.
    GameEnded {
        winner_id: Option<PlayerId>,
        final_scores: BTreeMap<PlayerId, u32>,
    },
}

impl GameEvent {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::GameStarted { .. } => "game_started",
            GameEvent::TurnStarted { .. } => "turn_started",
            GameEvent::TurnSubmitted { .. } => "turn_submitted",
            GameEvent::CardsRevealed { .. } => "cards_revealed",
            GameEvent::ScoreChanged { .. } => "score_changed",
            GameEvent::HandChanged { .. } => "hand_changed",
            GameEvent::GameEnded { .. } => "game_ended",
        }
    }

    /// The player this event concerns, if it concerns exactly one.
    #[must_use]
    pub fn player_id(&self) -> Option<&PlayerId> {
        match self {
            GameEvent::TurnSubmitted { player_id, .. }
            | GameEvent::CardsRevealed { player_id, .. }
            | GameEvent::ScoreChanged { player_id, .. }
            | GameEvent::HandChanged { player_id, .. } => Some(player_id),
            GameEvent::GameStarted { .. }
            | GameEvent::TurnStarted { .. }
            | GameEvent::GameEnded { .. } => None,
        }
    }

    pub(crate) fn score(player_id: &PlayerId, new_score: u32) -> Self {
        GameEvent::ScoreChanged {
            player_id: player_id.clone(),
            new_score,
        }
    }

    pub(crate) fn hand(player_id: &PlayerId, hand_card_ids: Vec<CardId>) -> Self {
        GameEvent::HandChanged {
            player_id: player_id.clone(),
            hand_card_ids,
        }
    }
}
