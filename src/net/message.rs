//! Wire messages exchanged between the authority and a replica.
//!
//! Each frame is one flat JSON object tagged by `"action"`:
//!
//! ```
//! use duel_ccg::net::WireMessage;
//! use duel_ccg::{CardId, PlayerId};
//!
//! let msg = WireMessage::EndTurn {
//!     player_id: PlayerId::new("guest"),
//!     selected_card_ids: vec![CardId::new(3)],
//! };
//! let frame = msg.encode().unwrap();
//! assert_eq!(frame, r#"{"action":"endTurn","playerId":"guest","selectedCardIds":[3]}"#);
//! assert_eq!(WireMessage::decode(&frame).unwrap(), msg);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::core::{PlayerId, WireError};
use crate::events::GameEvent;

/// One frame on the authority/replica link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum WireMessage {
    #[serde(rename_all = "camelCase")]
    GameStart {
        player_ids: Vec<PlayerId>,
        total_turns: u32,
    },

    #[serde(rename_all = "camelCase")]
    TurnStart {
        turn_number: u32,
        current_player_id: PlayerId,
        available_cost: u32,
    },

    /// Replica intent, and the authority's rebroadcast once accepted.
    #[serde(rename_all = "camelCase")]
    EndTurn {
        player_id: PlayerId,
        selected_card_ids: Vec<CardId>,
    },

    #[serde(rename_all = "camelCase")]
    RevealCards {
        player_id: PlayerId,
        card_ids: Vec<CardId>,
    },

    #[serde(rename_all = "camelCase")]
    ScoreChanged { player_id: PlayerId, new_score: u32 },

    #[serde(rename_all = "camelCase")]
    HandChanged {
        player_id: PlayerId,
        hand_card_ids: Vec<CardId>,
    },

    #[serde(rename_all = "camelCase")]
    GameEnd {
        winner_id: Option<PlayerId>,
        final_scores: BTreeMap<PlayerId, u32>,
    },

    /// Authority to the submitting replica only. Never a domain event.
    #[serde(rename_all = "camelCase")]
    SubmitRejected { player_id: PlayerId, reason: String },
}

impl WireMessage {
    /// The `"action"` discriminator.
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            WireMessage::GameStart { .. } => "gameStart",
            WireMessage::TurnStart { .. } => "turnStart",
            WireMessage::EndTurn { .. } => "endTurn",
            WireMessage::RevealCards { .. } => "revealCards",
            WireMessage::ScoreChanged { .. } => "scoreChanged",
            WireMessage::HandChanged { .. } => "handChanged",
            WireMessage::GameEnd { .. } => "gameEnd",
            WireMessage::SubmitRejected { .. } => "submitRejected",
        }
    }

    pub fn encode(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(frame: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(frame)?)
    }

    /// The domain event this frame carries, if any.
    #[must_use]
    pub fn into_event(self) -> Option<GameEvent> {
        let event = match self {
            WireMessage::GameStart {
                player_ids,
                total_turns,
            } => GameEvent::GameStarted {
                player_ids,
                total_turns,
            },
            WireMessage::TurnStart {
                turn_number,
                current_player_id,
                available_cost,
            } => GameEvent::TurnStarted {
                turn_number,
                current_player_id,
                available_cost,
            },
            WireMessage::EndTurn {
                player_id,
                selected_card_ids,
            } => GameEvent::TurnSubmitted {
                player_id,
                selected_card_ids,
            },
            WireMessage::RevealCards { player_id, card_ids } => {
                GameEvent::CardsRevealed { player_id, card_ids }
            }
            WireMessage::ScoreChanged {
                player_id,
                new_score,
            } => GameEvent::ScoreChanged {
                player_id,
                new_score,
            },
            WireMessage::HandChanged {
                player_id,
                hand_card_ids,
            } => GameEvent::HandChanged {
                player_id,
                hand_card_ids,
            },
            WireMessage::GameEnd {
                winner_id,
                final_scores,
            } => GameEvent::GameEnded {
                winner_id,
                final_scores,
            },
            WireMessage::SubmitRejected { .. } => return None,
        };
        Some(event)
    }
}

impl From<GameEvent> for WireMessage {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::GameStarted {
                player_ids,
                total_turns,
            } => WireMessage::GameStart {
                player_ids,
                total_turns,
            },
            GameEvent::TurnStarted {
                turn_number,
                current_player_id,
                available_cost,
            } => WireMessage::TurnStart {
                turn_number,
                current_player_id,
                available_cost,
            },
            GameEvent::TurnSubmitted {
                player_id,
                selected_card_ids,
            } => WireMessage::EndTurn {
                player_id,
                selected_card_ids,
            },
            GameEvent::CardsRevealed { player_id, card_ids } => {
                WireMessage::RevealCards { player_id, card_ids }
            }
            GameEvent::ScoreChanged {
                player_id,
                new_score,
            } => WireMessage::ScoreChanged {
                player_id,
                new_score,
            },
            GameEvent::HandChanged {
                player_id,
                hand_card_ids,
            } => WireMessage::HandChanged {
                player_id,
                hand_card_ids,
            },
            GameEvent::GameEnded {
                winner_id,
                final_scores,
            } => WireMessage::GameEnd {
                winner_id,
                final_scores,
            },
        }
    }
}
