//! Per-participant mutable state.
//!
//! `PlayerSession` holds a deck, a hand, the cards committed this turn and a
//! score. Its mutators only check existence; cost legality belongs to the
//! turn state machine.
//!
//! A card reference lives in at most one of deck, hand and cards in play.
//! Cards are matched by id, first occurrence, so decks may hold duplicates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::SubmitRejection;
use super::player::PlayerId;
use crate::cards::{CardDefinition, CardId};

/// One participant's game state.
#[derive(Clone, Debug)]
pub struct PlayerSession {
    player_id: PlayerId,
    score: u32,
    deck: Vec<Arc<CardDefinition>>,
    hand: Vec<Arc<CardDefinition>>,
    cards_in_play: Vec<Arc<CardDefinition>>,
}

impl PlayerSession {
    /// Create a session with an already ordered deck. Index 0 is drawn first.
    pub fn new(player_id: PlayerId, deck: Vec<Arc<CardDefinition>>) -> Self {
        Self {
            player_id,
            score: 0,
            deck,
            hand: Vec::new(),
            cards_in_play: Vec::new(),
        }
    }

    #[must_use]
    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn deck(&self) -> &[Arc<CardDefinition>] {
        &self.deck
    }

    #[must_use]
    pub fn hand(&self) -> &[Arc<CardDefinition>] {
        &self.hand
    }

    #[must_use]
    pub fn cards_in_play(&self) -> &[Arc<CardDefinition>] {
        &self.cards_in_play
    }

    /// Hand contents as ids, in display order.
    #[must_use]
    pub fn hand_ids(&self) -> Vec<CardId> {
        self.hand.iter().map(|c| c.id).collect()
    }

    /// Cards in play as ids, in commit order.
    #[must_use]
    pub fn in_play_ids(&self) -> Vec<CardId> {
        self.cards_in_play.iter().map(|c| c.id).collect()
    }

    // === Drawing ===

    /// Move the front of the deck into the hand. No-op on an empty deck.
    pub fn draw_card(&mut self) -> Option<CardId> {
        if self.deck.is_empty() {
            return None;
        }
        let card = self.deck.remove(0);
        let id = card.id;
        self.hand.push(card);
        Some(id)
    }

    /// Draw up to `count` cards. Returns how many were actually drawn.
    pub fn draw_cards(&mut self, count: usize) -> usize {
        (0..count).take_while(|_| self.draw_card().is_some()).count()
    }

    // === Committing ===

    /// Resolve `ids` against the hand without moving anything.
    ///
    /// Each id consumes one matching copy, so `[5, 5]` needs two copies of
    /// card 5 in hand.
    pub fn select_from_hand(&self, ids: &[CardId]) -> Result<Vec<Arc<CardDefinition>>, SubmitRejection> {
        let mut remaining: Vec<Option<&Arc<CardDefinition>>> = self.hand.iter().map(Some).collect();
        let mut picked = Vec::with_capacity(ids.len());

        for &id in ids {
            let slot = remaining
                .iter_mut()
                .find(|slot| slot.is_some_and(|c| c.id == id))
                .ok_or(SubmitRejection::CardNotInHand(id))?;
            if let Some(card) = slot.take() {
                picked.push(Arc::clone(card));
            }
        }

        Ok(picked)
    }

    /// Move the selected cards from hand to play, in selection order.
    ///
    /// All-or-nothing: if any id is missing the session is unchanged.
    pub fn commit(&mut self, ids: &[CardId]) -> Result<(), SubmitRejection> {
        self.select_from_hand(ids)?;
        for &id in ids {
            if let Some(card) = self.remove_from_hand(id) {
                self.cards_in_play.push(card);
            }
        }
        Ok(())
    }

    // === Score ===

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Remove points, flooring at zero. Returns the points actually removed.
    pub fn remove_score(&mut self, points: u32) -> u32 {
        let removed = points.min(self.score);
        self.score -= removed;
        removed
    }

    // === Removal ===

    /// Remove the first copy of `id` from the hand. No-op if absent.
    pub fn remove_from_hand(&mut self, id: CardId) -> Option<Arc<CardDefinition>> {
        let idx = self.hand.iter().position(|c| c.id == id)?;
        Some(self.hand.remove(idx))
    }

    /// Remove the hand card at `index`. No-op if out of range.
    pub fn remove_hand_at(&mut self, index: usize) -> Option<Arc<CardDefinition>> {
        (index < self.hand.len()).then(|| self.hand.remove(index))
    }

    /// Remove the first copy of `id` from play. No-op if absent.
    pub fn remove_from_play(&mut self, id: CardId) -> Option<Arc<CardDefinition>> {
        let idx = self.cards_in_play.iter().position(|c| c.id == id)?;
        Some(self.cards_in_play.remove(idx))
    }

    /// Remove the earliest committed card still in play.
    pub fn remove_earliest_in_play(&mut self) -> Option<Arc<CardDefinition>> {
        (!self.cards_in_play.is_empty()).then(|| self.cards_in_play.remove(0))
    }

    pub fn clear_cards_in_play(&mut self) {
        self.cards_in_play.clear();
    }

    /// Public projection of this session.
    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView {
            player_id: self.player_id.clone(),
            score: self.score,
            hand: self.hand_ids(),
            cards_in_play: self.in_play_ids(),
        }
    }
}

/// What a replica can know about a session: everything except deck order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub player_id: PlayerId,
    pub score: u32,
    pub hand: Vec<CardId>,
    pub cards_in_play: Vec<CardId>,
}

impl SessionView {
    /// Empty view for a player who has just joined.
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            score: 0,
            hand: Vec::new(),
            cards_in_play: Vec::new(),
        }
    }
}
