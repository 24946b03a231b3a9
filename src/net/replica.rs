//! Replica side of the link.
//!
//! A replica never resolves anything. It mirrors the authority's event
//! stream into a `ReplicaState`, refusing any frame that would apply out of
//! order, and re-publishes each applied event on its own `EventBus` so local
//! listeners see exactly what an authority-side listener would.

use std::collections::BTreeMap;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use super::message::WireMessage;
use crate::cards::{CardCatalog, CardId};
use crate::core::{PlayerId, SessionView, WireError, PLAYER_COUNT};
use crate::events::{EventBus, GameEvent, SubscriptionId};
use crate::rules::{GameResult, SharedCatalog};

/// Where the mirrored game is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplicaPhase {
    AwaitingStart,
    Playing,
    Ended,
}

/// Replica-side mirror of the public game state, built only from events.
///
/// Cards in play are taken from `endTurn`/`revealCards` and cleared at the
/// next `turnStart` or `gameEnd`, so at those points the views match the
/// authority's `session_views()` exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplicaState {
    phase: ReplicaPhase,
    views: Vec<SessionView>,
    total_turns: u32,
    turn_number: u32,
    available_cost: u32,
    current_player: Option<PlayerId>,
    result: Option<GameResult>,
}

impl Default for ReplicaState {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplicaState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: ReplicaPhase::AwaitingStart,
            views: Vec::new(),
            total_turns: 0,
            turn_number: 0,
            available_cost: 0,
            current_player: None,
            result: None,
        }
    }

    /// Rebuild a replica from a recorded event sequence.
    pub fn replay<'a>(events: impl IntoIterator<Item = &'a GameEvent>) -> Result<Self, WireError> {
        let mut state = Self::new();
        for event in events {
            state.apply(event)?;
        }
        Ok(state)
    }

    /// Apply one event, or refuse it and leave the state untouched.
    pub fn apply(&mut self, event: &GameEvent) -> Result<(), WireError> {
        self.check(event)?;

        match event {
            GameEvent::GameStarted {
                player_ids,
                total_turns,
            } => {
                self.views = player_ids.iter().cloned().map(SessionView::new).collect();
                self.total_turns = *total_turns;
                self.phase = ReplicaPhase::Playing;
            }
            GameEvent::TurnStarted {
                turn_number,
                current_player_id,
                available_cost,
            } => {
                self.clear_in_play();
                self.turn_number = *turn_number;
                self.available_cost = *available_cost;
                self.current_player = Some(current_player_id.clone());
            }
            GameEvent::TurnSubmitted {
                player_id,
                selected_card_ids: card_ids,
            }
            | GameEvent::CardsRevealed {
                player_id,
                card_ids,
            } => {
                if let Some(view) = self.view_mut(player_id) {
                    view.cards_in_play = card_ids.clone();
                }
            }
            GameEvent::ScoreChanged {
                player_id,
                new_score,
            } => {
                if let Some(view) = self.view_mut(player_id) {
                    view.score = *new_score;
                }
            }
            GameEvent::HandChanged {
                player_id,
                hand_card_ids,
            } => {
                if let Some(view) = self.view_mut(player_id) {
                    view.hand = hand_card_ids.clone();
                }
            }
            GameEvent::GameEnded {
                winner_id,
                final_scores,
            } => {
                self.clear_in_play();
                for view in &mut self.views {
                    if let Some(&score) = final_scores.get(&view.player_id) {
                        view.score = score;
                    }
                }
                self.result = Some(match winner_id {
                    Some(id) => GameResult::Winner(id.clone()),
                    None => GameResult::Draw,
                });
                self.phase = ReplicaPhase::Ended;
            }
        }
        Ok(())
    }

    /// Refuse anything that cannot follow the events applied so far.
    fn check(&self, event: &GameEvent) -> Result<(), WireError> {
        match (self.phase, event) {
            (ReplicaPhase::AwaitingStart, GameEvent::GameStarted { player_ids, .. }) => {
                let mut seen = player_ids.clone();
                seen.sort();
                seen.dedup();
                if player_ids.len() != PLAYER_COUNT || seen.len() != player_ids.len() {
                    return Err(WireError::out_of_order(format!(
                        "gameStart needs {PLAYER_COUNT} distinct players, got {player_ids:?}"
                    )));
                }
                return Ok(());
            }
            (ReplicaPhase::AwaitingStart, other) => {
                return Err(WireError::out_of_order(format!(
                    "{} before gameStart",
                    other.name()
                )));
            }
            (ReplicaPhase::Ended, other) => {
                return Err(WireError::out_of_order(format!("{} after gameEnd", other.name())));
            }
            (ReplicaPhase::Playing, GameEvent::GameStarted { .. }) => {
                return Err(WireError::out_of_order("second gameStart"));
            }
            (ReplicaPhase::Playing, _) => {}
        }

        match event {
            GameEvent::TurnStarted {
                turn_number,
                current_player_id,
                ..
            } => {
                if *turn_number != self.turn_number + 1 {
                    return Err(WireError::out_of_order(format!(
                        "turnStart {turn_number} after turn {}",
                        self.turn_number
                    )));
                }
                if *turn_number > self.total_turns {
                    return Err(WireError::out_of_order(format!(
                        "turnStart {turn_number} beyond {} turns",
                        self.total_turns
                    )));
                }
                self.known(current_player_id)
            }
            GameEvent::TurnSubmitted { player_id, .. } | GameEvent::CardsRevealed { player_id, .. } => {
                if self.turn_number == 0 {
                    return Err(WireError::out_of_order(format!(
                        "{} before the first turnStart",
                        event.name()
                    )));
                }
                self.known(player_id)
            }
            GameEvent::ScoreChanged { player_id, .. } | GameEvent::HandChanged { player_id, .. } => {
                self.known(player_id)
            }
            GameEvent::GameEnded {
                winner_id,
                final_scores,
            } => {
                if self.turn_number != self.total_turns {
                    return Err(WireError::out_of_order(format!(
                        "gameEnd during turn {} of {}",
                        self.turn_number, self.total_turns
                    )));
                }
                if let Some(id) = winner_id {
                    self.known(id)?;
                }
                final_scores.keys().try_for_each(|id| self.known(id))?;
                match self.views.iter().find(|v| !final_scores.contains_key(&v.player_id)) {
                    Some(view) => Err(WireError::out_of_order(format!(
                        "gameEnd missing a final score for {}",
                        view.player_id
                    ))),
                    None => Ok(()),
                }
            }
            GameEvent::GameStarted { .. } => Ok(()),
        }
    }

    fn known(&self, player: &PlayerId) -> Result<(), WireError> {
        if self.views.iter().any(|v| &v.player_id == player) {
            Ok(())
        } else {
            Err(WireError::out_of_order(format!("event for unknown player {player}")))
        }
    }

    fn view_mut(&mut self, player: &PlayerId) -> Option<&mut SessionView> {
        self.views.iter_mut().find(|v| &v.player_id == player)
    }

    fn clear_in_play(&mut self) {
        for view in &mut self.views {
            view.cards_in_play.clear();
        }
    }

    // === Queries ===

    #[must_use]
    pub fn phase(&self) -> ReplicaPhase {
        self.phase
    }

    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    #[must_use]
    pub fn total_turns(&self) -> u32 {
        self.total_turns
    }

    #[must_use]
    pub fn available_cost(&self) -> u32 {
        self.available_cost
    }

    #[must_use]
    pub fn current_player(&self) -> Option<&PlayerId> {
        self.current_player.as_ref()
    }

    #[must_use]
    pub fn view(&self, player: &PlayerId) -> Option<&SessionView> {
        self.views.iter().find(|v| &v.player_id == player)
    }

    /// Views in seat order, comparable with the authority's.
    #[must_use]
    pub fn session_views(&self) -> Vec<SessionView> {
        self.views.clone()
    }

    #[must_use]
    pub fn scores(&self) -> BTreeMap<PlayerId, u32> {
        self.views
            .iter()
            .map(|v| (v.player_id.clone(), v.score))
            .collect()
    }

    #[must_use]
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }
}

/// What a received frame turned out to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Received {
    /// An authority event, now applied and re-published locally.
    Event(GameEvent),
    /// The authority refused this replica's last submission.
    Rejected { reason: String },
}

/// Replica endpoint: applies authority frames and forwards local intents.
pub struct ReplicaSync {
    local_player: PlayerId,
    catalog: SharedCatalog,
    state: ReplicaState,
    bus: EventBus,
    outbound: UnboundedSender<String>,
}

impl ReplicaSync {
    /// `outbound` carries intent frames to the authority.
    pub fn new(local_player: PlayerId, catalog: SharedCatalog, outbound: UnboundedSender<String>) -> Self {
        Self {
            local_player,
            catalog,
            state: ReplicaState::new(),
            bus: EventBus::new(),
            outbound,
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + Send + 'static) -> SubscriptionId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    #[must_use]
    pub fn local_player(&self) -> &PlayerId {
        &self.local_player
    }

    #[must_use]
    pub fn state(&self) -> &ReplicaState {
        &self.state
    }

    /// Decode and apply one authority frame.
    ///
    /// A frame that is malformed, names an unknown card, or cannot follow
    /// the frames already applied is discarded whole and logged.
    pub fn receive(&mut self, frame: &str) -> Result<Received, WireError> {
        let result = self.apply_frame(frame);
        if let Err(err) = &result {
            warn!(player = %self.local_player, %err, "discarding authority frame");
        }
        result
    }

    fn apply_frame(&mut self, frame: &str) -> Result<Received, WireError> {
        let message = WireMessage::decode(frame)?;
        let action = message.action();

        let event = match message {
            WireMessage::SubmitRejected { player_id, reason } => {
                if player_id != self.local_player {
                    return Err(WireError::UnexpectedMessage { action });
                }
                info!(player = %player_id, %reason, "submission rejected by authority");
                return Ok(Received::Rejected { reason });
            }
            other => other.into_event().ok_or(WireError::UnexpectedMessage { action })?,
        };

        self.check_cards(&event)?;
        self.state.apply(&event)?;
        debug!(action, player = ?event.player_id(), "applied authority event");

        self.bus.publish(&event);
        if let GameEvent::GameEnded { winner_id, .. } = &event {
            info!(winner = ?winner_id, "game ended");
        }
        Ok(Received::Event(event))
    }

    fn check_cards(&self, event: &GameEvent) -> Result<(), WireError> {
        let ids: &[CardId] = match event {
            GameEvent::TurnSubmitted {
                selected_card_ids, ..
            } => selected_card_ids,
            GameEvent::CardsRevealed { card_ids, .. } => card_ids,
            GameEvent::HandChanged { hand_card_ids, .. } => hand_card_ids,
            _ => return Ok(()),
        };
        match ids.iter().find(|&&id| self.catalog.lookup(id).is_none()) {
            Some(&id) => Err(WireError::UnknownCard(id)),
            None => Ok(()),
        }
    }

    /// Send the local player's end-of-turn selection to the authority.
    ///
    /// Nothing changes locally; the accepted submission comes back as an
    /// `endTurn` event like any other.
    pub fn submit_turn(&self, selected: &[CardId]) -> Result<(), WireError> {
        if self.state.phase() != ReplicaPhase::Playing {
            return Err(WireError::out_of_order("submission outside a running game"));
        }
        let frame = WireMessage::EndTurn {
            player_id: self.local_player.clone(),
            selected_card_ids: selected.to_vec(),
        }
        .encode()?;
        debug!(player = %self.local_player, turn = self.state.turn_number(), ?selected, "sending intent");
        self.outbound.send(frame).map_err(|_| WireError::Disconnected)
    }
}

impl std::fmt::Debug for ReplicaSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicaSync")
            .field("local_player", &self.local_player)
            .field("state", &self.state)
            .field("bus", &self.bus)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardRegistry};
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    fn catalog() -> SharedCatalog {
        let mut registry = CardRegistry::new();
        for id in 1..=3 {
            registry.register(CardDefinition::new(CardId::new(id), format!("Card {id}"), 1, id));
        }
        Arc::new(registry)
    }

    fn replica() -> (ReplicaSync, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ReplicaSync::new(PlayerId::new("guest"), catalog(), tx), rx)
    }

    const START: &str = r#"{"action":"gameStart","playerIds":["host","guest"],"totalTurns":2}"#;
    const TURN_1: &str = r#"{"action":"turnStart","turnNumber":1,"currentPlayerId":"host","availableCost":1}"#;
    const TURN_2: &str = r#"{"action":"turnStart","turnNumber":2,"currentPlayerId":"guest","availableCost":2}"#;
    const GAME_END: &str = r#"{"action":"gameEnd","winnerId":null,"finalScores":{"host":0,"guest":0}}"#;

    #[test]
    fn test_nothing_before_game_start() {
        let (mut sync, _rx) = replica();
        let err = sync.receive(TURN_1).unwrap_err();
        assert!(matches!(err, WireError::OutOfOrder { .. }));
        assert_eq!(sync.state(), &ReplicaState::new());
    }

    #[test]
    fn test_applies_and_republishes() {
        let (mut sync, _rx) = replica();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        sync.subscribe(move |e| sink.lock().unwrap().push(e.name()));

        sync.receive(START).unwrap();
        sync.receive(r#"{"action":"handChanged","playerId":"guest","handCardIds":[1,2]}"#)
            .unwrap();
        sync.receive(TURN_1).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["game_started", "hand_changed", "turn_started"]
        );
        let view = sync.state().view(&PlayerId::new("guest")).unwrap();
        assert_eq!(view.hand, vec![CardId::new(1), CardId::new(2)]);
        assert_eq!(sync.state().available_cost(), 1);
    }

    #[test]
    fn test_skipped_turn_is_refused() {
        let (mut sync, _rx) = replica();
        sync.receive(START).unwrap();
        sync.receive(TURN_1).unwrap();

        let before = sync.state().clone();
        let frame = r#"{"action":"turnStart","turnNumber":3,"currentPlayerId":"host","availableCost":2}"#;
        assert!(matches!(sync.receive(frame), Err(WireError::OutOfOrder { .. })));
        assert_eq!(sync.state(), &before);
    }

    #[test]
    fn test_unknown_player_and_card_refused() {
        let (mut sync, _rx) = replica();
        sync.receive(START).unwrap();

        let frame = r#"{"action":"scoreChanged","playerId":"mallory","newScore":3}"#;
        assert!(matches!(sync.receive(frame), Err(WireError::OutOfOrder { .. })));

        let frame = r#"{"action":"handChanged","playerId":"guest","handCardIds":[1,77]}"#;
        assert!(matches!(
            sync.receive(frame),
            Err(WireError::UnknownCard(id)) if id == CardId::new(77)
        ));
        assert!(sync.state().view(&PlayerId::new("guest")).unwrap().hand.is_empty());
    }

    #[test]
    fn test_nothing_after_game_end() {
        let (mut sync, _rx) = replica();
        sync.receive(START).unwrap();
        sync.receive(TURN_1).unwrap();
        sync.receive(TURN_2).unwrap();
        sync.receive(GAME_END).unwrap();
        assert_eq!(sync.state().result(), Some(&GameResult::Draw));

        assert!(matches!(sync.receive(TURN_1), Err(WireError::OutOfOrder { .. })));
    }

    #[test]
    fn test_game_end_before_last_turn_refused() {
        let (mut sync, _rx) = replica();
        sync.receive(START).unwrap();
        sync.receive(TURN_1).unwrap();
        let before = sync.state().clone();

        let frame = r#"{"action":"gameEnd","winnerId":"host","finalScores":{"host":9,"guest":0}}"#;
        assert!(matches!(sync.receive(frame), Err(WireError::OutOfOrder { .. })));
        assert_eq!(sync.state(), &before);
        assert_eq!(sync.state().phase(), ReplicaPhase::Playing);
        assert_eq!(sync.state().result(), None);
    }

    #[test]
    fn test_game_end_missing_score_refused() {
        let (mut sync, _rx) = replica();
        sync.receive(START).unwrap();
        sync.receive(TURN_1).unwrap();
        sync.receive(TURN_2).unwrap();

        let frame = r#"{"action":"gameEnd","winnerId":"host","finalScores":{"host":2}}"#;
        assert!(matches!(sync.receive(frame), Err(WireError::OutOfOrder { .. })));
        assert_eq!(sync.state().phase(), ReplicaPhase::Playing);

        sync.receive(GAME_END).unwrap();
        assert_eq!(sync.state().phase(), ReplicaPhase::Ended);
    }

    #[test]
    fn test_game_start_needs_two_players() {
        let (mut sync, _rx) = replica();
        for frame in [
            r#"{"action":"gameStart","playerIds":["x","y","guest"],"totalTurns":2}"#,
            r#"{"action":"gameStart","playerIds":["guest"],"totalTurns":2}"#,
            r#"{"action":"gameStart","playerIds":["guest","guest"],"totalTurns":2}"#,
        ] {
            assert!(matches!(sync.receive(frame), Err(WireError::OutOfOrder { .. })));
            assert_eq!(sync.state(), &ReplicaState::new());
        }
        sync.receive(START).unwrap();
    }

    #[test]
    fn test_rejection_frame() {
        let (mut sync, _rx) = replica();
        sync.receive(START).unwrap();

        let frame = r#"{"action":"submitRejected","playerId":"guest","reason":"too expensive"}"#;
        assert_eq!(
            sync.receive(frame).unwrap(),
            Received::Rejected {
                reason: "too expensive".into()
            }
        );

        let frame = r#"{"action":"submitRejected","playerId":"host","reason":"x"}"#;
        assert!(matches!(
            sync.receive(frame),
            Err(WireError::UnexpectedMessage { .. })
        ));
    }

    #[test]
    fn test_submit_turn_sends_intent() {
        let (mut sync, mut rx) = replica();
        assert!(sync.submit_turn(&[]).is_err());

        sync.receive(START).unwrap();
        sync.receive(TURN_1).unwrap();
        sync.submit_turn(&[CardId::new(2)]).unwrap();

        let frame = rx.try_recv().unwrap();
        assert_eq!(
            WireMessage::decode(&frame).unwrap(),
            WireMessage::EndTurn {
                player_id: PlayerId::new("guest"),
                selected_card_ids: vec![CardId::new(2)],
            }
        );
        // No local effect until the authority echoes it.
        assert!(sync.state().view(&PlayerId::new("guest")).unwrap().cards_in_play.is_empty());
    }

    #[test]
    fn test_in_play_cleared_at_next_turn() {
        let mut state = ReplicaState::new();
        let guest = PlayerId::new("guest");
        state
            .apply(&GameEvent::GameStarted {
                player_ids: vec![PlayerId::new("host"), guest.clone()],
                total_turns: 3,
            })
            .unwrap();
        state
            .apply(&GameEvent::TurnStarted {
                turn_number: 1,
                current_player_id: guest.clone(),
                available_cost: 1,
            })
            .unwrap();
        state
            .apply(&GameEvent::CardsRevealed {
                player_id: guest.clone(),
                card_ids: vec![CardId::new(1)],
            })
            .unwrap();
        assert_eq!(state.view(&guest).unwrap().cards_in_play, vec![CardId::new(1)]);

        state
            .apply(&GameEvent::TurnStarted {
                turn_number: 2,
                current_player_id: PlayerId::new("host"),
                available_cost: 2,
            })
            .unwrap();
        assert!(state.view(&guest).unwrap().cards_in_play.is_empty());
        assert_eq!(state.current_player(), Some(&PlayerId::new("host")));
    }
}
