//! The authoritative turn state machine.
//!
//! `TurnStateMachine` owns every `PlayerSession` and the `TurnState`, drives
//! the turn cadence, validates submissions, runs the ability resolver and
//! publishes every resulting event on its `EventBus`. All mutation goes
//! through `&mut self`, so calls against one game are strictly serial and a
//! resolution always completes, events included, before the next call.
//!
//! ```text
//! WaitingForPlayers --start_game--> InProgress(CollectingSubmissions)
//!     --all submitted / deadline--> InProgress(Resolving)
//!     --> CollectingSubmissions (next turn) | Ended
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use im::Vector;
use rustc_hash::FxHashMap;
use tracing::{debug, error, info, warn};

use super::turn::{GamePhase, GameResult, Selection, TurnPhase, TurnState};
use crate::cards::{CardCatalog, CardDefinition, CardId};
use crate::core::{
    ConfigError, ContractViolation, EngineConfig, EngineError, GameRng, PlayerId, PlayerMap,
    PlayerSession, Seat, SessionView, SubmitRejection, PLAYER_COUNT,
};
use crate::effects::AbilityResolver;
use crate::events::{EventBus, GameEvent, SubscriptionId};

/// Shared handle to the card catalog.
pub type SharedCatalog = Arc<dyn CardCatalog + Send + Sync>;

/// What an accepted submission (or a forced one) led to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Recorded; at least one other seat still owes a submission.
    AwaitingOthers,
    /// The turn resolved and the next one is open for submissions.
    TurnResolved { next_turn: u32 },
    /// The turn resolved and it was the last one.
    GameEnded(GameResult),
}

/// Authoritative game instance.
pub struct TurnStateMachine {
    config: EngineConfig,
    catalog: SharedCatalog,
    phase: GamePhase,
    sessions: PlayerMap<PlayerSession>,
    seats: FxHashMap<PlayerId, Seat>,
    turn: TurnState,
    deck_rng: GameRng,
    discard_rng: GameRng,
    bus: EventBus,
    event_log: Vector<GameEvent>,
    result: Option<GameResult>,
}

impl TurnStateMachine {
    /// Create a game waiting for its players.
    pub fn new(config: EngineConfig, catalog: SharedCatalog) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = GameRng::new(config.seed);

        Ok(Self {
            deck_rng: rng.for_context("deck"),
            discard_rng: rng.for_context("discard"),
            config,
            catalog,
            phase: GamePhase::WaitingForPlayers,
            sessions: PlayerMap::from_vec(Vec::new()),
            seats: FxHashMap::default(),
            turn: TurnState::idle(PLAYER_COUNT),
            bus: EventBus::new(),
            event_log: Vector::new(),
            result: None,
        })
    }

    // === Subscriptions ===

    /// Subscribe to every event this game publishes from now on.
    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + Send + 'static) -> SubscriptionId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // === Operations ===

    /// Create one session per participant, deal, and open turn 1.
    pub fn start_game(&mut self, participants: &[PlayerId]) -> Result<(), EngineError> {
        if self.phase != GamePhase::WaitingForPlayers {
            return Err(self.violation(ContractViolation::WrongPhase {
                expected: GamePhase::WaitingForPlayers.name(),
                actual: self.phase.name(),
            }));
        }
        if participants.len() != PLAYER_COUNT {
            return Err(self.violation(ContractViolation::ParticipantCount {
                expected: PLAYER_COUNT,
                actual: participants.len(),
            }));
        }
        let mut seats = FxHashMap::default();
        for (seat, id) in Seat::all(PLAYER_COUNT).zip(participants) {
            if seats.insert(id.clone(), seat).is_some() {
                return Err(self.violation(ContractViolation::DuplicatePlayer(id.clone())));
            }
        }
        let pool = self.catalog.all();
        if self.config.deck_list.is_none() && pool.is_empty() {
            return Err(self.violation(ContractViolation::EmptyCatalog));
        }

        let sessions: Vec<PlayerSession> = participants
            .iter()
            .map(|id| PlayerSession::new(id.clone(), self.build_deck(id, &pool)))
            .collect();
        self.sessions = PlayerMap::from_vec(sessions);
        self.seats = seats;
        self.phase = GamePhase::InProgress(TurnPhase::Resolving);

        info!(
            players = ?participants,
            total_turns = self.config.total_turns,
            "game started"
        );
        self.publish(GameEvent::GameStarted {
            player_ids: participants.to_vec(),
            total_turns: self.config.total_turns,
        });

        for seat in Seat::all(PLAYER_COUNT) {
            let session = &mut self.sessions[seat];
            session.draw_cards(self.config.initial_hand_size);
            let event = GameEvent::hand(session.player_id(), session.hand_ids());
            self.publish(event);
        }

        self.begin_turn(1);
        Ok(())
    }

    /// Submit a player's selection for the current turn.
    ///
    /// Illegal selections are rejected with no state change and no event;
    /// the caller may resubmit before the deadline. When this submission
    /// completes the set, the turn resolves before returning.
    pub fn submit_turn(
        &mut self,
        player: &PlayerId,
        selected: &[CardId],
    ) -> Result<SubmitOutcome, EngineError> {
        if !self.phase.is_collecting() {
            return Err(self.violation(ContractViolation::WrongPhase {
                expected: GamePhase::InProgress(TurnPhase::CollectingSubmissions).name(),
                actual: self.phase.name(),
            }));
        }
        let Some(&seat) = self.seats.get(player) else {
            return Err(self.violation(ContractViolation::UnknownPlayer(player.clone())));
        };
        if self.turn.has_submitted(seat) {
            return Err(self.violation(ContractViolation::AlreadySubmitted(player.clone())));
        }

        if let Err(rejection) = self.check_selection(seat, selected) {
            warn!(
                player = %player,
                turn = self.turn.turn_number,
                selected = ?selected,
                %rejection,
                "submission rejected"
            );
            return Err(rejection.into());
        }

        Ok(self.accept_submission(seat, selected))
    }

    /// Advance the turn deadline by `elapsed`.
    ///
    /// Called by the hosting runtime at a fixed cadence. On expiry every
    /// seat without a submission gets an empty one, exactly as if it had
    /// submitted nothing. Returns what the forced submissions led to, or
    /// `None` if nothing was forced.
    pub fn tick(&mut self, elapsed: Duration) -> Option<SubmitOutcome> {
        if !self.phase.is_collecting() {
            return None;
        }

        self.turn.remaining = self.turn.remaining.saturating_sub(elapsed);
        if !self.turn.remaining.is_zero() {
            return None;
        }

        let missing: Vec<Seat> = self.turn.missing().collect();
        let mut outcome = None;
        for seat in missing {
            warn!(
                player = %self.sessions[seat].player_id(),
                turn = self.turn.turn_number,
                "deadline expired, forcing empty submission"
            );
            outcome = Some(self.accept_submission(seat, &[]));
        }
        outcome
    }

    // === Queries ===

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn.turn_number
    }

    #[must_use]
    pub fn available_cost(&self) -> u32 {
        self.turn.available_cost
    }

    #[must_use]
    pub fn remaining_time(&self) -> Duration {
        self.turn.remaining
    }

    /// Participants in seat order. Empty before the game starts.
    #[must_use]
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.sessions.values().map(|s| s.player_id().clone()).collect()
    }

    #[must_use]
    pub fn session(&self, player: &PlayerId) -> Option<&PlayerSession> {
        self.seats.get(player).map(|&seat| &self.sessions[seat])
    }

    #[must_use]
    pub fn has_submitted(&self, player: &PlayerId) -> bool {
        self.seats
            .get(player)
            .is_some_and(|&seat| self.turn.has_submitted(seat))
    }

    /// Public projection of every session, in seat order.
    #[must_use]
    pub fn session_views(&self) -> Vec<SessionView> {
        self.sessions.values().map(PlayerSession::view).collect()
    }

    /// Every event published so far, in order.
    #[must_use]
    pub fn event_log(&self) -> &Vector<GameEvent> {
        &self.event_log
    }

    #[must_use]
    pub fn final_scores(&self) -> BTreeMap<PlayerId, u32> {
        self.sessions
            .values()
            .map(|s| (s.player_id().clone(), s.score()))
            .collect()
    }

    /// The result once the game has ended.
    #[must_use]
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    // === Internals ===

    fn violation(&self, violation: ContractViolation) -> EngineError {
        error!(phase = self.phase.name(), %violation, "contract violation");
        violation.into()
    }

    /// Build one player's shuffled deck. Catalog misses are skipped.
    fn build_deck(&mut self, player: &PlayerId, pool: &[Arc<CardDefinition>]) -> Vec<Arc<CardDefinition>> {
        let mut deck: Vec<Arc<CardDefinition>> = match &self.config.deck_list {
            Some(list) => list
                .iter()
                .filter_map(|&id| {
                    let card = self.catalog.lookup(id);
                    if card.is_none() {
                        warn!(player = %player, card = %id, "deck card missing from catalog, skipped");
                    }
                    card
                })
                .collect(),
            None => (0..self.config.deck_size)
                .filter_map(|_| self.deck_rng.choose(pool).cloned())
                .collect(),
        };
        self.deck_rng.shuffle(&mut deck);
        deck
    }

    fn check_selection(&self, seat: Seat, selected: &[CardId]) -> Result<(), SubmitRejection> {
        if let Some(&missing) = selected.iter().find(|&&id| self.catalog.lookup(id).is_none()) {
            return Err(SubmitRejection::UnknownCard(missing));
        }

        let cards = self.sessions[seat].select_from_hand(selected)?;
        let cost = cards.iter().fold(0u32, |sum, c| sum.saturating_add(c.cost));
        if cost > self.turn.available_cost {
            return Err(SubmitRejection::CostExceeded {
                cost,
                available: self.turn.available_cost,
            });
        }
        Ok(())
    }

    /// Record a validated submission and resolve if it completes the set.
    fn accept_submission(&mut self, seat: Seat, selected: &[CardId]) -> SubmitOutcome {
        let session = &mut self.sessions[seat];
        // check_selection ran first; a forced submission is empty.
        let committed = session.commit(selected);
        debug_assert!(committed.is_ok(), "validated selection must commit: {committed:?}");
        if let Err(rejection) = committed {
            error!(%rejection, "validated selection failed to commit");
            return SubmitOutcome::AwaitingOthers;
        }
        let player_id = session.player_id().clone();
        let hand = session.hand_ids();
        self.turn.pending[seat] = Some(Selection::from_slice(selected));

        debug!(player = %player_id, turn = self.turn.turn_number, selected = ?selected, "submission accepted");
        self.publish(GameEvent::TurnSubmitted {
            player_id: player_id.clone(),
            selected_card_ids: selected.to_vec(),
        });
        self.publish(GameEvent::hand(&player_id, hand));

        if !self.turn.all_submitted() {
            return SubmitOutcome::AwaitingOthers;
        }

        self.resolve_turn();
        match &self.result {
            Some(result) => SubmitOutcome::GameEnded(result.clone()),
            None => SubmitOutcome::TurnResolved {
                next_turn: self.turn.turn_number,
            },
        }
    }

    fn resolve_turn(&mut self) {
        self.phase = GamePhase::InProgress(TurnPhase::Resolving);

        for seat in Seat::all(PLAYER_COUNT) {
            let card_ids = self.turn.pending[seat]
                .as_ref()
                .map(|s| s.to_vec())
                .unwrap_or_default();
            let player_id = self.sessions[seat].player_id().clone();
            self.publish(GameEvent::CardsRevealed { player_id, card_ids });
        }

        let resolution = AbilityResolver::resolve(&mut self.sessions, &mut self.discard_rng);
        debug!(
            turn = self.turn.turn_number,
            destroyed = ?resolution.destroyed,
            score_deltas = ?resolution.score_deltas,
            "turn resolved"
        );
        for event in resolution.events {
            self.publish(event);
        }

        self.begin_turn(self.turn.turn_number + 1);
    }

    fn begin_turn(&mut self, turn_number: u32) {
        if turn_number > self.config.total_turns {
            self.end_game();
            return;
        }

        if turn_number > 1 {
            for seat in Seat::all(PLAYER_COUNT) {
                let session = &mut self.sessions[seat];
                session.draw_card();
                let event = GameEvent::hand(session.player_id(), session.hand_ids());
                self.publish(event);
            }
        }

        let available_cost = self.config.available_cost(turn_number);
        self.turn = TurnState {
            turn_number,
            available_cost,
            remaining: self.config.turn_duration,
            pending: PlayerMap::new(PLAYER_COUNT, |_| None),
        };
        self.phase = GamePhase::InProgress(TurnPhase::CollectingSubmissions);

        let nominal = Seat::new(((turn_number - 1) as usize % PLAYER_COUNT) as u8);
        let current_player_id = self.sessions[nominal].player_id().clone();
        info!(turn = turn_number, available_cost, "turn started");
        self.publish(GameEvent::TurnStarted {
            turn_number,
            current_player_id,
            available_cost,
        });
    }

    fn end_game(&mut self) {
        self.phase = GamePhase::Ended;

        let final_scores = self.final_scores();
        let result = GameResult::from_scores(final_scores.iter().map(|(p, &s)| (p, s)));
        info!(winner = ?result.winner(), scores = ?final_scores, "game ended");
        debug!(
            deck_rng = ?self.deck_rng.state(),
            discard_rng = ?self.discard_rng.state(),
            "final rng positions"
        );

        self.result = Some(result.clone());
        self.publish(GameEvent::GameEnded {
            winner_id: result.winner().cloned(),
            final_scores,
        });
    }

    fn publish(&mut self, event: GameEvent) {
        debug!(event = event.name(), player = ?event.player_id(), "publish");
        self.bus.publish(&event);
        self.event_log.push_back(event);
    }
}

impl std::fmt::Debug for TurnStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnStateMachine")
            .field("phase", &self.phase)
            .field("turn", &self.turn)
            .field("sessions", &self.sessions)
            .field("events", &self.event_log.len())
            .finish()
    }
}
