//! Phases, per-turn state and the game result.

use std::time::Duration;

use smallvec::SmallVec;

use crate::cards::CardId;
use crate::core::{PlayerId, PlayerMap, Seat};

/// Card ids of one submission. Most turns commit a handful of cards.
pub type Selection = SmallVec<[CardId; 4]>;

/// Where the state machine is in the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    WaitingForPlayers,
    InProgress(TurnPhase),
    Ended,
}

/// Sub-phase of a turn while the game is in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    CollectingSubmissions,
    Resolving,
}

impl GamePhase {
    /// Stable name for logs and contract errors.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            GamePhase::WaitingForPlayers => "WaitingForPlayers",
            GamePhase::InProgress(TurnPhase::CollectingSubmissions) => "CollectingSubmissions",
            GamePhase::InProgress(TurnPhase::Resolving) => "Resolving",
            GamePhase::Ended => "Ended",
        }
    }

    #[must_use]
    pub fn is_collecting(self) -> bool {
        self == GamePhase::InProgress(TurnPhase::CollectingSubmissions)
    }
}

/// State of the current turn. Reset at every turn start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnState {
    /// 1-based turn number. 0 before the first turn.
    pub turn_number: u32,
    pub available_cost: u32,
    /// Time left before empty submissions are forced.
    pub remaining: Duration,
    /// Accepted submission per seat, `None` until the seat submits.
    pub pending: PlayerMap<Option<Selection>>,
}

impl TurnState {
    pub(crate) fn idle(seats: usize) -> Self {
        Self {
            turn_number: 0,
            available_cost: 0,
            remaining: Duration::ZERO,
            pending: PlayerMap::new(seats, |_| None),
        }
    }

    #[must_use]
    pub fn has_submitted(&self, seat: Seat) -> bool {
        self.pending[seat].is_some()
    }

    /// Every seat has a submission (possibly empty).
    #[must_use]
    pub fn all_submitted(&self) -> bool {
        self.pending.values().all(Option::is_some)
    }

    /// Seats still owing a submission, in seat order.
    pub fn missing(&self) -> impl Iterator<Item = Seat> + '_ {
        self.pending
            .iter()
            .filter(|(_, p)| p.is_none())
            .map(|(seat, _)| seat)
    }
}

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Strictly highest score.
    Winner(PlayerId),
    /// Tied for the highest score; nobody wins.
    Draw,
}

impl GameResult {
    /// Pick the strictly highest score. Ties at the top are a draw.
    pub fn from_scores<'a>(scores: impl IntoIterator<Item = (&'a PlayerId, u32)>) -> Self {
        let mut best: Option<(&PlayerId, u32)> = None;
        let mut tied = false;

        for (player, score) in scores {
            match best {
                Some((_, top)) if score == top => tied = true,
                Some((_, top)) if score < top => {}
                _ => {
                    best = Some((player, score));
                    tied = false;
                }
            }
        }

        match best {
            Some((player, _)) if !tied => GameResult::Winner(player.clone()),
            _ => GameResult::Draw,
        }
    }

    /// The winner, or `None` on a draw.
    #[must_use]
    pub fn winner(&self) -> Option<&PlayerId> {
        match self {
            GameResult::Winner(p) => Some(p),
            GameResult::Draw => None,
        }
    }

    #[must_use]
    pub fn is_winner(&self, player: &PlayerId) -> bool {
        self.winner() == Some(player)
    }
}
