//! Error taxonomy.
//!
//! - [`SubmitRejection`]: an illegal selection. Reported to the submitter
//!   only; nothing changes and nothing is emitted. The caller may retry
//!   before the deadline.
//! - [`ContractViolation`]: the caller broke a precondition (wrong phase,
//!   unknown player). Logged and refused without touching state.
//! - [`WireError`]: a frame that could not be applied or sent. Discarded
//!   whole.
//! - [`ConfigError`]: invalid engine configuration.

use thiserror::Error;

use super::player::PlayerId;
use crate::cards::CardId;

/// Why a submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejection {
    #[error("cost exceeded: selection costs {cost}, turn allows {available}")]
    CostExceeded { cost: u32, available: u32 },

    #[error("{0} is not in hand")]
    CardNotInHand(CardId),

    #[error("{0} is not in the card catalog")]
    UnknownCard(CardId),
}

/// A caller broke the state machine's contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("operation requires phase {expected}, game is in {actual}")]
    WrongPhase {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("expected {expected} participants, got {actual}")]
    ParticipantCount { expected: usize, actual: usize },

    #[error("player {0} already submitted this turn")]
    AlreadySubmitted(PlayerId),

    #[error("player {0} listed twice")]
    DuplicatePlayer(PlayerId),

    #[error("card catalog is empty")]
    EmptyCatalog,
}

/// Umbrella error for state machine calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("submission rejected: {0}")]
    Rejected(#[from] SubmitRejection),

    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),
}

impl EngineError {
    /// Whether the caller may retry with a different selection.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, EngineError::Rejected(_))
    }
}

/// A wire frame that could not be applied.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("out of order: {reason}")]
    OutOfOrder { reason: String },

    #[error("unexpected '{action}' message on this side of the link")]
    UnexpectedMessage { action: &'static str },

    #[error("{0} is not in the card catalog")]
    UnknownCard(CardId),

    #[error("intent refused: {0}")]
    Refused(#[from] EngineError),

    #[error("peer link closed")]
    Disconnected,
}

impl WireError {
    pub(crate) fn out_of_order(reason: impl Into<String>) -> Self {
        WireError::OutOfOrder {
            reason: reason.into(),
        }
    }
}

/// Invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}
