//! Turn state machine.
//!
//! The authority owns one `TurnStateMachine` per game. It sequences turns,
//! collects simultaneous submissions, enforces the per-turn deadline and
//! hands committed cards to the ability resolver.

mod machine;
mod turn;

pub use machine::{SharedCatalog, SubmitOutcome, TurnStateMachine};
pub use turn::{GamePhase, GameResult, Selection, TurnPhase, TurnState};
