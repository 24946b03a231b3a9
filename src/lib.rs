//! # duel-ccg
//!
//! Authoritative turn-resolution engine for a two-player card game in which
//! both players act simultaneously each turn.
//!
//! ## Design Principles
//!
//! 1. **One Authority**: A single `TurnStateMachine` owns all game state and
//!    is mutated strictly serially. Replicas only mirror its events.
//!
//! 2. **Deterministic Resolution**: A turn resolves in two fixed passes
//!    (destroy, then score), so the outcome never depends on which
//!    submission arrived first.
//!
//! 3. **Events Are The Protocol**: Every state change is a `GameEvent`.
//!    The wire carries the same events, and replaying them rebuilds the
//!    public state exactly.
//!
//! ## Modules
//!
//! - `core`: Players, sessions, RNG, configuration, errors
//! - `cards`: Card definitions, abilities and the catalog seam
//! - `events`: Domain events and the event bus
//! - `effects`: Ability resolution
//! - `rules`: Turn state machine
//! - `net`: Wire codec, authority/replica sync and the async driver

pub mod cards;
pub mod core;
pub mod effects;
pub mod events;
pub mod net;
pub mod rules;

// Re-export commonly used types
pub use crate::core::{
    ConfigError, ContractViolation, EngineConfig, EngineError, GameRng, PlayerId, PlayerMap,
    PlayerSession, Seat, SessionView, SubmitRejection, WireError, PLAYER_COUNT,
};

pub use crate::cards::{Ability, AbilityKind, CardCatalog, CardDefinition, CardId, CardRegistry};

pub use crate::events::{EventBus, GameEvent, SubscriptionId};

pub use crate::effects::{AbilityResolver, Resolution};

pub use crate::rules::{
    GamePhase, GameResult, SharedCatalog, SubmitOutcome, TurnPhase, TurnState, TurnStateMachine,
};

pub use crate::net::{
    run_authority, spawn_authority, HostHandle, HostSync, Received, ReplicaState, ReplicaSync,
    WireMessage,
};
