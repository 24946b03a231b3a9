//! Core engine types: players, sessions, RNG, configuration, errors.

pub mod config;
pub mod error;
pub mod player;
pub mod rng;
pub mod session;

pub use config::{EngineConfig, PLAYER_COUNT};
pub use error::{ConfigError, ContractViolation, EngineError, SubmitRejection, WireError};
pub use player::{PlayerId, PlayerMap, Seat};
pub use rng::{GameRng, GameRngState};
pub use session::{PlayerSession, SessionView};
