//! Network synchronization between the authority and its replica.
//!
//! - `HostSync` mirrors every authority event onto the wire in publish order
//!   and applies inbound `endTurn` intents as ordinary submissions.
//! - `ReplicaSync` applies authority frames to a `ReplicaState` and
//!   re-publishes them on a local `EventBus`.
//! - `run_authority` drives a game on a tokio task.
//!
//! Transport is out of scope: frames are `String`s on ordered, reliable
//! `tokio::sync::mpsc` channels.

mod host;
mod message;
mod replica;
mod runtime;

pub use host::HostSync;
pub use message::WireMessage;
pub use replica::{Received, ReplicaPhase, ReplicaState, ReplicaSync};
pub use runtime::{run_authority, spawn_authority, HostCommand, HostHandle};
