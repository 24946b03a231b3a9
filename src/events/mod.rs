//! Domain events and the in-process event bus.
//!
//! - [`GameEvent`]: immutable record of a state change
//! - [`EventBus`]: ordered synchronous fan-out with explicit
//!   subscribe/unsubscribe
//!
//! The same event stream is produced on the authority and re-published on
//! each replica, so listeners cannot tell where an event originated.

mod bus;
mod event;

pub use bus::{EventBus, SubscriptionId};
pub use event::GameEvent;
