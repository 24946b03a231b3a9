//! In-process publish/subscribe for domain events.
//!
//! The bus is owned by whoever produces events (the state machine on the
//! authority, the replica link on a replica). Delivery is synchronous and in
//! subscription order. A collaborator that goes away must `unsubscribe` the
//! id it was given; the bus keeps no other reference to it.

use serde::{Deserialize, Serialize};

use super::event::GameEvent;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}

type Listener = Box<dyn FnMut(&GameEvent) + Send>;

/// Ordered, synchronous event fan-out.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use duel_ccg::core::PlayerId;
/// use duel_ccg::events::{EventBus, GameEvent};
///
/// let mut bus = EventBus::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let id = bus.subscribe(move |e: &GameEvent| sink.lock().unwrap().push(e.clone()));
///
/// bus.publish(&GameEvent::ScoreChanged { player_id: PlayerId::new("a"), new_score: 1 });
/// assert!(bus.unsubscribe(id));
/// bus.publish(&GameEvent::ScoreChanged { player_id: PlayerId::new("a"), new_score: 2 });
///
/// assert_eq!(seen.lock().unwrap().len(), 1);
/// ```
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u32,
}

impl EventBus {
    /// Create a bus with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It sees every event published from now on.
    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Deliver an event to every listener, in subscription order.
    pub fn publish(&mut self, event: &GameEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
