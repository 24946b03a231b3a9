//! Authority side of the link.

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, trace, warn};

use super::message::WireMessage;
use crate::core::{EngineError, WireError};
use crate::events::SubscriptionId;
use crate::rules::{SubmitOutcome, TurnStateMachine};

/// Mirrors the authority's events onto the wire and applies replica intents.
///
/// Attaching subscribes an encoder to the state machine's bus, so every
/// event reaches `outbound` in publish order. `detach` removes it again.
#[derive(Debug)]
pub struct HostSync {
    subscription: SubscriptionId,
    outbound: UnboundedSender<String>,
}

impl HostSync {
    /// Start mirroring `machine`'s events into `outbound`.
    pub fn attach(machine: &mut TurnStateMachine, outbound: UnboundedSender<String>) -> Self {
        let sink = outbound.clone();
        let subscription = machine.subscribe(move |event| {
            let message = WireMessage::from(event.clone());
            match message.encode() {
                Ok(frame) => {
                    if sink.send(frame).is_err() {
                        trace!(action = message.action(), "replica link closed, frame dropped");
                    }
                }
                Err(err) => error!(action = message.action(), %err, "failed to encode event"),
            }
        });
        debug!(%subscription, "host sync attached");

        Self {
            subscription,
            outbound,
        }
    }

    /// Stop mirroring. Returns whether the listener was still attached.
    pub fn detach(self, machine: &mut TurnStateMachine) -> bool {
        debug!(subscription = %self.subscription, "host sync detached");
        machine.unsubscribe(self.subscription)
    }

    /// Apply one inbound replica frame against the authority.
    ///
    /// Only `endTurn` intents are accepted. A rejected selection is answered
    /// with a `submitRejected` frame to the replica and reported back as
    /// `WireError::Refused`; the authority state is untouched. An intent
    /// applies to whichever turn is collecting when the frame is handled.
    pub fn handle_frame(
        &self,
        machine: &mut TurnStateMachine,
        frame: &str,
    ) -> Result<SubmitOutcome, WireError> {
        let message = WireMessage::decode(frame).map_err(|err| {
            warn!(%err, "discarding malformed replica frame");
            err
        })?;

        let action = message.action();
        let WireMessage::EndTurn {
            player_id,
            selected_card_ids,
        } = message
        else {
            warn!(action, "replica sent a non-intent frame");
            return Err(WireError::UnexpectedMessage { action });
        };

        match machine.submit_turn(&player_id, &selected_card_ids) {
            Ok(outcome) => Ok(outcome),
            Err(EngineError::Rejected(rejection)) => {
                let reply = WireMessage::SubmitRejected {
                    player_id,
                    reason: rejection.to_string(),
                };
                self.send(&reply)?;
                Err(EngineError::Rejected(rejection).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn send(&self, message: &WireMessage) -> Result<(), WireError> {
        let frame = message.encode()?;
        self.outbound.send(frame).map_err(|_| WireError::Disconnected)
    }
}
