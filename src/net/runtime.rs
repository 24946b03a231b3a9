//! Async driver for the authority.
//!
//! One task owns the `TurnStateMachine` outright. Replica frames and local
//! submissions are queued on a channel and applied one at a time, and a
//! fixed-cadence interval samples the deadline. Deadline ticks take priority
//! over queued commands, so an expired turn is forced before any later
//! submission is looked at.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use super::host::HostSync;
use crate::cards::CardId;
use crate::core::{EngineError, PlayerId, WireError};
use crate::rules::{GamePhase, SubmitOutcome, TurnStateMachine};

/// Work queued for the authority task.
#[derive(Debug)]
pub enum HostCommand {
    /// A raw frame from the replica link.
    Frame(String),
    /// A submission from a player seated at the authority.
    Submit {
        player: PlayerId,
        cards: Vec<CardId>,
        reply: oneshot::Sender<Result<SubmitOutcome, EngineError>>,
    },
}

/// Cloneable sender into a running authority.
#[derive(Clone, Debug)]
pub struct HostHandle {
    commands: mpsc::UnboundedSender<HostCommand>,
}

impl HostHandle {
    /// Queue a frame received from the replica.
    pub fn send_frame(&self, frame: impl Into<String>) -> Result<(), WireError> {
        self.commands
            .send(HostCommand::Frame(frame.into()))
            .map_err(|_| WireError::Disconnected)
    }

    /// Submit for a local player and wait for the authority's answer.
    pub async fn submit_turn(
        &self,
        player: PlayerId,
        cards: Vec<CardId>,
    ) -> Result<SubmitOutcome, WireError> {
        let (reply, answer) = oneshot::channel();
        self.commands
            .send(HostCommand::Submit {
                player,
                cards,
                reply,
            })
            .map_err(|_| WireError::Disconnected)?;

        let result = answer.await.map_err(|_| WireError::Disconnected)?;
        Ok(result?)
    }
}

/// Spawn the authority on the current runtime.
///
/// The task finishes after `gameEnd`, or early once every `HostHandle` is
/// dropped, and hands the state machine back.
pub fn spawn_authority(
    machine: TurnStateMachine,
    participants: Vec<PlayerId>,
    outbound: mpsc::UnboundedSender<String>,
) -> (HostHandle, JoinHandle<Result<TurnStateMachine, EngineError>>) {
    let (commands, inbound) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_authority(machine, participants, inbound, outbound));
    (HostHandle { commands }, task)
}

/// Run one game to completion against a command queue.
pub async fn run_authority(
    mut machine: TurnStateMachine,
    participants: Vec<PlayerId>,
    mut commands: mpsc::UnboundedReceiver<HostCommand>,
    outbound: mpsc::UnboundedSender<String>,
) -> Result<TurnStateMachine, EngineError> {
    let sync = HostSync::attach(&mut machine, outbound);
    if let Err(err) = machine.start_game(&participants) {
        sync.detach(&mut machine);
        return Err(err);
    }

    let mut ticker = time::interval(machine.config().tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;
    let mut last_tick = Instant::now();

    while machine.phase() != GamePhase::Ended {
        tokio::select! {
            biased;

            _ = ticker.tick() => {
                let now = Instant::now();
                if let Some(outcome) = machine.tick(now - last_tick) {
                    debug!(?outcome, "deadline forced progression");
                }
                last_tick = now;
            }
            command = commands.recv() => match command {
                Some(command) => apply_command(&sync, &mut machine, command),
                None => {
                    info!(turn = machine.turn_number(), "command channel closed, stopping authority");
                    break;
                }
            },
        }
    }

    sync.detach(&mut machine);
    Ok(machine)
}

fn apply_command(sync: &HostSync, machine: &mut TurnStateMachine, command: HostCommand) {
    match command {
        HostCommand::Frame(frame) => match sync.handle_frame(machine, &frame) {
            Ok(outcome) => debug!(?outcome, "replica intent applied"),
            Err(err) => warn!(%err, "replica frame not applied"),
        },
        HostCommand::Submit {
            player,
            cards,
            reply,
        } => {
            let result = machine.submit_turn(&player, &cards);
            if reply.send(result).is_err() {
                trace!(player = %player, "submitter stopped waiting");
            }
        }
    }
}
