use std::time::Duration;

use coliseum_battle::{ArenaPhase, ArenaSnapshot, BattleError, BattleResult, DecisionPolicy};
use coliseum_protocol::{BattleEvent, CommandMessage, PlayerSlot, parse_command_message};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::RuntimeError;

/// Point-in-time view of the battle the worker owns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleStatus {
    pub phase: ArenaPhase,
    pub turn: u32,
    pub current: PlayerSlot,
    pub remaining_turn_time: Duration,
    pub result: Option<BattleResult>,
}

pub(crate) enum Request {
    Submit {
        message: CommandMessage,
        reply: oneshot::Sender<Result<(), BattleError>>,
    },
    Pause {
        reply: oneshot::Sender<Result<(), BattleError>>,
    },
    Resume {
        reply: oneshot::Sender<Result<Duration, BattleError>>,
    },
    Status {
        reply: oneshot::Sender<BattleStatus>,
    },
    Snapshot {
        reply: oneshot::Sender<ArenaSnapshot>,
    },
    ReplacePolicy {
        player: PlayerSlot,
        policy: Box<dyn DecisionPolicy>,
        reply: oneshot::Sender<Result<(), BattleError>>,
    },
    Shutdown,
}

/// Cloneable front end of a running battle
///
/// Every call is queued on the worker and answered in arrival order. Once the
/// worker is gone every call returns [`RuntimeError::Closed`].
#[derive(Clone)]
pub struct RuntimeHandle {
    tx: mpsc::UnboundedSender<Request>,
    events: broadcast::Sender<BattleEvent>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<Request>,
        events: broadcast::Sender<BattleEvent>,
    ) -> Self {
        Self { tx, events }
    }

    fn send(&self, request: Request) -> Result<(), RuntimeError> {
        self.tx.send(request).map_err(|_| RuntimeError::Closed)
    }

    async fn call<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, RuntimeError> {
        let (reply, rx) = oneshot::channel();
        self.send(build(reply))?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    pub async fn submit(&self, message: CommandMessage) -> Result<(), RuntimeError> {
        self.call(|reply| Request::Submit { message, reply })
            .await?
            .map_err(RuntimeError::from)
    }

    /// Parse and submit a wire command such as `p1|/attack Thunderbolt`
    pub async fn submit_line(&self, line: &str) -> Result<(), RuntimeError> {
        let message = parse_command_message(line)?;
        self.submit(message).await
    }

    pub async fn pause(&self) -> Result<(), RuntimeError> {
        self.call(|reply| Request::Pause { reply })
            .await?
            .map_err(RuntimeError::from)
    }

    /// Returns the turn time left for the current coach
    pub async fn resume(&self) -> Result<Duration, RuntimeError> {
        self.call(|reply| Request::Resume { reply })
            .await?
            .map_err(RuntimeError::from)
    }

    pub async fn status(&self) -> Result<BattleStatus, RuntimeError> {
        self.call(|reply| Request::Status { reply }).await
    }

    pub async fn snapshot(&self) -> Result<ArenaSnapshot, RuntimeError> {
        self.call(|reply| Request::Snapshot { reply }).await
    }

    pub async fn replace_policy(
        &self,
        player: PlayerSlot,
        policy: Box<dyn DecisionPolicy>,
    ) -> Result<(), RuntimeError> {
        self.call(|reply| Request::ReplacePolicy {
            player,
            policy,
            reply,
        })
        .await?
        .map_err(RuntimeError::from)
    }

    /// Receive every event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<BattleEvent> {
        self.events.subscribe()
    }

    /// Stop the worker after the requests already queued
    pub fn shutdown(&self) -> Result<(), RuntimeError> {
        self.send(Request::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
