//! The task that owns an arena
//!
//! One worker per battle. Commands and turn-timer expiry are both handled on
//! this task, so a command that lands before the deadline always cancels the
//! expiry for that turn. Automated turns run on the blocking pool because a
//! delegate coach may wait on its provider.

use std::ops::ControlFlow;
use std::time::Duration;

use coliseum_battle::{Arena, ArenaPhase};
use coliseum_protocol::{BattleEvent, PlayerSlot};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{self, Instant};

use crate::RuntimeError;
use crate::handle::{BattleStatus, Request};

/// Identifies one coach turn; the timer is re-armed whenever it changes
type TurnMarker = (u32, PlayerSlot, ArenaPhase);

#[derive(Debug, Clone, Copy)]
struct ArmedTimer {
    started: Instant,
    deadline: Instant,
}

pub(crate) struct Worker {
    requests: mpsc::UnboundedReceiver<Request>,
    events: broadcast::Sender<BattleEvent>,
    /// Log position up to which events have been published
    cursor: usize,
    marker: Option<TurnMarker>,
    timer: Option<ArmedTimer>,
    /// The automated coach of this turn did not act; wait for the timer
    stalled: bool,
}

impl Worker {
    pub(crate) fn new(
        requests: mpsc::UnboundedReceiver<Request>,
        events: broadcast::Sender<BattleEvent>,
    ) -> Self {
        Self {
            requests,
            events,
            cursor: 0,
            marker: None,
            timer: None,
            stalled: false,
        }
    }

    /// Drive the battle until shutdown or until every handle is dropped
    pub(crate) async fn run(mut self, mut arena: Arena) -> Result<Arena, RuntimeError> {
        tracing::debug!(target: "coliseum::runtime", mode = %arena.mode(), "Battle worker started");

        loop {
            self.publish(&arena);
            self.rearm(&arena);

            if self.wants_automation(&arena) {
                // Queued requests go first; with no handles left the battle still plays out
                if let Ok(request) = self.requests.try_recv() {
                    if self.handle(&mut arena, request).is_break() {
                        break;
                    }
                    continue;
                }

                let (returned, progressed) = tokio::task::spawn_blocking(move || {
                    let progressed = arena.run_automated_turn();
                    (arena, progressed)
                })
                .await
                .map_err(|e| {
                    tracing::error!(target: "coliseum::runtime", error = %e, "Automated turn task failed");
                    RuntimeError::from(e)
                })?;
                arena = returned;
                self.stalled = !progressed;
                continue;
            }

            let deadline = self.timer.map(|t| t.deadline);
            tokio::select! {
                request = self.requests.recv() => {
                    let Some(request) = request else {
                        break;
                    };
                    if self.handle(&mut arena, request).is_break() {
                        break;
                    }
                }
                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.timer = None;
                    if let Err(e) = arena.expire_turn() {
                        tracing::debug!(target: "coliseum::runtime", error = %e, "Turn timer fired on an idle battle");
                    }
                }
            }
        }

        self.publish(&arena);
        tracing::debug!(
            target: "coliseum::runtime",
            phase = ?arena.phase(),
            result = ?arena.result(),
            "Battle worker stopped"
        );
        Ok(arena)
    }

    fn handle(&mut self, arena: &mut Arena, request: Request) -> ControlFlow<()> {
        match request {
            Request::Submit { message, reply } => {
                let result = arena.dispatch(&message);
                if let Err(e) = &result {
                    tracing::debug!(
                        target: "coliseum::runtime",
                        command = %message.to_wire_format(),
                        error = %e,
                        "Command rejected"
                    );
                }
                let _ = reply.send(result);
            }
            Request::Pause { reply } => {
                let elapsed = self
                    .timer
                    .map(|t| t.started.elapsed())
                    .unwrap_or_default();
                let _ = reply.send(arena.pause(elapsed));
            }
            Request::Resume { reply } => {
                let _ = reply.send(arena.resume());
            }
            Request::Status { reply } => {
                let _ = reply.send(BattleStatus {
                    phase: arena.phase(),
                    turn: arena.turn_number(),
                    current: arena.current_turn(),
                    remaining_turn_time: self.remaining(arena),
                    result: arena.result(),
                });
            }
            Request::Snapshot { reply } => {
                let mut snapshot = arena.snapshot();
                snapshot.remaining_turn_ms = self.remaining(arena).as_millis() as u64;
                let _ = reply.send(snapshot);
            }
            Request::ReplacePolicy {
                player,
                policy,
                reply,
            } => {
                let _ = reply.send(arena.replace_policy(player, policy));
            }
            Request::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn wants_automation(&self, arena: &Arena) -> bool {
        arena.phase() == ArenaPhase::InProgress
            && arena.side(arena.current_turn()).is_automated()
            && !self.stalled
    }

    /// Time left on the armed timer, or the arena's stored budget
    fn remaining(&self, arena: &Arena) -> Duration {
        match self.timer {
            Some(t) => t.deadline.saturating_duration_since(Instant::now()),
            None => arena.remaining_turn_time(),
        }
    }

    fn rearm(&mut self, arena: &Arena) {
        let marker = (arena.turn_number(), arena.current_turn(), arena.phase());
        if self.marker == Some(marker) {
            return;
        }
        self.marker = Some(marker);
        self.stalled = false;
        self.timer = (arena.phase() == ArenaPhase::InProgress).then(|| {
            let started = Instant::now();
            ArmedTimer {
                started,
                deadline: started + arena.remaining_turn_time(),
            }
        });
    }

    fn publish(&mut self, arena: &Arena) {
        for event in arena.events_since(self.cursor) {
            // No subscribers is fine
            let _ = self.events.send(event.clone());
        }
        self.cursor = arena.log().len();
    }
}
