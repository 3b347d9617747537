//! Async driver for Coliseum battles.
//!
//! [`spawn`] moves a configured [`Arena`] onto a tokio task and hands back a
//! [`RuntimeHandle`] for submitting commands, a broadcast receiver for the
//! battle's events, and the task's join handle, which yields the arena when
//! the worker stops.
//!
//! ```ignore
//! let battle = coliseum_runtime::spawn(arena, &RuntimeConfig::default())?;
//! let mut events = battle.events;
//!
//! battle.handle.submit_line("p1|/attack Thunderbolt").await?;
//! while let Ok(event) = events.recv().await {
//!     println!("{}", event.to_protocol_string());
//! }
//! ```
//!
//! Human turns are bounded by the arena's turn budget: when it runs out the
//! worker expires the turn. Pausing stops that clock and resuming restarts it
//! with whatever was left.

pub mod config;
mod error;
mod handle;
pub mod provider;
mod worker;

use coliseum_battle::{Arena, DelegatePolicy, StrategyKind};
use coliseum_protocol::{BattleEvent, PlayerSlot};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

pub use config::{ProviderConfig, RuntimeConfig};
pub use error::RuntimeError;
pub use handle::{BattleStatus, RuntimeHandle};
pub use provider::HttpDecisionProvider;

use worker::Worker;

/// A battle running on its own worker task
pub struct SpawnedBattle {
    pub handle: RuntimeHandle,
    /// Subscribed before the worker starts, so it sees every event
    pub events: broadcast::Receiver<BattleEvent>,
    pub task: JoinHandle<Result<Arena, RuntimeError>>,
}

/// Start driving a configured arena
///
/// When `config.provider` is set, delegate coaches are connected to an
/// [`HttpDecisionProvider`] for that endpoint. Must be called from within a
/// tokio runtime.
pub fn spawn(mut arena: Arena, config: &RuntimeConfig) -> Result<SpawnedBattle, RuntimeError> {
    if let Some(provider) = &config.provider {
        for player in PlayerSlot::BOTH {
            if arena.side(player).strategy_kind() != Some(StrategyKind::Delegate) {
                continue;
            }
            let http = HttpDecisionProvider::new(provider, Handle::current())?;
            arena.replace_policy(
                player,
                Box::new(DelegatePolicy::new(Box::new(http), config.breaker)),
            )?;
            tracing::info!(
                target: "coliseum::runtime",
                player = %player,
                endpoint = %provider.endpoint,
                "Delegate coach connected to decision provider"
            );
        }
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let (events, first) = broadcast::channel(config.event_capacity.max(1));
    let handle = RuntimeHandle::new(tx, events.clone());
    let task = tokio::spawn(Worker::new(rx, events).run(arena));

    Ok(SpawnedBattle {
        handle,
        events: first,
        task,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use coliseum_battle::{
        ArenaConfig, ArenaPhase, BattleError, BattleMode, BattleResult, Catalog, Coach,
    };
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    use super::*;

    fn human_arena(budget_ms: u64) -> Arena {
        let catalog = Catalog::builtin().unwrap();
        let ash = Coach::human("Ash").with_roster(vec![catalog.spawn("Pikachu", None).unwrap()]);
        let misty = Coach::human("Misty").with_roster(vec![catalog.spawn("Squirtle", None).unwrap()]);

        let mut arena = Arena::new(ArenaConfig {
            turn_budget_ms: budget_ms,
            seed: Some(5),
            ..ArenaConfig::default()
        });
        arena.configure(BattleMode::HumanVsHuman, ash, misty).unwrap();
        arena
    }

    fn drain(events: &mut broadcast::Receiver<BattleEvent>) -> Vec<BattleEvent> {
        let mut seen = Vec::new();
        loop {
            match events.try_recv() {
                Ok(event) => seen.push(event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => return seen,
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_timer_expires() {
        let mut battle = spawn(human_arena(1_000), &RuntimeConfig::default()).unwrap();

        tokio::time::sleep(Duration::from_millis(900)).await;
        let status = battle.handle.status().await.unwrap();
        assert_eq!(status.turn, 1);
        assert_eq!(status.current, PlayerSlot::P1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let status = battle.handle.status().await.unwrap();
        assert_eq!(status.turn, 2);
        assert_eq!(status.current, PlayerSlot::P2);

        let events = drain(&mut battle.events);
        assert!(matches!(events.first(), Some(BattleEvent::Player { .. })));
        assert!(events.contains(&BattleEvent::Timeout(PlayerSlot::P1)));
        assert!(events.contains(&BattleEvent::Turn(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_cancels_pending_expiry() {
        let battle = spawn(human_arena(1_000), &RuntimeConfig::default()).unwrap();

        tokio::time::sleep(Duration::from_millis(800)).await;
        battle.handle.submit_line("p1|/attack Thunderbolt").await.unwrap();

        // Past the first deadline, before the second
        tokio::time::sleep(Duration::from_millis(500)).await;
        let status = battle.handle.status().await.unwrap();
        assert_eq!(status.turn, 2);
        assert_eq!(status.current, PlayerSlot::P2);

        tokio::time::sleep(Duration::from_millis(600)).await;
        let status = battle.handle.status().await.unwrap();
        assert_eq!(status.turn, 3);
        assert_eq!(status.current, PlayerSlot::P1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_and_resume_keep_remaining_time() {
        let battle = spawn(human_arena(1_000), &RuntimeConfig::default()).unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;
        battle.handle.pause().await.unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        let status = battle.handle.status().await.unwrap();
        assert_eq!(status.phase, ArenaPhase::Paused);
        assert_eq!(status.turn, 1);
        assert_eq!(status.remaining_turn_time, Duration::from_millis(600));

        let remaining = battle.handle.resume().await.unwrap();
        assert_eq!(remaining, Duration::from_millis(600));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(battle.handle.status().await.unwrap().turn, 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(battle.handle.status().await.unwrap().turn, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_commands_reach_the_caller() {
        let battle = spawn(human_arena(1_000), &RuntimeConfig::default()).unwrap();

        let err = battle.handle.submit_line("p2|/attack Water Gun").await.unwrap_err();
        assert!(matches!(err, RuntimeError::Battle(BattleError::NotYourTurn(_))));

        let err = battle.handle.submit_line("p1|/dance").await.unwrap_err();
        assert!(matches!(err, RuntimeError::Parse(_)));

        let err = battle.handle.resume().await.unwrap_err();
        assert!(matches!(err, RuntimeError::Battle(BattleError::NotInProgress)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_returns_arena() {
        let battle = spawn(human_arena(1_000), &RuntimeConfig::default()).unwrap();
        battle.handle.submit_line("p1|/flee").await.unwrap();

        let status = battle.handle.status().await.unwrap();
        assert_eq!(status.result, Some(BattleResult::Winner(PlayerSlot::P2)));

        battle.handle.shutdown().unwrap();
        let arena = battle.task.await.unwrap().unwrap();
        assert!(arena.is_finished());

        assert!(battle.handle.status().await.is_err());
        assert!(battle.handle.is_closed());
    }

    #[tokio::test]
    async fn test_automated_battle_runs_to_completion() {
        let catalog = Catalog::builtin().unwrap();
        let red = Coach::automated("Red", StrategyKind::Attacking)
            .with_roster(vec![
                catalog.spawn("Charmander", None).unwrap(),
                catalog.spawn("Geodude", None).unwrap(),
            ])
            .with_inventory(catalog.starter_inventory().unwrap());
        let blue = Coach::automated("Blue", StrategyKind::Expert)
            .with_roster(vec![
                catalog.spawn("Squirtle", None).unwrap(),
                catalog.spawn("Abra", None).unwrap(),
            ])
            .with_inventory(catalog.starter_inventory().unwrap());

        let mut arena = Arena::new(ArenaConfig {
            seed: Some(11),
            ..ArenaConfig::default()
        });
        arena.configure(BattleMode::AutomatedVsAutomated, red, blue).unwrap();

        let mut battle = spawn(arena, &RuntimeConfig::default()).unwrap();
        loop {
            match battle.events.recv().await {
                Ok(BattleEvent::Win(_)) | Ok(BattleEvent::Tie) => break,
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => panic!("worker stopped before the battle ended"),
            }
        }

        let snapshot = battle.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.phase, ArenaPhase::Finished);

        drop(battle.handle);
        let arena = battle.task.await.unwrap().unwrap();
        assert!(arena.result().is_some());
    }

    #[tokio::test]
    async fn test_delegate_coach_connected_to_provider() {
        let catalog = Catalog::builtin().unwrap();
        let ash = Coach::human("Ash").with_roster(vec![catalog.spawn("Pikachu", None).unwrap()]);
        let bot = Coach::automated("Bot", StrategyKind::Delegate)
            .with_roster(vec![catalog.spawn("Squirtle", None).unwrap()]);
        let mut arena = Arena::new(ArenaConfig::default());
        arena.configure(BattleMode::HumanVsAutomated, ash, bot).unwrap();

        let config = RuntimeConfig {
            provider: Some(ProviderConfig::new("http://127.0.0.1:9/decide")),
            ..RuntimeConfig::default()
        };
        let battle = spawn(arena, &config).unwrap();
        let snapshot = battle.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.coaches[1].strategy, Some(StrategyKind::Delegate));
        battle.handle.shutdown().unwrap();
        battle.task.await.unwrap().unwrap();
    }
}
