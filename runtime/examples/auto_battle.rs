//! Automated Battle Example
//!
//! Two automated coaches with random rosters fight to the end while the
//! battle log is printed as it happens.
//!
//! Run with `cargo run -p coliseum-runtime --example auto_battle [config.json]`.
//! Set `RUST_LOG=coliseum=debug` to see arena and strategy tracing.

use anyhow::{Context, Result};
use coliseum_battle::{Arena, BattleMode, Catalog, Coach, StrategyKind, rng};
use coliseum_protocol::BattleEvent;
use coliseum_runtime::RuntimeConfig;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => RuntimeConfig::load(&path)?,
        None => RuntimeConfig::default(),
    };

    let catalog = Catalog::builtin().context("Built-in catalog failed to load")?;
    let mut setup_rng = rng::from_seed(config.arena.seed);

    let red = Coach::automated("Red", StrategyKind::Attacking)
        .with_color("red")
        .with_roster(catalog.random_roster(3, setup_rng.as_mut())?)
        .with_inventory(catalog.starter_inventory()?);
    let blue = Coach::automated("Blue", StrategyKind::Expert)
        .with_color("blue")
        .with_roster(catalog.random_roster(3, setup_rng.as_mut())?)
        .with_inventory(catalog.starter_inventory()?);

    let mut arena = Arena::new(config.arena.clone());
    arena.configure(BattleMode::AutomatedVsAutomated, red, blue)?;

    let mut battle = coliseum_runtime::spawn(arena, &config)?;

    loop {
        match battle.events.recv().await {
            Ok(event) => {
                println!("{}", event.to_protocol_string());
                if matches!(event, BattleEvent::Win(_) | BattleEvent::Tie) {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                println!("... {} events skipped", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    battle.handle.shutdown()?;
    let arena = battle.task.await??;
    println!(
        "Finished after {} turns: {:?}",
        arena.turn_number(),
        arena.result()
    );

    Ok(())
}
