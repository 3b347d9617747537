//! Deep snapshots of a running battle
//!
//! A snapshot holds everything needed to continue a battle except the random
//! generator and the policies' internal state: policies are rebuilt from
//! their [`StrategyKind`] on restore. Restoring the same snapshot twice with
//! equally seeded generators yields identical battles from there on.

use std::time::Duration;

use coliseum_protocol::PlayerSlot;
use serde::{Deserialize, Serialize};

use super::{Arena, ArenaConfig, ArenaPhase, BattleMode, BattleResult, TurnTimer};
use crate::coach::{Coach, Controller};
use crate::combatant::Combatant;
use crate::item::Item;
use crate::rng::ArenaRng;
use crate::strategy::StrategyKind;
use crate::BattleError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachSnapshot {
    pub name: String,
    pub color: String,
    pub roster: Vec<Combatant>,
    pub active: usize,
    pub inventory: Vec<Item>,
    pub fled: bool,
    pub score: u32,
    pub turns_taken: u32,
    #[serde(default)]
    pub last_switch_turn: Option<u32>,
    /// `None` for human coaches
    pub strategy: Option<StrategyKind>,
}

impl CoachSnapshot {
    fn capture(coach: &Coach) -> Self {
        Self {
            name: coach.name.clone(),
            color: coach.color.clone(),
            roster: coach.roster().to_vec(),
            active: coach.active_index(),
            inventory: coach.inventory().to_vec(),
            fled: coach.has_fled(),
            score: coach.score(),
            turns_taken: coach.turns_taken(),
            last_switch_turn: coach.last_switch_turn(),
            strategy: coach.strategy_kind(),
        }
    }

    fn rebuild(self) -> Result<Coach, BattleError> {
        if self.active >= self.roster.len() {
            return Err(BattleError::InvalidRosterIndex(self.active));
        }

        let controller = match self.strategy {
            Some(kind) => Controller::automated(kind),
            None => Controller::Human,
        };
        let mut coach = Coach::new(self.name, controller)
            .with_color(self.color)
            .with_roster(self.roster)
            .with_inventory(self.inventory);
        coach.restore_state(
            self.active,
            self.fled,
            self.score,
            self.turns_taken,
            self.last_switch_turn,
        );
        Ok(coach)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub mode: BattleMode,
    pub phase: ArenaPhase,
    pub current: PlayerSlot,
    pub turn: u32,
    pub remaining_turn_ms: u64,
    pub result: Option<BattleResult>,
    pub coaches: [CoachSnapshot; 2],
}

impl ArenaSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Arena {
    pub fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot {
            mode: self.mode,
            phase: self.phase,
            current: self.current,
            turn: self.turn,
            remaining_turn_ms: self.timer.remaining().as_millis() as u64,
            result: self.result,
            coaches: [
                CoachSnapshot::capture(&self.sides[0]),
                CoachSnapshot::capture(&self.sides[1]),
            ],
        }
    }

    /// Continue a battle from a snapshot
    ///
    /// Delegate coaches come back with an unreachable provider; use
    /// [`Arena::replace_policy`] to reconnect them. The event log starts empty.
    pub fn restore(
        snapshot: ArenaSnapshot,
        config: ArenaConfig,
        rng: ArenaRng,
    ) -> Result<Arena, BattleError> {
        let [p1, p2] = snapshot.coaches;
        let sides = [p1.rebuild()?, p2.rebuild()?];

        let catalog = if snapshot.mode == BattleMode::SurvivalRandom {
            Some(crate::catalog::Catalog::builtin()?)
        } else {
            None
        };

        let mut arena = Arena::with_rng(config, rng);
        arena.timer = TurnTimer::with_remaining(
            arena.config.turn_budget(),
            Duration::from_millis(snapshot.remaining_turn_ms),
        );
        arena.mode = snapshot.mode;
        arena.phase = snapshot.phase;
        arena.sides = sides;
        arena.current = snapshot.current;
        arena.turn = snapshot.turn;
        arena.catalog = catalog;
        arena.result = snapshot.result;
        Ok(arena)
    }
}
