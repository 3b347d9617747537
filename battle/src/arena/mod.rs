//! Battle orchestration
//!
//! The [`Arena`] is the turn state machine: it owns both coaches, validates
//! every command against the current phase and turn before touching state,
//! resolves the action, then runs the end-of-action bookkeeping (status tick,
//! faint handling, win check, turn flip).
//!
//! # Phases
//!
//! ```text
//! Setup ──configure──▶ InProgress ◀──resume── Paused
//!                          │  └─────pause──────▶ │
//!                          ▼                     │
//!                       Finished ◀────flee───────┘
//! ```
//!
//! Every state change is appended to the event log as a [`BattleEvent`], so
//! a driver can stream it to observers.
//!
//! The arena keeps no clock. The turn timer is bookkeeping only: a driver
//! arms its own deadline from [`Arena::remaining_turn_time`] and calls
//! [`Arena::expire_turn`] when it fires.

mod snapshot;
mod timer;

pub use snapshot::{ArenaSnapshot, CoachSnapshot};
pub use timer::TurnTimer;

use std::time::Duration;

use coliseum_protocol::{BattleEvent, Command, CommandMessage, CombatantRef, PlayerSlot};
use serde::{Deserialize, Serialize};

use crate::attack::{self, StrikeOutcome, Target};
use crate::catalog::{Catalog, MAX_ROSTER};
use crate::coach::{Coach, Controller};
use crate::combatant::MAX_ATTACKS;
use crate::item::ItemEffect;
use crate::rng::{self, ArenaRng};
use crate::strategy::{Decision, DecisionPolicy};
use crate::types::{ElementType, StatusCode};
use crate::BattleError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Time a coach has to act each turn
    pub turn_budget_ms: u64,
    /// Turn count after which the battle ends in a draw
    pub max_turns: u32,
    /// Seed for reproducible battles; entropy when absent
    pub seed: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            turn_budget_ms: 20_000,
            max_turns: 1_000,
            seed: None,
        }
    }
}

impl ArenaConfig {
    pub fn turn_budget(&self) -> Duration {
        Duration::from_millis(self.turn_budget_ms)
    }
}

/// Who plays whom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleMode {
    HumanVsHuman,
    HumanVsAutomated,
    AutomatedVsAutomated,
    /// Player one against an endless line of random automated rosters
    SurvivalRandom,
}

impl BattleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BattleMode::HumanVsHuman => "human_vs_human",
            BattleMode::HumanVsAutomated => "human_vs_automated",
            BattleMode::AutomatedVsAutomated => "automated_vs_automated",
            BattleMode::SurvivalRandom => "survival_random",
        }
    }

    fn check_controllers(&self, p1: &Coach, p2: &Coach) -> Result<(), BattleError> {
        let ok = match self {
            BattleMode::HumanVsHuman => !p1.is_automated() && !p2.is_automated(),
            BattleMode::HumanVsAutomated => !p1.is_automated() && p2.is_automated(),
            BattleMode::AutomatedVsAutomated => p1.is_automated() && p2.is_automated(),
            BattleMode::SurvivalRandom => p2.is_automated(),
        };
        if ok {
            Ok(())
        } else {
            Err(BattleError::InvalidSetup(format!(
                "controllers do not match mode {}",
                self
            )))
        }
    }
}

impl std::fmt::Display for BattleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArenaPhase {
    Setup,
    InProgress,
    Paused,
    /// Terminal
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleResult {
    Winner(PlayerSlot),
    Draw,
}

/// One move as shown to a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveSummary {
    pub name: String,
    pub pp: u32,
    pub max_pp: u32,
}

/// Active combatant as shown to a player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveSummary {
    pub name: String,
    pub kind: ElementType,
    pub hp: u32,
    pub max_hp: u32,
    pub status: StatusCode,
    pub moves: Vec<MoveSummary>,
}

pub struct Arena {
    config: ArenaConfig,
    mode: BattleMode,
    phase: ArenaPhase,
    sides: [Coach; 2],
    current: PlayerSlot,
    turn: u32,
    timer: TurnTimer,
    rng: ArenaRng,
    /// Source of fresh opponents in survival mode
    catalog: Option<&'static Catalog>,
    log: Vec<BattleEvent>,
    result: Option<BattleResult>,
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("mode", &self.mode)
            .field("phase", &self.phase)
            .field("current", &self.current)
            .field("turn", &self.turn)
            .field("sides", &self.sides)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

fn pair_mut(sides: &mut [Coach; 2], player: PlayerSlot) -> (&mut Coach, &mut Coach) {
    let (first, second) = sides.split_at_mut(1);
    match player {
        PlayerSlot::P1 => (&mut first[0], &mut second[0]),
        PlayerSlot::P2 => (&mut second[0], &mut first[0]),
    }
}

fn status_label(code: StatusCode) -> String {
    code.to_protocol().unwrap_or("none").to_string()
}

fn validate_roster(coach: &Coach) -> Result<(), BattleError> {
    let roster = coach.roster();
    if roster.is_empty() || roster.len() > MAX_ROSTER {
        return Err(BattleError::InvalidSetup(format!(
            "{} fields {} combatants, expected 1 to {}",
            coach.name,
            roster.len(),
            MAX_ROSTER
        )));
    }
    if coach.is_defeated() {
        return Err(BattleError::InvalidSetup(format!(
            "{} has no conscious combatant",
            coach.name
        )));
    }
    if let Some(c) = roster.iter().find(|c| c.attacks().len() > MAX_ATTACKS) {
        return Err(BattleError::MoveSlotsFull(c.name.clone()));
    }
    Ok(())
}

impl Arena {
    pub fn new(config: ArenaConfig) -> Self {
        let rng = rng::from_seed(config.seed);
        Self::with_rng(config, rng)
    }

    /// Arena drawing from an injected generator
    pub fn with_rng(config: ArenaConfig, rng: ArenaRng) -> Self {
        Self {
            timer: TurnTimer::new(config.turn_budget()),
            config,
            mode: BattleMode::HumanVsHuman,
            phase: ArenaPhase::Setup,
            sides: [Coach::human("Player 1"), Coach::human("Player 2")],
            current: PlayerSlot::P1,
            turn: 0,
            rng,
            catalog: None,
            log: Vec::new(),
            result: None,
        }
    }

    /// Seat both coaches and start the battle
    ///
    /// In survival mode the second coach's roster is replaced by a random
    /// catalog roster of the same size as the first coach's.
    pub fn configure(
        &mut self,
        mode: BattleMode,
        p1: Coach,
        mut p2: Coach,
    ) -> Result<(), BattleError> {
        if self.phase != ArenaPhase::Setup {
            return Err(BattleError::InvalidSetup("battle already configured".into()));
        }
        mode.check_controllers(&p1, &p2)?;
        validate_roster(&p1)?;

        let catalog = if mode == BattleMode::SurvivalRandom {
            let catalog = Catalog::builtin()?;
            p2.replace_roster(catalog.random_roster(p1.roster().len(), self.rng.as_mut())?);
            Some(catalog)
        } else {
            None
        };
        validate_roster(&p2)?;

        let mut sides = [p1, p2];
        for coach in &mut sides {
            if coach.conscious_active().is_err()
                && let Some(first) = coach.first_alive()
            {
                coach.switch_to(first)?;
            }
        }

        // Ties go to player one
        let first = if sides[0].active()?.speed() >= sides[1].active()?.speed() {
            PlayerSlot::P1
        } else {
            PlayerSlot::P2
        };

        self.mode = mode;
        self.sides = sides;
        self.catalog = catalog;
        self.current = first;
        self.turn = 1;
        self.phase = ArenaPhase::InProgress;
        self.timer.reset();

        for player in PlayerSlot::BOTH {
            let coach = self.side(player);
            let event = BattleEvent::Player {
                player,
                name: coach.name.clone(),
                color: coach.color.clone(),
            };
            self.emit(event);
        }
        self.emit(BattleEvent::Start);
        for player in PlayerSlot::BOTH {
            self.emit_switch(player);
        }

        tracing::info!(
            target: "coliseum::arena",
            mode = %mode,
            first = %first,
            "Battle started"
        );
        self.emit(BattleEvent::Turn(self.turn));
        Ok(())
    }

    // Commands

    /// Use the active combatant's attack called `move_name`
    ///
    /// With `target_self` the attack lands on the attacker itself.
    pub fn attack(
        &mut self,
        move_name: &str,
        target_self: bool,
        player: PlayerSlot,
    ) -> Result<(), BattleError> {
        self.ensure_turn(player)?;

        let attacker = self.side(player).conscious_active()?;
        let slot = attacker
            .find_attack(move_name)
            .ok_or_else(|| BattleError::UnknownAttack(move_name.to_string()))?;
        let attack_name = attacker.attacks()[slot].name.clone();
        let source = CombatantRef::new(player, attacker.name.as_str());

        let target_slot = if target_self {
            player
        } else {
            let defender = self.side(player.opponent()).active()?;
            if defender.is_fainted() {
                return Err(BattleError::TargetFainted(defender.name.clone()));
            }
            player.opponent()
        };
        let target = CombatantRef::new(target_slot, self.side(target_slot).active()?.name.as_str());

        let attempt = self.sides[player.index()]
            .active_mut()?
            .attempt_attack(self.rng.as_mut());
        for code in &attempt.cleared {
            self.emit(BattleEvent::CureStatus {
                target: source.clone(),
                status: status_label(*code),
            });
        }
        if let Some(code) = attempt.blocked_by {
            self.emit(BattleEvent::Cant {
                combatant: source,
                reason: status_label(code),
            });
            self.finish_action(player);
            return Ok(());
        }

        let strike = {
            let (mine, theirs) = pair_mut(&mut self.sides, player);
            let attacker = mine.active_mut()?;
            let target = if target_self {
                Target::SelfTarget
            } else {
                Target::Opponent(theirs.active_mut()?)
            };
            attack::resolve(attacker, slot, target, self.rng.as_mut())?
        };

        match strike.outcome {
            StrikeOutcome::NoPp => self.emit(BattleEvent::Cant {
                combatant: source,
                reason: "nopp".to_string(),
            }),
            StrikeOutcome::Missed => self.emit(BattleEvent::Move {
                source,
                move_name: attack_name,
                target,
                miss: true,
            }),
            StrikeOutcome::Hit => {
                self.emit(BattleEvent::Move {
                    source: source.clone(),
                    move_name: attack_name,
                    target: target.clone(),
                    miss: false,
                });

                if strike.effectiveness == 0.0 {
                    self.emit(BattleEvent::Immune(target.clone()));
                } else if strike.effectiveness > 1.0 {
                    self.emit(BattleEvent::SuperEffective(target.clone()));
                } else if strike.effectiveness < 1.0 {
                    self.emit(BattleEvent::Resisted(target.clone()));
                }
                if strike.damage > 0 {
                    self.emit_damage(target_slot, None);
                }
                if let Some(boost) = strike.boosted {
                    self.emit(BattleEvent::Boost {
                        target: source,
                        stat: boost.stat.as_protocol().to_string(),
                        amount: boost.amount,
                    });
                }
                if let Some(code) = strike.inflicted {
                    self.emit(BattleEvent::Status {
                        target: target.clone(),
                        status: status_label(code),
                    });
                }
                if strike.damage > 0 && self.side(target_slot).active()?.is_fainted() {
                    self.emit_faint(target);
                }
            }
        }

        self.finish_action(player);
        Ok(())
    }

    /// Use an item on the active combatant
    pub fn use_item(&mut self, item_name: &str, player: PlayerSlot) -> Result<(), BattleError> {
        self.apply_item(item_name, None, player)
    }

    /// Use an item on the roster member at `index` (revives need this)
    pub fn use_item_on(
        &mut self,
        item_name: &str,
        index: usize,
        player: PlayerSlot,
    ) -> Result<(), BattleError> {
        self.apply_item(item_name, Some(index), player)
    }

    fn apply_item(
        &mut self,
        item_name: &str,
        index: Option<usize>,
        player: PlayerSlot,
    ) -> Result<(), BattleError> {
        self.ensure_turn(player)?;
        self.side(player).conscious_active()?;

        let (index, item, effect) = self.sides[player.index()].use_item(item_name, index)?;
        let combatant = &self.side(player).roster()[index];
        let target = CombatantRef::new(player, combatant.name.as_str());
        let (hp, max_hp) = (combatant.hp(), combatant.max_hp());

        self.emit(BattleEvent::UseItem {
            target: target.clone(),
            item: item.name.clone(),
        });
        match effect {
            ItemEffect::Healed(_) | ItemEffect::Revived(_) => self.emit(BattleEvent::Heal {
                target,
                hp,
                max_hp,
                source: Some(format!("item: {}", item.name)),
            }),
            ItemEffect::Boosted { stat, amount } => self.emit(BattleEvent::Boost {
                target,
                stat: stat.as_protocol().to_string(),
                amount,
            }),
            ItemEffect::Cured(codes) => {
                for code in codes {
                    self.emit(BattleEvent::CureStatus {
                        target: target.clone(),
                        status: status_label(code),
                    });
                }
            }
        }

        self.finish_action(player);
        Ok(())
    }

    /// Bring in the roster member at `index`
    ///
    /// Replacing a fainted active combatant is accepted out of turn and does
    /// not use up the turn.
    pub fn switch_active(&mut self, index: usize, player: PlayerSlot) -> Result<(), BattleError> {
        if self.phase != ArenaPhase::InProgress {
            return Err(BattleError::NotInProgress);
        }
        let forced = self.side(player).conscious_active().is_err();
        if !forced {
            self.ensure_turn(player)?;
        }

        let coach = &mut self.sides[player.index()];
        if forced {
            coach.switch_to(index)?;
        } else {
            coach.switch_voluntarily(index)?;
        }
        self.emit_switch(player);

        if !forced {
            self.finish_action(player);
        }
        Ok(())
    }

    /// Forfeit; accepted out of turn and while paused
    pub fn flee(&mut self, player: PlayerSlot) -> Result<(), BattleError> {
        if !matches!(self.phase, ArenaPhase::InProgress | ArenaPhase::Paused) {
            return Err(BattleError::NotInProgress);
        }

        self.sides[player.index()].forfeit();
        self.emit(BattleEvent::Flee(player));
        tracing::info!(target: "coliseum::arena", player = %player, "Coach fled");
        self.finish(BattleResult::Winner(player.opponent()));
        Ok(())
    }

    /// Route a parsed wire command
    pub fn dispatch(&mut self, message: &CommandMessage) -> Result<(), BattleError> {
        let player = message.player;
        match &message.command {
            Command::Attack {
                move_name,
                target_self,
            } => self.attack(move_name, *target_self, player),
            Command::UseItem { item, target: None } => self.use_item(item, player),
            Command::UseItem {
                item,
                target: Some(index),
            } => self.use_item_on(item, *index, player),
            Command::Switch(index) => self.switch_active(*index, player),
            Command::Flee => self.flee(player),
        }
    }

    // Timer

    /// The current coach ran out of time: apply the penalty and flip the turn
    pub fn expire_turn(&mut self) -> Result<(), BattleError> {
        if self.phase != ArenaPhase::InProgress {
            return Err(BattleError::NotInProgress);
        }
        let player = self.current;
        self.sides[player.index()].on_turn_timeout();
        self.emit(BattleEvent::Timeout(player));
        tracing::info!(target: "coliseum::arena", player = %player, "Turn timer expired");

        self.advance_turn(player);
        Ok(())
    }

    /// Stop the clock, recording how much of the turn was used
    pub fn pause(&mut self, elapsed: Duration) -> Result<(), BattleError> {
        if self.phase != ArenaPhase::InProgress {
            return Err(BattleError::NotInProgress);
        }
        self.timer.pause(elapsed);
        self.phase = ArenaPhase::Paused;
        self.emit(BattleEvent::Pause);
        Ok(())
    }

    /// Continue a paused battle; returns the remaining turn budget
    pub fn resume(&mut self) -> Result<Duration, BattleError> {
        if self.phase != ArenaPhase::Paused {
            return Err(BattleError::NotInProgress);
        }
        self.phase = ArenaPhase::InProgress;
        self.emit(BattleEvent::Resume);
        Ok(self.timer.remaining())
    }

    // Automated play

    /// Let the current coach's policy act
    ///
    /// Never fails: a rejected decision falls back to the first usable move,
    /// then a switch, then passing the turn. Returns whether the battle moved
    /// on; `false` when the current coach is human or the battle is not in
    /// progress.
    pub fn run_automated_turn(&mut self) -> bool {
        if self.phase != ArenaPhase::InProgress {
            return false;
        }
        let player = self.current;
        if !self.side(player).is_automated() {
            return false;
        }
        let before = self.turn;

        if self.side(player).conscious_active().is_err() {
            self.replace_active(player);
        }

        let decision = {
            let (mine, theirs) = pair_mut(&mut self.sides, player);
            let opponent = theirs.active().ok().filter(|c| !c.is_fainted());
            mine.decide(player, opponent, self.rng.as_mut())
        };
        let Some(decision) = decision else {
            return false;
        };

        if let Err(e) = self.execute(player, decision) {
            tracing::warn!(
                target: "coliseum::arena",
                player = %player,
                decision = ?decision,
                error = %e,
                "Automated action rejected, falling back"
            );
            self.fallback(player);
        }

        self.turn != before || self.phase == ArenaPhase::Finished
    }

    fn execute(&mut self, player: PlayerSlot, decision: Decision) -> Result<(), BattleError> {
        match decision {
            Decision::Attack { slot } => {
                let name = self
                    .side(player)
                    .active()?
                    .attack(slot)
                    .map(|a| a.name.clone())
                    .ok_or_else(|| BattleError::UnknownAttack(format!("slot {}", slot + 1)))?;
                self.attack(&name, false, player)
            }
            Decision::UseItem { index } => {
                let name = self
                    .side(player)
                    .inventory()
                    .get(index)
                    .map(|i| i.name.clone())
                    .ok_or_else(|| BattleError::UnknownItem(format!("#{}", index + 1)))?;
                self.use_item(&name, player)
            }
            Decision::Switch { index } => self.switch_active(index, player),
            Decision::Wait => self.pass_turn(player),
        }
    }

    fn fallback(&mut self, player: PlayerSlot) {
        let coach = self.side(player);
        let first_move = coach
            .active()
            .ok()
            .and_then(|c| c.usable_attacks().next().map(|(_, a)| a.name.clone()));
        let active = coach.active_index();
        let first_bench = coach
            .roster()
            .iter()
            .enumerate()
            .position(|(i, c)| i != active && !c.is_fainted());

        if let Some(name) = first_move
            && self.attack(&name, false, player).is_ok()
        {
            return;
        }
        if let Some(index) = first_bench
            && self.switch_active(index, player).is_ok()
        {
            return;
        }
        if let Err(e) = self.pass_turn(player) {
            tracing::error!(
                target: "coliseum::arena",
                player = %player,
                error = %e,
                "Automated coach could not pass its turn"
            );
        }
    }

    fn pass_turn(&mut self, player: PlayerSlot) -> Result<(), BattleError> {
        self.ensure_turn(player)?;
        self.finish_action(player);
        Ok(())
    }

    /// Swap in an automated coach's pick for its fainted active combatant
    fn replace_active(&mut self, player: PlayerSlot) {
        let picked = {
            let (mine, theirs) = pair_mut(&mut self.sides, player);
            if !mine.is_automated() || mine.is_defeated() {
                return;
            }
            let opponent = theirs.active().ok().filter(|c| !c.is_fainted());
            mine.select_replacement(player, opponent, self.rng.as_mut())
        };

        if let Some(index) = picked
            && self.sides[player.index()].switch_to(index).is_ok()
        {
            self.emit_switch(player);
        }
    }

    /// Replace the policy of an automated coach
    pub fn replace_policy(
        &mut self,
        player: PlayerSlot,
        policy: Box<dyn DecisionPolicy>,
    ) -> Result<(), BattleError> {
        let coach = &mut self.sides[player.index()];
        if !coach.is_automated() {
            return Err(BattleError::InvalidSetup(format!(
                "{} is controlled by a human",
                coach.name
            )));
        }
        coach.set_controller(Controller::Automated(policy));
        Ok(())
    }

    // Bookkeeping

    fn ensure_turn(&self, player: PlayerSlot) -> Result<(), BattleError> {
        if self.phase != ArenaPhase::InProgress {
            return Err(BattleError::NotInProgress);
        }
        if self.current != player {
            return Err(BattleError::NotYourTurn(player));
        }
        Ok(())
    }

    fn finish_action(&mut self, player: PlayerSlot) {
        self.tick_status(player);
        if self.settle_outcome() {
            return;
        }
        for side in PlayerSlot::BOTH {
            if self.side(side).conscious_active().is_err() {
                self.replace_active(side);
            }
        }
        self.advance_turn(player);
    }

    fn tick_status(&mut self, player: PlayerSlot) {
        let report = match self.sides[player.index()].active_mut() {
            Ok(active) => active.tick_status(self.rng.as_mut()),
            Err(_) => return,
        };

        let Ok(active) = self.side(player).active() else {
            return;
        };
        let target = CombatantRef::new(player, active.name.as_str());
        let fainted = active.is_fainted();
        let damaged = report.damage.iter().any(|(_, amount)| *amount > 0);

        for (code, amount) in report.damage {
            if amount > 0 {
                self.emit_damage(player, Some(status_label(code)));
            }
        }
        for code in report.cleared {
            self.emit(BattleEvent::CureStatus {
                target: target.clone(),
                status: status_label(code),
            });
        }
        if fainted && damaged {
            self.emit_faint(target);
        }
    }

    /// Win check; returns whether the battle ended
    fn settle_outcome(&mut self) -> bool {
        let p1_down = self.sides[0].is_defeated();
        let p2_down = self.sides[1].is_defeated();

        match (p1_down, p2_down) {
            (false, false) => false,
            (false, true) if self.mode == BattleMode::SurvivalRandom => self.next_challenger(),
            (false, true) => {
                self.finish(BattleResult::Winner(PlayerSlot::P1));
                true
            }
            (true, false) => {
                self.finish(BattleResult::Winner(PlayerSlot::P2));
                true
            }
            (true, true) => {
                self.finish(BattleResult::Draw);
                true
            }
        }
    }

    /// Survival mode: score a point and field a fresh random opponent
    fn next_challenger(&mut self) -> bool {
        self.sides[0].add_point();
        let size = self.sides[0].roster().len();

        let roster = match self.catalog {
            Some(catalog) => catalog.random_roster(size, self.rng.as_mut()),
            None => Err(BattleError::InvalidSetup("survival mode without catalog".into())),
        };
        match roster {
            Ok(roster) => {
                self.sides[1].replace_roster(roster);
                tracing::info!(
                    target: "coliseum::arena",
                    score = self.sides[0].score(),
                    "Survival opponent defeated"
                );
                self.emit_switch(PlayerSlot::P2);
                false
            }
            Err(e) => {
                tracing::error!(target: "coliseum::arena", error = %e, "Cannot generate opponent");
                self.finish(BattleResult::Winner(PlayerSlot::P1));
                true
            }
        }
    }

    fn advance_turn(&mut self, player: PlayerSlot) {
        self.sides[player.index()].record_turn();
        self.current = player.opponent();
        self.turn += 1;

        if self.turn > self.config.max_turns {
            tracing::info!(
                target: "coliseum::arena",
                max_turns = self.config.max_turns,
                "Turn limit reached"
            );
            self.finish(BattleResult::Draw);
            return;
        }

        self.timer.reset();
        self.emit(BattleEvent::Turn(self.turn));
    }

    fn finish(&mut self, result: BattleResult) {
        self.phase = ArenaPhase::Finished;
        self.result = Some(result);

        match result {
            BattleResult::Winner(player) => {
                tracing::info!(target: "coliseum::arena", winner = %player, turn = self.turn, "Battle finished");
                self.emit(BattleEvent::Win(player));
            }
            BattleResult::Draw => {
                tracing::info!(target: "coliseum::arena", turn = self.turn, "Battle finished in a draw");
                self.emit(BattleEvent::Tie);
            }
        }
    }

    fn emit(&mut self, event: BattleEvent) {
        tracing::debug!(target: "coliseum::arena", event = %event);
        self.log.push(event);
    }

    fn emit_switch(&mut self, player: PlayerSlot) {
        let Ok(active) = self.side(player).active() else {
            return;
        };
        let event = BattleEvent::Switch {
            combatant: CombatantRef::new(player, active.name.as_str()),
            species: active.species.clone(),
            hp: active.hp(),
            max_hp: active.max_hp(),
        };
        self.emit(event);
    }

    fn emit_damage(&mut self, player: PlayerSlot, source: Option<String>) {
        let Ok(active) = self.side(player).active() else {
            return;
        };
        let event = BattleEvent::Damage {
            target: CombatantRef::new(player, active.name.as_str()),
            hp: active.hp(),
            max_hp: active.max_hp(),
            source,
        };
        self.emit(event);
    }

    fn emit_faint(&mut self, target: CombatantRef) {
        tracing::info!(target: "coliseum::arena", combatant = %target, "Combatant fainted");
        self.emit(BattleEvent::Faint(target));
    }

    // Queries

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn mode(&self) -> BattleMode {
        self.mode
    }

    pub fn phase(&self) -> ArenaPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == ArenaPhase::Finished
    }

    pub fn side(&self, player: PlayerSlot) -> &Coach {
        &self.sides[player.index()]
    }

    /// Whose turn it is
    pub fn current_turn(&self) -> PlayerSlot {
        self.current
    }

    pub fn turn_number(&self) -> u32 {
        self.turn
    }

    pub fn result(&self) -> Option<BattleResult> {
        self.result
    }

    pub fn winner(&self) -> Option<PlayerSlot> {
        match self.result {
            Some(BattleResult::Winner(player)) => Some(player),
            _ => None,
        }
    }

    pub fn log(&self) -> &[BattleEvent] {
        &self.log
    }

    /// Events appended since `cursor` (an earlier log length)
    pub fn events_since(&self, cursor: usize) -> &[BattleEvent] {
        self.log.get(cursor..).unwrap_or(&[])
    }

    pub fn turn_budget(&self) -> Duration {
        self.timer.budget()
    }

    pub fn remaining_turn_time(&self) -> Duration {
        self.timer.remaining()
    }

    pub fn active_summary(&self, player: PlayerSlot) -> Result<ActiveSummary, BattleError> {
        let active = self.side(player).active()?;
        Ok(ActiveSummary {
            name: active.name.clone(),
            kind: active.kind,
            hp: active.hp(),
            max_hp: active.max_hp(),
            status: active.status(),
            moves: active
                .attacks()
                .iter()
                .map(|a| MoveSummary {
                    name: a.name.clone(),
                    pp: a.pp,
                    max_pp: a.max_pp,
                })
                .collect(),
        })
    }

    pub fn alive_names(&self, player: PlayerSlot) -> Vec<String> {
        self.side(player).alive_names()
    }

    pub fn fainted_names(&self, player: PlayerSlot) -> Vec<String> {
        self.side(player).fainted_names()
    }

    pub fn item_names(&self, player: PlayerSlot) -> Vec<String> {
        self.side(player).item_names()
    }

    pub fn name(&self, player: PlayerSlot) -> &str {
        &self.side(player).name
    }

    pub fn color(&self, player: PlayerSlot) -> &str {
        &self.side(player).color
    }

    pub fn score(&self, player: PlayerSlot) -> u32 {
        self.side(player).score()
    }
}
