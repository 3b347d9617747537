//! Status effects as an ordered modifier chain
//!
//! A combatant carries a list of active [`StatusEffect`]s. Reads of its stats
//! fold every effect over the base stat block, attack attempts pass through
//! each effect's gate in order, and end-of-action ticks let effects deal
//! damage or wear off. Effects own only their own counters; HP lives on the
//! combatant.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::types::{Stats, StatusCode};

/// Chance that paralysis nullifies an attack attempt
pub const PARALYSIS_FAIL_CHANCE: f64 = 0.25;

/// Chance to thaw, rolled on every attempt and every tick
pub const FREEZE_THAW_CHANCE: f64 = 0.20;

/// Poison escalation stops growing after this many ticks
pub const POISON_ESCALATION_CAP: u8 = 8;

/// One active status effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "lowercase")]
pub enum StatusEffect {
    Paralysis,
    Sleep { turns_remaining: u8 },
    Burn,
    Freeze,
    Poison { turns_elapsed: u8 },
}

impl StatusEffect {
    /// Sleep lasting 1 to 3 attempts
    pub fn sleep(rng: &mut dyn RngCore) -> Self {
        StatusEffect::Sleep {
            turns_remaining: rng.gen_range(1..=3),
        }
    }

    /// Build a fresh effect for a status code (`None` for `Normal`)
    pub fn from_code(code: StatusCode, rng: &mut dyn RngCore) -> Option<Self> {
        match code {
            StatusCode::Normal => None,
            StatusCode::Paralyzed => Some(StatusEffect::Paralysis),
            StatusCode::Asleep => Some(StatusEffect::sleep(rng)),
            StatusCode::Burned => Some(StatusEffect::Burn),
            StatusCode::Frozen => Some(StatusEffect::Freeze),
            StatusCode::Poisoned => Some(StatusEffect::Poison { turns_elapsed: 0 }),
        }
    }

    pub fn code(&self) -> StatusCode {
        match self {
            StatusEffect::Paralysis => StatusCode::Paralyzed,
            StatusEffect::Sleep { .. } => StatusCode::Asleep,
            StatusEffect::Burn => StatusCode::Burned,
            StatusEffect::Freeze => StatusCode::Frozen,
            StatusEffect::Poison { .. } => StatusCode::Poisoned,
        }
    }

    /// Effect-specific counter (sleep turns remaining, poison turns elapsed)
    pub fn counter(&self) -> u8 {
        match self {
            StatusEffect::Sleep { turns_remaining } => *turns_remaining,
            StatusEffect::Poison { turns_elapsed } => *turns_elapsed,
            _ => 0,
        }
    }

    fn modify(&self, stats: &mut Stats) {
        match self {
            StatusEffect::Paralysis => stats.speed /= 2,
            StatusEffect::Burn => stats.attack /= 2,
            _ => {}
        }
    }
}

/// Damage dealt by a burn tick
pub fn burn_damage(max_hp: u32) -> u32 {
    (max_hp / 16).max(1)
}

/// Damage dealt by a poison tick after `turns_elapsed` previous ticks
pub fn poison_damage(max_hp: u32, turns_elapsed: u8) -> u32 {
    let steps = u32::from(turns_elapsed.min(POISON_ESCALATION_CAP));
    (max_hp / 8).max(1) + steps * (max_hp / 32)
}

/// Result of passing an attack attempt through the chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptOutcome {
    /// Effect that stopped the attempt, if any
    pub blocked_by: Option<StatusCode>,
    /// Effects that wore off during the attempt (waking, thawing)
    pub cleared: Vec<StatusCode>,
}

impl AttemptOutcome {
    pub fn proceeds(&self) -> bool {
        self.blocked_by.is_none()
    }
}

/// Result of an end-of-action tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Damage each effect wants to deal, in chain order
    pub damage: Vec<(StatusCode, u32)>,
    pub cleared: Vec<StatusCode>,
}

/// Ordered list of active effects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectChain {
    effects: Vec<StatusEffect>,
}

impl EffectChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn contains(&self, code: StatusCode) -> bool {
        self.effects.iter().any(|e| e.code() == code)
    }

    /// Add an effect; re-applying one that is already active does nothing
    pub fn push(&mut self, effect: StatusEffect) -> bool {
        if self.contains(effect.code()) {
            return false;
        }
        self.effects.push(effect);
        true
    }

    /// Remove every effect, returning the codes that were cleared
    pub fn clear(&mut self) -> Vec<StatusCode> {
        self.effects.drain(..).map(|e| e.code()).collect()
    }

    /// Code of the most recently applied effect still active
    pub fn status(&self) -> StatusCode {
        self.effects
            .last()
            .map(StatusEffect::code)
            .unwrap_or_default()
    }

    /// Counter of the most recently applied effect still active
    pub fn status_turns(&self) -> u8 {
        self.effects.last().map(StatusEffect::counter).unwrap_or(0)
    }

    /// Fold every effect over a base stat block
    pub fn apply(&self, base: Stats) -> Stats {
        self.effects.iter().fold(base, |mut stats, effect| {
            effect.modify(&mut stats);
            stats
        })
    }

    /// Gate an attack attempt
    ///
    /// Effects are consulted in application order and the first one that
    /// blocks ends the check. Sleep decrements before deciding, so the attempt
    /// that brings the counter to zero still fails. A thaw clears freeze and
    /// lets the attempt continue.
    pub fn attempt(&mut self, rng: &mut dyn RngCore) -> AttemptOutcome {
        let mut outcome = AttemptOutcome::default();
        let mut index = 0;

        while index < self.effects.len() {
            let mut remove = false;

            match &mut self.effects[index] {
                StatusEffect::Paralysis => {
                    if rng.gen_bool(PARALYSIS_FAIL_CHANCE) {
                        outcome.blocked_by = Some(StatusCode::Paralyzed);
                    }
                }
                StatusEffect::Sleep { turns_remaining } => {
                    if *turns_remaining > 0 {
                        *turns_remaining -= 1;
                        outcome.blocked_by = Some(StatusCode::Asleep);
                    }
                    remove = *turns_remaining == 0;
                }
                StatusEffect::Freeze => {
                    if rng.gen_bool(FREEZE_THAW_CHANCE) {
                        remove = true;
                    } else {
                        outcome.blocked_by = Some(StatusCode::Frozen);
                    }
                }
                StatusEffect::Burn | StatusEffect::Poison { .. } => {}
            }

            if remove {
                let effect = self.effects.remove(index);
                outcome.cleared.push(effect.code());
            } else {
                index += 1;
            }

            if outcome.blocked_by.is_some() {
                break;
            }
        }

        outcome
    }

    /// End-of-action tick for a combatant with `max_hp` total HP
    pub fn tick(&mut self, max_hp: u32, rng: &mut dyn RngCore) -> TickReport {
        let mut report = TickReport::default();

        self.effects.retain_mut(|effect| match effect {
            StatusEffect::Burn => {
                report.damage.push((StatusCode::Burned, burn_damage(max_hp)));
                true
            }
            StatusEffect::Poison { turns_elapsed } => {
                report
                    .damage
                    .push((StatusCode::Poisoned, poison_damage(max_hp, *turns_elapsed)));
                *turns_elapsed = turns_elapsed.saturating_add(1);
                true
            }
            StatusEffect::Freeze => {
                if rng.gen_bool(FREEZE_THAW_CHANCE) {
                    report.cleared.push(StatusCode::Frozen);
                    false
                } else {
                    true
                }
            }
            StatusEffect::Paralysis | StatusEffect::Sleep { .. } => true,
        });

        report
    }
}
