//! Weighted scoring across power, accuracy, PP and matchups

use rand::RngCore;

use super::{BattleView, DecisionPolicy, StrategyKind, best_status_move, move_effectiveness, offense_stats, pick_best};
use crate::attack::{Attack, Category};
use crate::combatant::Combatant;
use crate::query::is_disadvantaged;
use crate::types::effectiveness;

/// Turns during which setup moves and boosters are preferred
const SETUP_TURNS: u32 = 2;
/// Bonus for attacks that read the attacker's stronger offensive stat
const STAT_ALIGNMENT_BONUS: f32 = 1.2;
const PP_WEIGHT: f32 = 0.2;
const INCOMING_FLOOR: f32 = 0.25;

const CRITICAL_HP: f32 = 0.25;
const DISADVANTAGED_HP: f32 = 0.50;
const EMERGENCY_HEAL_HP: f32 = 0.30;
const TOP_UP_HP: f32 = 0.70;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpertPolicy;

fn move_score(attacker: &Combatant, attack: &Attack, opponent: Option<&Combatant>) -> f32 {
    if attack.is_status() {
        return 0.0;
    }

    let stats = attacker.stats();
    let aligned = match attack.category {
        Category::Physical => stats.attack >= stats.special_attack,
        Category::Special => stats.special_attack > stats.attack,
        Category::Status => false,
    };

    let mut score = move_effectiveness(attack, opponent)
        * attack.power as f32
        * (f32::from(attack.accuracy) / 100.0)
        * (1.0 + PP_WEIGHT * attack.pp_ratio());
    if aligned {
        score *= STAT_ALIGNMENT_BONUS;
    }
    score
}

fn replacement_score(candidate: &Combatant, opponent: Option<&Combatant>) -> f32 {
    let Some(opponent) = opponent else {
        return candidate.hp_ratio();
    };
    let outgoing = effectiveness(candidate.kind, opponent.kind);
    let incoming = effectiveness(opponent.kind, candidate.kind).max(INCOMING_FLOOR);
    candidate.hp_ratio() * outgoing / incoming
}

impl ExpertPolicy {
    fn item_choice(view: &BattleView<'_>) -> Option<usize> {
        let hp = view.hp_ratio();
        if hp < EMERGENCY_HEAL_HP
            && let Some(index) = view.healing_item()
        {
            return Some(index);
        }
        if view.turn < SETUP_TURNS
            && let Some(active) = view.active()
            && let Some(index) = view.booster_item(&offense_stats(active))
        {
            return Some(index);
        }
        if hp < TOP_UP_HP {
            return view.healing_item();
        }
        None
    }
}

impl DecisionPolicy for ExpertPolicy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Expert
    }

    fn select_move(&mut self, view: &BattleView<'_>, rng: &mut dyn RngCore) -> Option<usize> {
        let active = view.active()?;
        if view.turn < SETUP_TURNS
            && let Some(slot) = best_status_move(view, rng)
        {
            return Some(slot);
        }

        let scored: Vec<(usize, f32)> = view
            .usable_moves()
            .into_iter()
            .map(|(slot, attack)| (slot, move_score(active, attack, view.opponent)))
            .collect();
        pick_best(scored, rng)
    }

    fn select_best_pokemon(
        &mut self,
        view: &BattleView<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        let candidates = view
            .bench()
            .into_iter()
            .map(|(i, c)| (i, replacement_score(c, view.opponent)));
        pick_best(candidates, rng)
    }

    fn should_switch(&mut self, view: &BattleView<'_>, _rng: &mut dyn RngCore) -> bool {
        let (Some(active), Some(opponent)) = (view.active(), view.opponent) else {
            return false;
        };
        let hp = view.hp_ratio();
        (is_disadvantaged(active.kind, opponent.kind) && hp < DISADVANTAGED_HP) || hp < CRITICAL_HP
    }

    fn should_use_item(&mut self, view: &BattleView<'_>, _rng: &mut dyn RngCore) -> bool {
        Self::item_choice(view).is_some()
    }

    fn select_item(&mut self, view: &BattleView<'_>, _rng: &mut dyn RngCore) -> Option<usize> {
        Self::item_choice(view)
    }
}
