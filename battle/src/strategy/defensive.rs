//! Cautious strategy: protect HP, retreat early

use rand::RngCore;

use super::{
    BattleView, DEFENSE_STATS, DecisionPolicy, StrategyKind, best_effectiveness_move,
    best_status_move, pick_best,
};
use crate::query::has_advantage;

const STATUS_MOVE_HP_THRESHOLD: f32 = 0.40;
const SWITCH_HP_THRESHOLD: f32 = 0.30;
const ITEM_HP_THRESHOLD: f32 = 0.40;

#[derive(Debug, Clone, Copy, Default)]
pub struct DefensivePolicy;

impl DecisionPolicy for DefensivePolicy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Defensive
    }

    fn select_move(&mut self, view: &BattleView<'_>, rng: &mut dyn RngCore) -> Option<usize> {
        if view.hp_ratio() < STATUS_MOVE_HP_THRESHOLD
            && let Some(slot) = best_status_move(view, rng)
        {
            return Some(slot);
        }
        best_effectiveness_move(view, rng)
    }

    fn select_best_pokemon(
        &mut self,
        view: &BattleView<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        let candidates = view
            .bench()
            .into_iter()
            .map(|(i, c)| (i, c.hp() as f32 * c.stats().defense as f32));
        pick_best(candidates, rng)
    }

    fn should_switch(&mut self, view: &BattleView<'_>, _rng: &mut dyn RngCore) -> bool {
        let (Some(active), Some(opponent)) = (view.active(), view.opponent) else {
            return false;
        };
        view.hp_ratio() < SWITCH_HP_THRESHOLD || has_advantage(opponent.kind, active.kind)
    }

    fn should_use_item(&mut self, view: &BattleView<'_>, _rng: &mut dyn RngCore) -> bool {
        view.hp_ratio() < ITEM_HP_THRESHOLD
    }

    fn select_item(&mut self, view: &BattleView<'_>, _rng: &mut dyn RngCore) -> Option<usize> {
        view.healing_item()
            .or_else(|| view.booster_item(&DEFENSE_STATS))
    }
}
