//! Matchup-driven strategy that rotates its roster

use rand::RngCore;

use super::{
    BattleView, DEFENSE_STATS, DecisionPolicy, StrategyKind, best_effectiveness_move,
    best_status_move, offense_stats, pick_best,
};
use crate::query::matchup_score;

/// A bench member must beat the current matchup by this factor
const SWITCH_MARGIN: f32 = 1.5;
const ITEM_HP_THRESHOLD: f32 = 0.40;

/// Switches whenever the bench holds a clearly better matchup and mixes in
/// status moves every other turn
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangingPolicy;

impl ChangingPolicy {
    fn item_choice(view: &BattleView<'_>) -> Option<usize> {
        if view.hp_ratio() < ITEM_HP_THRESHOLD {
            return view.healing_item();
        }

        let active = view.active()?;
        let opponent = view.opponent?;
        if matchup_score(active.kind, opponent.kind) >= 1.0 {
            view.booster_item(&offense_stats(active))
        } else {
            view.booster_item(&DEFENSE_STATS)
        }
    }
}

impl DecisionPolicy for ChangingPolicy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Changing
    }

    fn select_move(&mut self, view: &BattleView<'_>, rng: &mut dyn RngCore) -> Option<usize> {
        if view.turn % 2 == 1
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
        let bench = view.bench();
        match view.opponent {
            Some(opponent) => pick_best(
                bench
                    .iter()
                    .map(|(i, c)| (*i, matchup_score(c.kind, opponent.kind))),
                rng,
            ),
            None => pick_best(bench.iter().map(|(i, c)| (*i, c.hp_ratio())), rng),
        }
    }

    fn should_switch(&mut self, view: &BattleView<'_>, _rng: &mut dyn RngCore) -> bool {
        let (Some(active), Some(opponent)) = (view.active(), view.opponent) else {
            return false;
        };
        let current = matchup_score(active.kind, opponent.kind);

        // Strictly better as well, or an immune matchup (score 0) would
        // bounce between equally bad members forever
        view.bench().iter().any(|(_, c)| {
            let score = matchup_score(c.kind, opponent.kind);
            score >= current * SWITCH_MARGIN && score > current
        })
    }

    fn should_use_item(&mut self, view: &BattleView<'_>, _rng: &mut dyn RngCore) -> bool {
        Self::item_choice(view).is_some()
    }

    fn select_item(&mut self, view: &BattleView<'_>, _rng: &mut dyn RngCore) -> Option<usize> {
        Self::item_choice(view)
    }
}
