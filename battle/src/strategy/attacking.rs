//! Aggressive strategy: raw damage first

use rand::RngCore;

use super::{BattleView, DecisionPolicy, StrategyKind, move_effectiveness, offense_stats, pick_best};
use crate::query::is_disadvantaged;

const ITEM_HP_THRESHOLD: f32 = 0.30;

/// Maximizes power × effectiveness and only retreats from a clear type
/// disadvantage
#[derive(Debug, Clone, Copy, Default)]
pub struct AttackingPolicy;

impl DecisionPolicy for AttackingPolicy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Attacking
    }

    fn select_move(&mut self, view: &BattleView<'_>, rng: &mut dyn RngCore) -> Option<usize> {
        let moves = view.usable_moves();
        let damaging = moves
            .iter()
            .filter(|(_, a)| !a.is_status())
            .map(|(slot, a)| (*slot, a.power as f32 * move_effectiveness(a, view.opponent)));

        pick_best(damaging, rng)
            .or_else(|| pick_best(moves.iter().map(|(slot, _)| (*slot, 0.0)), rng))
    }

    fn select_best_pokemon(
        &mut self,
        view: &BattleView<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        let candidates = view.bench().into_iter().map(|(i, c)| {
            let stats = c.stats();
            (i, stats.attack as f32 * stats.speed as f32)
        });
        pick_best(candidates, rng)
    }

    fn should_switch(&mut self, view: &BattleView<'_>, _rng: &mut dyn RngCore) -> bool {
        match (view.active(), view.opponent) {
            (Some(active), Some(opponent)) => is_disadvantaged(active.kind, opponent.kind),
            _ => false,
        }
    }

    fn should_use_item(&mut self, view: &BattleView<'_>, _rng: &mut dyn RngCore) -> bool {
        view.hp_ratio() < ITEM_HP_THRESHOLD
    }

    fn select_item(&mut self, view: &BattleView<'_>, _rng: &mut dyn RngCore) -> Option<usize> {
        let active = view.active()?;
        view.booster_item(&offense_stats(active))
            .or_else(|| view.healing_item())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;
    use crate::strategy::Decision;
    use crate::strategy::tests::{assert_always_legal, bag, ember, fighter, harden, surf, tackle, view};
    use crate::types::ElementType;

    #[test]
    fn test_always_legal() {
        assert_always_legal(StrategyKind::Attacking);
    }

    #[test]
    fn test_prefers_super_effective_power() {
        let roster = vec![fighter("Lead", ElementType::Water, vec![tackle(), surf(), harden()])];
        let foe = fighter("Foe", ElementType::Fire, vec![ember()]);
        let mut rng = seeded(1);

        let slot = AttackingPolicy.select_move(&view(&roster, &[], Some(&foe), 0), rng.as_mut());
        assert_eq!(slot, Some(1));
    }

    #[test]
    fn test_skips_status_moves() {
        let roster = vec![fighter("Lead", ElementType::Normal, vec![harden(), tackle()])];
        let foe = fighter("Foe", ElementType::Rock, vec![tackle()]);
        let mut rng = seeded(1);

        // Tackle is resisted by Rock but still beats a status move
        let slot = AttackingPolicy.select_move(&view(&roster, &[], Some(&foe), 0), rng.as_mut());
        assert_eq!(slot, Some(1));
    }

    #[test]
    fn test_switches_only_on_disadvantage() {
        let roster = vec![
            fighter("Lead", ElementType::Fire, vec![ember()]),
            fighter("Back", ElementType::Water, vec![surf()]),
        ];
        let water_foe = fighter("Foe", ElementType::Water, vec![surf()]);
        let normal_foe = fighter("Foe", ElementType::Normal, vec![tackle()]);
        let mut rng = seeded(1);

        let decision = AttackingPolicy.decide(&view(&roster, &[], Some(&water_foe), 0), rng.as_mut());
        assert_eq!(decision, Decision::Switch { index: 1 });

        let decision = AttackingPolicy.decide(&view(&roster, &[], Some(&normal_foe), 0), rng.as_mut());
        assert_eq!(decision, Decision::Attack { slot: 0 });
    }

    #[test]
    fn test_low_hp_prefers_offense_booster() {
        let mut roster = vec![fighter("Lead", ElementType::Fire, vec![ember()])];
        roster[0].take_damage(150);
        let foe = fighter("Foe", ElementType::Normal, vec![tackle()]);
        let inventory = bag();
        let mut rng = seeded(1);

        let decision = AttackingPolicy.decide(&view(&roster, &inventory, Some(&foe), 0), rng.as_mut());
        assert_eq!(decision, Decision::UseItem { index: 1 });
    }
}
