//! Decision strategies for automated coaches
//!
//! Every strategy implements [`DecisionPolicy`]. The arena hands a policy a
//! read-only [`BattleView`] of its coach's side plus the opposing active
//! combatant, and the policy answers with the same action vocabulary a human
//! uses. Policies are chosen by [`StrategyKind`] and injected into the coach,
//! so tests can swap in their own.

mod attacking;
mod changing;
mod defensive;
mod delegate;
mod expert;

use coliseum_protocol::PlayerSlot;
use rand::RngCore;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::attack::Attack;
use crate::combatant::Combatant;
use crate::item::{Item, ItemTarget};
use crate::types::{StatKind, effectiveness};

pub use attacking::AttackingPolicy;
pub use changing::ChangingPolicy;
pub use defensive::DefensivePolicy;
pub use delegate::{
    BreakerConfig, BreakerState, CircuitBreaker, DecisionProvider, DelegatePolicy,
    UnreachableProvider, build_request,
};
pub use expert::ExpertPolicy;

/// Available strategy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Attacking,
    Defensive,
    Changing,
    Expert,
    Delegate,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Attacking,
        StrategyKind::Defensive,
        StrategyKind::Changing,
        StrategyKind::Expert,
        StrategyKind::Delegate,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Attacking => "attacking",
            StrategyKind::Defensive => "defensive",
            StrategyKind::Changing => "changing",
            StrategyKind::Expert => "expert",
            StrategyKind::Delegate => "delegate",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the policy for a strategy kind
///
/// Delegate policies start with an [`UnreachableProvider`] and therefore
/// play their random fallback until a real provider is supplied.
pub fn build_policy(kind: StrategyKind) -> Box<dyn DecisionPolicy> {
    match kind {
        StrategyKind::Attacking => Box::new(AttackingPolicy),
        StrategyKind::Defensive => Box::new(DefensivePolicy),
        StrategyKind::Changing => Box::new(ChangingPolicy),
        StrategyKind::Expert => Box::new(ExpertPolicy),
        StrategyKind::Delegate => Box::new(DelegatePolicy::new(
            Box::new(UnreachableProvider),
            BreakerConfig::default(),
        )),
    }
}

/// Numeric action codes
///
/// Automated coaches never flee, so fleeing has no code here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ActionCode {
    Wait = 0,
    Attack = 1,
    Item = 2,
    Switch = 3,
}

/// One automated action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing legal to do; pass the turn
    Wait,
    Attack { slot: usize },
    UseItem { index: usize },
    Switch { index: usize },
}

impl Decision {
    pub fn code(&self) -> ActionCode {
        match self {
            Decision::Wait => ActionCode::Wait,
            Decision::Attack { .. } => ActionCode::Attack,
            Decision::UseItem { .. } => ActionCode::Item,
            Decision::Switch { .. } => ActionCode::Switch,
        }
    }
}

/// What a policy may see when deciding
#[derive(Debug, Clone, Copy)]
pub struct BattleView<'a> {
    pub player: PlayerSlot,
    pub roster: &'a [Combatant],
    pub active: usize,
    pub inventory: &'a [Item],
    /// Opposing active combatant, if any
    pub opponent: Option<&'a Combatant>,
    /// Turns this coach has taken so far
    pub turn: u32,
    /// The coach's previous turn was a voluntary switch
    pub just_switched: bool,
}

impl<'a> BattleView<'a> {
    pub fn active(&self) -> Option<&'a Combatant> {
        self.roster.get(self.active)
    }

    /// Active HP ratio, 0.0 when there is no active combatant
    pub fn hp_ratio(&self) -> f32 {
        self.active().map(Combatant::hp_ratio).unwrap_or(0.0)
    }

    pub fn usable_moves(&self) -> Vec<(usize, &'a Attack)> {
        self.active()
            .map(|c| c.usable_attacks().collect())
            .unwrap_or_default()
    }

    pub fn is_usable_move(&self, slot: usize) -> bool {
        self.active()
            .and_then(|c| c.attack(slot))
            .is_some_and(Attack::has_pp)
    }

    /// Conscious roster members other than the active one
    pub fn bench(&self) -> Vec<(usize, &'a Combatant)> {
        self.roster
            .iter()
            .enumerate()
            .filter(|(i, c)| *i != self.active && !c.is_fainted())
            .collect()
    }

    pub fn has_bench(&self) -> bool {
        self.roster
            .iter()
            .enumerate()
            .any(|(i, c)| i != self.active && !c.is_fainted())
    }

    pub fn is_valid_switch(&self, index: usize) -> bool {
        index != self.active && self.roster.get(index).is_some_and(|c| !c.is_fainted())
    }

    /// Whether the inventory item at `index` can be used on the active combatant
    pub fn is_usable_item(&self, index: usize) -> bool {
        match (self.inventory.get(index), self.active()) {
            (Some(item), Some(active)) => item.check(active).is_ok(),
            _ => false,
        }
    }

    /// Largest healing item usable right now
    pub fn healing_item(&self) -> Option<usize> {
        self.inventory
            .iter()
            .enumerate()
            .filter(|(i, item)| item.is_healing() && self.is_usable_item(*i))
            .max_by_key(|(_, item)| item.magnitude)
            .map(|(i, _)| i)
    }

    /// First usable booster for any of `stats`, in preference order
    pub fn booster_item(&self, stats: &[StatKind]) -> Option<usize> {
        stats.iter().find_map(|wanted| {
            self.inventory
                .iter()
                .position(|item| item.target == ItemTarget::Stat { stat: *wanted })
                .filter(|i| self.is_usable_item(*i))
        })
    }

    pub fn cure_item(&self) -> Option<usize> {
        self.inventory
            .iter()
            .enumerate()
            .position(|(i, item)| item.target == ItemTarget::Cure && self.is_usable_item(i))
    }
}

/// Offensive stats in the order the active combatant favors them
pub(crate) fn offense_stats(combatant: &Combatant) -> [StatKind; 2] {
    let stats = combatant.stats();
    if stats.special_attack > stats.attack {
        [StatKind::SpecialAttack, StatKind::Attack]
    } else {
        [StatKind::Attack, StatKind::SpecialAttack]
    }
}

/// Type multiplier of `attack` against the opponent (neutral when unknown)
pub(crate) fn move_effectiveness(attack: &Attack, opponent: Option<&Combatant>) -> f32 {
    opponent.map_or(1.0, |o| effectiveness(attack.kind, o.kind))
}

/// Damaging move with the best type multiplier; power breaks ties
///
/// Falls back to any usable move when only status moves are left.
pub(crate) fn best_effectiveness_move(
    view: &BattleView<'_>,
    rng: &mut dyn RngCore,
) -> Option<usize> {
    let moves = view.usable_moves();
    let damaging = moves.iter().filter(|(_, a)| !a.is_status()).map(|(slot, a)| {
        let score = move_effectiveness(a, view.opponent) * 1000.0 + a.power as f32;
        (*slot, score)
    });
    pick_best(damaging, rng).or_else(|| pick_best(moves.iter().map(|(slot, _)| (*slot, 0.0)), rng))
}

/// Status move, preferring larger self boosts and likelier status infliction
pub(crate) fn best_status_move(view: &BattleView<'_>, rng: &mut dyn RngCore) -> Option<usize> {
    let moves = view.usable_moves();
    let status = moves.iter().filter(|(_, a)| a.is_status()).map(|(slot, a)| {
        let boost = a.boost.map_or(0, |b| b.amount);
        let inflict = if a.status.is_some() { u32::from(a.effect_chance) } else { 0 };
        (*slot, (boost + inflict) as f32)
    });
    pick_best(status, rng)
}

pub(crate) const DEFENSE_STATS: [StatKind; 2] = [StatKind::Defense, StatKind::SpecialDefense];

/// Highest-scoring candidate; exact ties are broken with the RNG
pub(crate) fn pick_best<I>(candidates: I, rng: &mut dyn RngCore) -> Option<usize>
where
    I: IntoIterator<Item = (usize, f32)>,
{
    let mut best: Vec<usize> = Vec::new();
    let mut best_score = f32::NEG_INFINITY;

    for (index, score) in candidates {
        if score > best_score {
            best_score = score;
            best.clear();
            best.push(index);
        } else if score == best_score {
            best.push(index);
        }
    }

    best.choose(rng).copied()
}

/// Contract every automated strategy implements
pub trait DecisionPolicy: Send {
    fn kind(&self) -> StrategyKind;

    /// Move slot to use; must have PP
    fn select_move(&mut self, view: &BattleView<'_>, rng: &mut dyn RngCore) -> Option<usize>;

    /// Roster index to bring in, on faint or on a voluntary switch
    fn select_best_pokemon(
        &mut self,
        view: &BattleView<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<usize>;

    /// Voluntary switch trigger
    fn should_switch(&mut self, view: &BattleView<'_>, rng: &mut dyn RngCore) -> bool;

    fn should_use_item(&mut self, view: &BattleView<'_>, rng: &mut dyn RngCore) -> bool;

    /// Inventory index to use, `None` for no item
    fn select_item(&mut self, view: &BattleView<'_>, rng: &mut dyn RngCore) -> Option<usize>;

    /// Combine the hooks into one action
    ///
    /// Out-of-range or empty-PP move choices from the hooks are replaced by the
    /// best remaining usable move, so the result is always legal.
    fn decide(&mut self, view: &BattleView<'_>, rng: &mut dyn RngCore) -> Decision {
        let Some(active) = view.active() else {
            return Decision::Wait;
        };

        if active.is_fainted() {
            return match self.select_best_pokemon(view, rng) {
                Some(index) if view.is_valid_switch(index) => Decision::Switch { index },
                _ => view
                    .bench()
                    .first()
                    .map_or(Decision::Wait, |(index, _)| Decision::Switch { index: *index }),
            };
        }

        if view.opponent.is_some() {
            if self.should_use_item(view, rng)
                && let Some(index) = self.select_item(view, rng)
                && view.is_usable_item(index)
            {
                return Decision::UseItem { index };
            }

            // No voluntary switch on the turn after one
            if view.has_bench()
                && !view.just_switched
                && self.should_switch(view, rng)
                && let Some(index) = self.select_best_pokemon(view, rng)
                && view.is_valid_switch(index)
            {
                return Decision::Switch { index };
            }
        }

        match self.select_move(view, rng) {
            Some(slot) if view.is_usable_move(slot) => Decision::Attack { slot },
            _ => match view.usable_moves().first() {
                Some((slot, _)) => Decision::Attack { slot: *slot },
                None => view
                    .bench()
                    .first()
                    .map_or(Decision::Wait, |(index, _)| Decision::Switch { index: *index }),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::attack::Category;
    use crate::combatant::tests::stats;
    use crate::rng::seeded;
    use crate::types::ElementType;

    pub(crate) fn fighter(name: &str, kind: ElementType, attacks: Vec<Attack>) -> Combatant {
        let mut c = Combatant::new(name, name, kind, 200, stats(60, 60, 60));
        for attack in attacks {
            c.learn(attack).unwrap();
        }
        c
    }

    pub(crate) fn tackle() -> Attack {
        Attack::new("Tackle", ElementType::Normal, Category::Physical, 40, 100, 35)
    }

    pub(crate) fn surf() -> Attack {
        Attack::new("Surf", ElementType::Water, Category::Special, 90, 100, 15)
    }

    pub(crate) fn ember() -> Attack {
        Attack::new("Ember", ElementType::Fire, Category::Special, 40, 100, 25)
    }

    pub(crate) fn harden() -> Attack {
        Attack::new("Harden", ElementType::Normal, Category::Status, 0, 100, 30)
            .with_boost(StatKind::Defense, 15)
    }

    pub(crate) fn bag() -> Vec<Item> {
        vec![
            Item::new("Potion", 50, ItemTarget::Hp),
            Item::new("X Attack", 15, ItemTarget::Stat { stat: StatKind::Attack }),
            Item::new("X Defense", 15, ItemTarget::Stat { stat: StatKind::Defense }),
            Item::new("Revive", 50, ItemTarget::Revive),
        ]
    }

    pub(crate) fn view<'a>(
        roster: &'a [Combatant],
        inventory: &'a [Item],
        opponent: Option<&'a Combatant>,
        turn: u32,
    ) -> BattleView<'a> {
        BattleView {
            player: PlayerSlot::P1,
            roster,
            active: 0,
            inventory,
            opponent,
            turn,
            just_switched: false,
        }
    }

    /// Every strategy must produce a legal action in these scenarios
    pub(crate) fn assert_always_legal(kind: StrategyKind) {
        let mut policy = build_policy(kind);
        let mut rng = seeded(99);
        let opponent = fighter("Foe", ElementType::Grass, vec![tackle()]);

        let mut roster = vec![
            fighter("Lead", ElementType::Fire, vec![tackle(), ember(), harden()]),
            fighter("Back", ElementType::Water, vec![surf()]),
        ];
        let inventory = bag();

        for turn in 0..6 {
            for hp in [200, 120, 70, 30, 5] {
                let lead = &mut roster[0];
                lead.heal(200);
                lead.take_damage(200 - hp);

                let v = view(&roster, &inventory, Some(&opponent), turn);
                match policy.decide(&v, rng.as_mut()) {
                    Decision::Attack { slot } => assert!(v.is_usable_move(slot)),
                    Decision::UseItem { index } => assert!(v.is_usable_item(index)),
                    Decision::Switch { index } => assert!(v.is_valid_switch(index)),
                    Decision::Wait => panic!("{kind} waited with usable moves"),
                }
            }
        }

        // Out of PP with no bench: waits
        let mut drained = vec![fighter("Tired", ElementType::Fire, vec![tackle()])];
        drained[0].drain_pp(100);
        let v = view(&drained, &[], Some(&opponent), 0);
        assert_eq!(policy.decide(&v, rng.as_mut()), Decision::Wait);
    }

    #[test]
    fn test_no_opponent_defaults_to_attack() {
        let roster = vec![fighter("Lead", ElementType::Fire, vec![harden(), ember()])];
        let inventory = bag();
        let mut rng = seeded(1);

        for kind in StrategyKind::ALL {
            let mut policy = build_policy(kind);
            let decision = policy.decide(&view(&roster, &inventory, None, 0), rng.as_mut());
            assert_eq!(decision.code(), ActionCode::Attack, "{kind}");
        }
    }

    #[test]
    fn test_fainted_active_switches() {
        let mut roster = vec![
            fighter("Down", ElementType::Fire, vec![ember()]),
            fighter("Up", ElementType::Water, vec![surf()]),
        ];
        roster[0].take_damage(500);
        let opponent = fighter("Foe", ElementType::Grass, vec![tackle()]);
        let mut rng = seeded(1);

        for kind in StrategyKind::ALL {
            let mut policy = build_policy(kind);
            let decision = policy.decide(&view(&roster, &[], Some(&opponent), 3), rng.as_mut());
            assert_eq!(decision, Decision::Switch { index: 1 }, "{kind}");
        }
    }

    #[test]
    fn test_no_voluntary_switch_right_after_switching() {
        let roster = vec![
            fighter("Lead", ElementType::Fire, vec![ember()]),
            fighter("Back", ElementType::Grass, vec![tackle()]),
        ];
        let opponent = fighter("Foe", ElementType::Water, vec![surf()]);
        let mut rng = seeded(4);

        for kind in [StrategyKind::Attacking, StrategyKind::Defensive, StrategyKind::Changing] {
            let mut policy = build_policy(kind);
            let fresh = view(&roster, &[], Some(&opponent), 3);
            assert_eq!(
                policy.decide(&fresh, rng.as_mut()),
                Decision::Switch { index: 1 },
                "{kind}"
            );

            let settled = BattleView {
                just_switched: true,
                ..fresh
            };
            assert_eq!(
                policy.decide(&settled, rng.as_mut()),
                Decision::Attack { slot: 0 },
                "{kind}"
            );
        }
    }

    #[test]
    fn test_pick_best_breaks_ties_randomly() {
        let mut rng = seeded(5);
        let mut seen = [false; 3];
        for _ in 0..100 {
            let pick = pick_best([(0, 1.0), (1, 2.0), (2, 2.0)], rng.as_mut()).unwrap();
            seen[pick] = true;
        }
        assert_eq!(seen, [false, true, true]);
        assert_eq!(pick_best(Vec::new(), rng.as_mut()), None);
    }

    #[test]
    fn test_view_item_helpers() {
        let mut roster = vec![fighter("Lead", ElementType::Fire, vec![ember()])];
        let inventory = bag();

        let v = view(&roster, &inventory, None, 0);
        assert_eq!(v.healing_item(), None);
        assert_eq!(v.booster_item(&[StatKind::Defense, StatKind::Attack]), Some(2));
        assert_eq!(v.cure_item(), None);

        roster[0].take_damage(100);
        let v = view(&roster, &inventory, None, 0);
        assert_eq!(v.healing_item(), Some(0));
        assert!(!v.is_usable_item(3));
    }

    #[test]
    fn test_strategy_kind_parse() {
        assert_eq!(StrategyKind::parse("Expert"), Some(StrategyKind::Expert));
        assert_eq!(StrategyKind::parse("random"), None);
        assert_eq!(
            serde_json::to_string(&StrategyKind::Delegate).unwrap(),
            "\"delegate\""
        );
    }
}
