//! In-battle creature state

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::attack::{Attack, Category};
use crate::effects::{AttemptOutcome, EffectChain, StatusEffect, TickReport};
use crate::types::{ElementType, StatKind, Stats, StatusCode};
use crate::BattleError;

/// Maximum number of attacks a combatant can know
pub const MAX_ATTACKS: usize = 4;

/// A combatant in battle
///
/// HP and PP only change through the methods here, so `0 <= hp <= max_hp`
/// always holds and PP never goes negative. A combatant at 0 HP has fainted
/// but stays on the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CombatantRecord")]
pub struct Combatant {
    pub name: String,
    pub species: String,
    pub kind: ElementType,
    max_hp: u32,
    hp: u32,
    base: Stats,
    attacks: Vec<Attack>,
    effects: EffectChain,
}

/// Unchecked serialized form; becomes a [`Combatant`] only if the HP and
/// move bounds hold
#[derive(Deserialize)]
struct CombatantRecord {
    name: String,
    species: String,
    kind: ElementType,
    max_hp: u32,
    hp: u32,
    base: Stats,
    attacks: Vec<Attack>,
    #[serde(default)]
    effects: EffectChain,
}

impl TryFrom<CombatantRecord> for Combatant {
    type Error = BattleError;

    fn try_from(record: CombatantRecord) -> Result<Self, Self::Error> {
        if record.max_hp == 0 {
            return Err(BattleError::InvalidSetup(format!(
                "{} has no max HP",
                record.name
            )));
        }
        if record.hp > record.max_hp {
            return Err(BattleError::InvalidSetup(format!(
                "{} has {} HP over its max of {}",
                record.name, record.hp, record.max_hp
            )));
        }
        if record.attacks.len() > MAX_ATTACKS {
            return Err(BattleError::MoveSlotsFull(record.name));
        }

        Ok(Self {
            name: record.name,
            species: record.species,
            kind: record.kind,
            max_hp: record.max_hp,
            hp: record.hp,
            base: record.base,
            attacks: record.attacks,
            effects: record.effects,
        })
    }
}

impl Combatant {
    pub fn new(
        name: impl Into<String>,
        species: impl Into<String>,
        kind: ElementType,
        max_hp: u32,
        base: Stats,
    ) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            name: name.into(),
            species: species.into(),
            kind,
            max_hp,
            hp: max_hp,
            base,
            attacks: Vec::new(),
            effects: EffectChain::new(),
        }
    }

    /// Builder form of [`Combatant::learn`] for fixtures
    pub fn with_attack(mut self, attack: Attack) -> Result<Self, BattleError> {
        self.learn(attack)?;
        Ok(self)
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn hp_ratio(&self) -> f32 {
        self.hp as f32 / self.max_hp as f32
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    pub fn is_full_hp(&self) -> bool {
        self.hp == self.max_hp
    }

    pub fn status(&self) -> StatusCode {
        self.effects.status()
    }

    /// Counter of the current status (sleep turns left, poison turns elapsed)
    pub fn status_turns(&self) -> u8 {
        self.effects.status_turns()
    }

    pub fn effects(&self) -> &EffectChain {
        &self.effects
    }

    pub fn base_stats(&self) -> Stats {
        self.base
    }

    /// Stats after every active status modifier
    pub fn stats(&self) -> Stats {
        self.effects.apply(self.base)
    }

    pub fn speed(&self) -> u32 {
        self.stats().speed
    }

    /// Offensive stat an attack of `category` reads
    pub fn offense(&self, category: Category) -> u32 {
        let stats = self.stats();
        match category {
            Category::Special => stats.special_attack,
            Category::Physical | Category::Status => stats.attack,
        }
    }

    /// Defensive stat an attack of `category` reads
    pub fn defense(&self, category: Category) -> u32 {
        let stats = self.stats();
        match category {
            Category::Special => stats.special_defense,
            Category::Physical | Category::Status => stats.defense,
        }
    }

    pub fn attacks(&self) -> &[Attack] {
        &self.attacks
    }

    pub fn attack(&self, slot: usize) -> Option<&Attack> {
        self.attacks.get(slot)
    }

    pub(crate) fn attack_mut(&mut self, slot: usize) -> Option<&mut Attack> {
        self.attacks.get_mut(slot)
    }

    /// Find an attack slot by name (case-insensitive)
    pub fn find_attack(&self, name: &str) -> Option<usize> {
        self.attacks
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Attacks that still have PP, with their slots
    pub fn usable_attacks(&self) -> impl Iterator<Item = (usize, &Attack)> {
        self.attacks.iter().enumerate().filter(|(_, a)| a.has_pp())
    }

    pub fn has_usable_attack(&self) -> bool {
        self.attacks.iter().any(Attack::has_pp)
    }

    pub fn learn(&mut self, attack: Attack) -> Result<(), BattleError> {
        if self.attacks.len() >= MAX_ATTACKS {
            return Err(BattleError::MoveSlotsFull(self.name.clone()));
        }
        self.attacks.push(attack);
        Ok(())
    }

    /// Lose up to `amount` HP; returns the HP actually lost
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    /// Restore up to `amount` HP; fainted combatants cannot be healed
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.is_fainted() {
            return 0;
        }
        let healed = amount.min(self.max_hp - self.hp);
        self.hp += healed;
        healed
    }

    /// Bring a fainted combatant back with `percent` of its total HP (min 1)
    pub fn revive(&mut self, percent: u32) -> u32 {
        if !self.is_fainted() {
            return 0;
        }
        let restored = (self.max_hp.saturating_mul(percent) / 100).clamp(1, self.max_hp);
        self.hp = restored;
        restored
    }

    pub fn boost(&mut self, stat: StatKind, amount: u32) {
        self.base.raise(stat, amount);
    }

    /// Inflict a fresh effect for `code`; no-op on fainted targets, `Normal`,
    /// or an effect already present
    pub fn inflict(&mut self, code: StatusCode, rng: &mut dyn RngCore) -> bool {
        if self.is_fainted() || self.effects.contains(code) {
            return false;
        }
        match StatusEffect::from_code(code, rng) {
            Some(effect) => self.effects.push(effect),
            None => false,
        }
    }

    /// Inflict a preset effect (e.g. sleep with a fixed counter)
    pub fn inflict_effect(&mut self, effect: StatusEffect) -> bool {
        if self.is_fainted() {
            return false;
        }
        self.effects.push(effect)
    }

    /// Clear every status effect
    pub fn cure(&mut self) -> Vec<StatusCode> {
        self.effects.clear()
    }

    /// Pass an attack attempt through the status chain
    pub fn attempt_attack(&mut self, rng: &mut dyn RngCore) -> AttemptOutcome {
        self.effects.attempt(rng)
    }

    /// End-of-action tick; damage goes through [`Combatant::take_damage`]
    ///
    /// The returned report holds the HP actually lost per effect.
    pub fn tick_status(&mut self, rng: &mut dyn RngCore) -> TickReport {
        if self.is_fainted() {
            return TickReport::default();
        }
        let mut report = self.effects.tick(self.max_hp, rng);
        for (_, amount) in report.damage.iter_mut() {
            *amount = self.take_damage(*amount);
        }
        report
    }

    /// Drain `amount` PP from every attack, floored at zero
    pub fn drain_pp(&mut self, amount: u32) {
        for attack in &mut self.attacks {
            attack.pp = attack.pp.saturating_sub(amount);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::attack::Attack;
    use crate::rng::seeded;

    pub(crate) fn stats(attack: u32, defense: u32, speed: u32) -> Stats {
        Stats {
            attack,
            defense,
            special_attack: attack,
            special_defense: defense,
            speed,
            evasion: 0,
        }
    }

    /// Combatant with a physical and a status attack
    pub(crate) fn create_test_combatant(name: &str, kind: ElementType, max_hp: u32) -> Combatant {
        Combatant::new(name, name, kind, max_hp, stats(50, 50, 50))
            .with_attack(Attack::new("Tackle", ElementType::Normal, Category::Physical, 40, 100, 35))
            .and_then(|c| {
                c.with_attack(
                    Attack::new("Growl", ElementType::Normal, Category::Status, 0, 100, 40)
                        .with_boost(StatKind::Attack, 10),
                )
            })
            .unwrap()
    }

    #[test]
    fn test_deserialize_rejects_out_of_bounds_hp() {
        let sparky = create_test_combatant("Sparky", ElementType::Electric, 100);
        let json = serde_json::to_value(&sparky).unwrap();
        let back: Combatant = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, sparky);

        let mut over = json.clone();
        over["hp"] = serde_json::json!(500);
        assert!(serde_json::from_value::<Combatant>(over).is_err());

        let mut empty = json.clone();
        empty["max_hp"] = serde_json::json!(0);
        empty["hp"] = serde_json::json!(0);
        assert!(serde_json::from_value::<Combatant>(empty).is_err());

        let mut no_effects = json;
        no_effects.as_object_mut().unwrap().remove("effects");
        let back: Combatant = serde_json::from_value(no_effects).unwrap();
        assert_eq!(back.status(), StatusCode::Normal);
    }

    #[test]
    fn test_hp_stays_in_bounds() {
        let mut c = create_test_combatant("Sparky", ElementType::Electric, 100);

        assert_eq!(c.take_damage(30), 30);
        assert_eq!(c.heal(500), 30);
        assert_eq!(c.hp(), 100);

        assert_eq!(c.take_damage(250), 100);
        assert_eq!(c.hp(), 0);
        assert!(c.is_fainted());
        assert_eq!(c.heal(10), 0);
    }

    #[test]
    fn test_revive_only_fainted() {
        let mut c = create_test_combatant("Sparky", ElementType::Electric, 90);
        assert_eq!(c.revive(50), 0);

        c.take_damage(90);
        assert_eq!(c.revive(50), 45);
        assert_eq!(c.hp(), 45);

        let mut tiny = create_test_combatant("Tiny", ElementType::Bug, 1);
        tiny.take_damage(1);
        assert_eq!(tiny.revive(10), 1);
    }

    #[test]
    fn test_learn_limit() {
        let mut c = create_test_combatant("Sparky", ElementType::Electric, 100);
        c.learn(Attack::new("Spark", ElementType::Electric, Category::Physical, 65, 100, 20))
            .unwrap();
        c.learn(Attack::new("Swift", ElementType::Normal, Category::Special, 60, 100, 20))
            .unwrap();

        let err = c
            .learn(Attack::new("Thunder", ElementType::Electric, Category::Special, 110, 70, 10))
            .unwrap_err();
        assert_eq!(err, BattleError::MoveSlotsFull("Sparky".into()));
        assert_eq!(c.attacks().len(), MAX_ATTACKS);
    }

    #[test]
    fn test_find_attack_ignores_case() {
        let c = create_test_combatant("Sparky", ElementType::Electric, 100);
        assert_eq!(c.find_attack("tackle"), Some(0));
        assert_eq!(c.find_attack("GROWL"), Some(1));
        assert_eq!(c.find_attack("Surf"), None);
    }

    #[test]
    fn test_status_mirrors_latest_effect() {
        let mut c = create_test_combatant("Sparky", ElementType::Electric, 100);
        let mut rng = seeded(1);

        assert_eq!(c.status(), StatusCode::Normal);
        assert!(c.inflict(StatusCode::Burned, rng.as_mut()));
        assert!(c.inflict(StatusCode::Paralyzed, rng.as_mut()));
        assert!(!c.inflict(StatusCode::Burned, rng.as_mut()));
        assert_eq!(c.status(), StatusCode::Paralyzed);

        assert_eq!(c.stats().attack, 25);
        assert_eq!(c.speed(), 25);

        c.cure();
        assert_eq!(c.status(), StatusCode::Normal);
        assert_eq!(c.speed(), 50);
    }

    #[test]
    fn test_tick_burn_on_hundred_hp() {
        let mut c = create_test_combatant("Sparky", ElementType::Electric, 100);
        c.inflict_effect(StatusEffect::Burn);
        let mut rng = seeded(1);

        let report = c.tick_status(rng.as_mut());
        assert_eq!(report.damage, vec![(StatusCode::Burned, 6)]);
        assert_eq!(c.hp(), 94);
    }

    #[test]
    fn test_tick_damage_clamped_at_zero() {
        let mut c = create_test_combatant("Sparky", ElementType::Electric, 100);
        c.inflict_effect(StatusEffect::Poison { turns_elapsed: 0 });
        c.take_damage(95);
        let mut rng = seeded(1);

        let report = c.tick_status(rng.as_mut());
        assert_eq!(report.damage, vec![(StatusCode::Poisoned, 5)]);
        assert_eq!(c.hp(), 0);
        assert!(c.tick_status(rng.as_mut()).damage.is_empty());
    }

    #[test]
    fn test_fainted_cannot_be_inflicted() {
        let mut c = create_test_combatant("Sparky", ElementType::Electric, 100);
        c.take_damage(100);
        let mut rng = seeded(1);
        assert!(!c.inflict(StatusCode::Poisoned, rng.as_mut()));
        assert!(!c.inflict_effect(StatusEffect::Burn));
    }

    #[test]
    fn test_sleep_blocks_then_clears() {
        let mut c = create_test_combatant("Sparky", ElementType::Electric, 100);
        c.inflict_effect(StatusEffect::Sleep { turns_remaining: 2 });
        let mut rng = seeded(4);

        assert!(!c.attempt_attack(rng.as_mut()).proceeds());
        assert!(!c.attempt_attack(rng.as_mut()).proceeds());
        assert_eq!(c.status_turns(), 0);
        assert_eq!(c.status(), StatusCode::Normal);
        assert!(c.attempt_attack(rng.as_mut()).proceeds());
    }

    #[test]
    fn test_drain_pp_floors_at_zero() {
        let mut c = create_test_combatant("Sparky", ElementType::Electric, 100);
        c.drain_pp(1);
        assert_eq!(c.attack(0).unwrap().pp, 34);

        c.drain_pp(100);
        assert!(c.attacks().iter().all(|a| a.pp == 0));
        assert!(!c.has_usable_attack());
    }
}
