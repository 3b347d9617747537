//! Attacks and damage resolution

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;
use crate::rng::roll_percent;
use crate::types::{ElementType, StatKind, StatusCode, effectiveness};
use crate::BattleError;

/// Attack category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Physical,
    Special,
    /// Never deals direct damage
    Status,
}

impl Category {
    pub fn is_offensive(&self) -> bool {
        !matches!(self, Category::Status)
    }
}

/// Fixed stat raise applied to the user of a status attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBoost {
    pub stat: StatKind,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub category: Category,
    pub power: u32,
    /// Hit chance in percent (0-100)
    pub accuracy: u8,
    pub pp: u32,
    pub max_pp: u32,
    #[serde(default)]
    pub status: Option<StatusCode>,
    /// Chance in percent that `status` is inflicted
    #[serde(default)]
    pub effect_chance: u8,
    #[serde(default)]
    pub boost: Option<StatBoost>,
}

impl Attack {
    pub fn new(
        name: impl Into<String>,
        kind: ElementType,
        category: Category,
        power: u32,
        accuracy: u8,
        max_pp: u32,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            category,
            power,
            accuracy: accuracy.min(100),
            pp: max_pp,
            max_pp,
            status: None,
            effect_chance: 0,
            boost: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode, chance: u8) -> Self {
        self.status = Some(status).filter(|s| !s.is_normal());
        self.effect_chance = chance.min(100);
        self
    }

    pub fn with_boost(mut self, stat: StatKind, amount: u32) -> Self {
        self.boost = Some(StatBoost { stat, amount });
        self
    }

    pub fn has_pp(&self) -> bool {
        self.pp > 0
    }

    pub fn is_status(&self) -> bool {
        self.category == Category::Status
    }

    /// Remaining PP as a fraction of max PP
    pub fn pp_ratio(&self) -> f32 {
        if self.max_pp == 0 {
            0.0
        } else {
            self.pp as f32 / self.max_pp as f32
        }
    }

    fn spend_pp(&mut self) {
        self.pp = self.pp.saturating_sub(1);
    }
}

/// Who an attack lands on
pub enum Target<'a> {
    Opponent(&'a mut Combatant),
    /// The attacker itself
    SelfTarget,
}

/// How a resolution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrikeOutcome {
    /// No PP left; nothing changed
    #[default]
    NoPp,
    /// Accuracy roll failed; no PP spent
    Missed,
    Hit,
}

/// Result of [`resolve`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Strike {
    pub outcome: StrikeOutcome,
    /// HP the target actually lost
    pub damage: u32,
    /// Type multiplier for offensive hits (1.0 otherwise)
    pub effectiveness: f32,
    pub inflicted: Option<StatusCode>,
    pub boosted: Option<StatBoost>,
}

impl Strike {
    pub fn landed(&self) -> bool {
        self.outcome == StrikeOutcome::Hit
    }
}

/// Raw damage formula
///
/// `floor(atk * power * eff / def)`, at least 1 whenever the raw value is
/// positive. Immunity (eff 0) always yields 0.
pub fn compute_damage(atk: u32, power: u32, eff: f32, def: u32) -> u32 {
    let raw = f64::from(atk) * f64::from(power) * f64::from(eff) / f64::from(def.max(1));
    if raw <= 0.0 {
        0
    } else {
        (raw.floor() as u32).max(1)
    }
}

/// Resolve the attack in `slot` of `attacker` against `target`
///
/// PP is spent when a status attack resolves or an offensive attack passes its
/// accuracy roll; a miss costs nothing. Status attacks raise the attacker's
/// own stat and may inflict their status on the target.
pub fn resolve(
    attacker: &mut Combatant,
    slot: usize,
    target: Target<'_>,
    rng: &mut dyn RngCore,
) -> Result<Strike, BattleError> {
    let attack = attacker
        .attack(slot)
        .cloned()
        .ok_or_else(|| BattleError::UnknownAttack(format!("slot {}", slot + 1)))?;

    if !attack.has_pp() {
        return Ok(Strike::default());
    }

    let mut strike = Strike {
        outcome: StrikeOutcome::Hit,
        effectiveness: 1.0,
        ..Strike::default()
    };

    if attack.is_status() {
        if let Some(boost) = attack.boost {
            attacker.boost(boost.stat, boost.amount);
            strike.boosted = Some(boost);
        }
        if let Some(code) = attack.status
            && roll_percent(rng, attack.effect_chance)
        {
            let inflicted = match target {
                Target::Opponent(defender) => defender.inflict(code, rng),
                Target::SelfTarget => attacker.inflict(code, rng),
            };
            strike.inflicted = inflicted.then_some(code);
        }
        spend(attacker, slot);
        return Ok(strike);
    }

    if rng.gen_range(1..=100u32) > u32::from(attack.accuracy) {
        strike.outcome = StrikeOutcome::Missed;
        return Ok(strike);
    }

    let atk = attacker.offense(attack.category);
    spend(attacker, slot);

    let defender: &mut Combatant = match target {
        Target::Opponent(defender) => defender,
        Target::SelfTarget => attacker,
    };
    let eff = effectiveness(attack.kind, defender.kind);
    let damage = compute_damage(atk, attack.power, eff, defender.defense(attack.category));

    strike.effectiveness = eff;
    strike.damage = defender.take_damage(damage);

    if let Some(code) = attack.status
        && eff > 0.0
        && roll_percent(rng, attack.effect_chance)
        && defender.inflict(code, rng)
    {
        strike.inflicted = Some(code);
    }

    Ok(strike)
}

fn spend(attacker: &mut Combatant, slot: usize) {
    if let Some(attack) = attacker.attack_mut(slot) {
        attack.spend_pp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::tests::{create_test_combatant, stats};
    use crate::effects::StatusEffect;
    use crate::rng::seeded;
    use crate::types::Stats;

    fn thunderbolt() -> Attack {
        Attack::new("Thunderbolt", ElementType::Electric, Category::Special, 90, 100, 15)
            .with_status(StatusCode::Paralyzed, 10)
    }

    fn fighter(name: &str, kind: ElementType, attack: Attack) -> Combatant {
        Combatant::new(name, name, kind, 500, stats(60, 60, 60))
            .with_attack(attack)
            .unwrap()
    }

    #[test]
    fn test_compute_damage() {
        assert_eq!(compute_damage(60, 90, 1.0, 60), 90);
        assert_eq!(compute_damage(60, 90, 2.0, 60), 180);
        assert_eq!(compute_damage(60, 90, 0.5, 60), 45);
        assert_eq!(compute_damage(1, 1, 0.5, 200), 1);
        assert_eq!(compute_damage(60, 90, 0.0, 60), 0);
        assert_eq!(compute_damage(60, 0, 1.0, 60), 0);
    }

    #[test]
    fn test_offensive_hit_uses_special_stats() {
        let mut attacker = Combatant::new(
            "Sparky",
            "Pikachu",
            ElementType::Electric,
            200,
            Stats {
                attack: 10,
                defense: 10,
                special_attack: 80,
                special_defense: 10,
                speed: 90,
                evasion: 0,
            },
        )
        .with_attack(thunderbolt())
        .unwrap();
        let mut defender = fighter("Squirt", ElementType::Water, thunderbolt());
        let mut rng = seeded(7);

        let strike = resolve(&mut attacker, 0, Target::Opponent(&mut defender), rng.as_mut()).unwrap();

        // 80 * 90 * 2.0 / 60
        assert!(strike.landed());
        assert_eq!(strike.effectiveness, 2.0);
        assert_eq!(strike.damage, 240);
        assert_eq!(defender.hp(), 260);
        assert_eq!(attacker.attack(0).unwrap().pp, 14);
    }

    #[test]
    fn test_physical_reads_attack_and_defense() {
        let tackle = Attack::new("Tackle", ElementType::Normal, Category::Physical, 40, 100, 35);
        let mut attacker = Combatant::new(
            "Brick",
            "Geodude",
            ElementType::Rock,
            200,
            Stats {
                attack: 100,
                special_attack: 5,
                ..Stats::default()
            },
        )
        .with_attack(tackle.clone())
        .unwrap();
        let mut defender = Combatant::new(
            "Wall",
            "Shuckle",
            ElementType::Bug,
            500,
            Stats {
                defense: 50,
                special_defense: 400,
                ..Stats::default()
            },
        );
        let mut rng = seeded(7);

        let strike = resolve(&mut attacker, 0, Target::Opponent(&mut defender), rng.as_mut()).unwrap();
        assert_eq!(strike.damage, 80);
    }

    #[test]
    fn test_immune_target_takes_nothing() {
        let tackle = Attack::new("Tackle", ElementType::Normal, Category::Physical, 40, 100, 35);
        let mut attacker = fighter("Norm", ElementType::Normal, tackle);
        let mut ghost = fighter("Spook", ElementType::Ghost, thunderbolt());
        let mut rng = seeded(7);

        let strike = resolve(&mut attacker, 0, Target::Opponent(&mut ghost), rng.as_mut()).unwrap();
        assert!(strike.landed());
        assert_eq!(strike.damage, 0);
        assert_eq!(strike.effectiveness, 0.0);
        assert!(ghost.is_full_hp());
        assert_eq!(attacker.attack(0).unwrap().pp, 34);
    }

    #[test]
    fn test_miss_spends_no_pp() {
        let never = Attack::new("Never", ElementType::Normal, Category::Physical, 40, 0, 5);
        let mut attacker = fighter("Norm", ElementType::Normal, never);
        let mut defender = fighter("Target", ElementType::Normal, thunderbolt());
        let mut rng = seeded(7);

        for _ in 0..20 {
            let strike = resolve(&mut attacker, 0, Target::Opponent(&mut defender), rng.as_mut()).unwrap();
            assert_eq!(strike.outcome, StrikeOutcome::Missed);
            assert_eq!(strike.damage, 0);
        }
        assert_eq!(attacker.attack(0).unwrap().pp, 5);
        assert!(defender.is_full_hp());
    }

    #[test]
    fn test_empty_pp_changes_nothing() {
        let mut attacker = fighter("Sparky", ElementType::Electric, thunderbolt());
        attacker.drain_pp(15);
        let mut defender = fighter("Squirt", ElementType::Water, thunderbolt());
        let before = (attacker.clone(), defender.clone());
        let mut rng = seeded(7);

        let strike = resolve(&mut attacker, 0, Target::Opponent(&mut defender), rng.as_mut()).unwrap();
        assert_eq!(strike, Strike::default());
        assert_eq!((attacker, defender), before);
    }

    #[test]
    fn test_pp_decrements_by_one_until_zero() {
        let mut attacker = fighter("Sparky", ElementType::Electric, thunderbolt());
        let mut defender = Combatant::new("Tank", "Tank", ElementType::Grass, 100_000, stats(60, 60, 60));
        let mut rng = seeded(7);

        for expected in (0..15).rev() {
            resolve(&mut attacker, 0, Target::Opponent(&mut defender), rng.as_mut()).unwrap();
            assert_eq!(attacker.attack(0).unwrap().pp, expected);
        }
        resolve(&mut attacker, 0, Target::Opponent(&mut defender), rng.as_mut()).unwrap();
        assert_eq!(attacker.attack(0).unwrap().pp, 0);
    }

    #[test]
    fn test_status_attack_boosts_user_and_deals_nothing() {
        let mut attacker = create_test_combatant("Sparky", ElementType::Electric, 100);
        let mut defender = create_test_combatant("Squirt", ElementType::Water, 100);
        let mut rng = seeded(7);

        let strike = resolve(&mut attacker, 1, Target::Opponent(&mut defender), rng.as_mut()).unwrap();
        assert_eq!(strike.damage, 0);
        assert_eq!(strike.boosted.map(|b| b.stat), Some(StatKind::Attack));
        assert_eq!(attacker.base_stats().attack, 60);
        assert_eq!(attacker.attack(1).unwrap().pp, 39);
        assert!(defender.is_full_hp());
    }

    #[test]
    fn test_status_attack_inflicts_on_target() {
        let wave = Attack::new("Thunder Wave", ElementType::Electric, Category::Status, 0, 100, 20)
            .with_status(StatusCode::Paralyzed, 100);
        let mut attacker = fighter("Sparky", ElementType::Electric, wave);
        let mut defender = fighter("Squirt", ElementType::Water, thunderbolt());
        let mut rng = seeded(7);

        let strike = resolve(&mut attacker, 0, Target::Opponent(&mut defender), rng.as_mut()).unwrap();
        assert_eq!(strike.inflicted, Some(StatusCode::Paralyzed));
        assert_eq!(defender.status(), StatusCode::Paralyzed);
        assert_eq!(attacker.status(), StatusCode::Normal);
    }

    #[test]
    fn test_self_target_hits_attacker() {
        let tackle = Attack::new("Tackle", ElementType::Normal, Category::Physical, 40, 100, 35);
        let mut attacker = fighter("Norm", ElementType::Normal, tackle);
        let mut rng = seeded(7);

        let strike = resolve(&mut attacker, 0, Target::SelfTarget, rng.as_mut()).unwrap();
        assert_eq!(strike.damage, 40);
        assert_eq!(attacker.hp(), 460);
        assert_eq!(attacker.attack(0).unwrap().pp, 34);
    }

    #[test]
    fn test_burn_halves_physical_damage() {
        let tackle = Attack::new("Tackle", ElementType::Normal, Category::Physical, 40, 100, 35);
        let mut attacker = fighter("Norm", ElementType::Normal, tackle);
        attacker.inflict_effect(StatusEffect::Burn);
        let mut defender = fighter("Target", ElementType::Normal, thunderbolt());
        let mut rng = seeded(7);

        let strike = resolve(&mut attacker, 0, Target::Opponent(&mut defender), rng.as_mut()).unwrap();
        assert_eq!(strike.damage, 20);
    }

    #[test]
    fn test_unknown_slot() {
        let mut attacker = fighter("Norm", ElementType::Normal, thunderbolt());
        let mut rng = seeded(7);
        let err = resolve(&mut attacker, 3, Target::SelfTarget, rng.as_mut()).unwrap_err();
        assert!(matches!(err, BattleError::UnknownAttack(_)));
    }
}
