//! Consumable items

use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;
use crate::types::{StatKind, StatusCode};
use crate::BattleError;

/// What an item acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemTarget {
    /// Heal by `magnitude` HP
    Hp,
    /// Raise a base stat by `magnitude`
    Stat { stat: StatKind },
    /// Bring back a fainted combatant with `magnitude` percent HP
    Revive,
    /// Clear every status effect
    Cure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub magnitude: u32,
    pub target: ItemTarget,
}

/// What using an item did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemEffect {
    Healed(u32),
    Boosted { stat: StatKind, amount: u32 },
    Revived(u32),
    Cured(Vec<StatusCode>),
}

impl Item {
    pub fn new(name: impl Into<String>, magnitude: u32, target: ItemTarget) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            magnitude,
            target,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_healing(&self) -> bool {
        self.target == ItemTarget::Hp
    }

    pub fn is_revive(&self) -> bool {
        self.target == ItemTarget::Revive
    }

    /// Stat this item raises, if it is a booster
    pub fn boosts(&self) -> Option<StatKind> {
        match self.target {
            ItemTarget::Stat { stat } => Some(stat),
            _ => None,
        }
    }

    /// Check that using this item on `target` would do something
    pub fn check(&self, target: &Combatant) -> Result<(), BattleError> {
        let no_effect = || BattleError::ItemHasNoEffect {
            item: self.name.clone(),
            target: target.name.clone(),
        };

        if self.target == ItemTarget::Revive {
            return if target.is_fainted() {
                Ok(())
            } else {
                Err(no_effect())
            };
        }

        if target.is_fainted() {
            return Err(BattleError::ItemOnFaintedTarget {
                item: self.name.clone(),
                target: target.name.clone(),
            });
        }

        match self.target {
            ItemTarget::Hp if target.is_full_hp() => {
                Err(BattleError::ItemOnFullHealth(target.name.clone()))
            }
            ItemTarget::Cure if target.status().is_normal() => Err(no_effect()),
            _ => Ok(()),
        }
    }

    /// Apply to `target`; nothing changes unless [`Item::check`] passes
    pub fn apply(&self, target: &mut Combatant) -> Result<ItemEffect, BattleError> {
        self.check(target)?;

        let effect = match self.target {
            ItemTarget::Hp => ItemEffect::Healed(target.heal(self.magnitude)),
            ItemTarget::Stat { stat } => {
                target.boost(stat, self.magnitude);
                ItemEffect::Boosted {
                    stat,
                    amount: self.magnitude,
                }
            }
            ItemTarget::Revive => ItemEffect::Revived(target.revive(self.magnitude)),
            ItemTarget::Cure => ItemEffect::Cured(target.cure()),
        };
        Ok(effect)
    }
}
