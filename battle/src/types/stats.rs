//! Base stats

use serde::{Deserialize, Serialize};

/// A combatant's stat block (HP is tracked separately)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
    #[serde(default)]
    pub evasion: u32,
}

impl Stats {
    pub fn get(&self, stat: StatKind) -> u32 {
        match stat {
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::SpecialAttack => self.special_attack,
            StatKind::SpecialDefense => self.special_defense,
            StatKind::Speed => self.speed,
            StatKind::Evasion => self.evasion,
        }
    }

    pub fn get_mut(&mut self, stat: StatKind) -> &mut u32 {
        match stat {
            StatKind::Attack => &mut self.attack,
            StatKind::Defense => &mut self.defense,
            StatKind::SpecialAttack => &mut self.special_attack,
            StatKind::SpecialDefense => &mut self.special_defense,
            StatKind::Speed => &mut self.speed,
            StatKind::Evasion => &mut self.evasion,
        }
    }

    /// Raise a stat, saturating
    pub fn raise(&mut self, stat: StatKind, amount: u32) {
        let value = self.get_mut(stat);
        *value = value.saturating_add(amount);
    }
}

/// Stat names used by attack boosts and items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
    Evasion,
}

impl StatKind {
    /// Parse from protocol abbreviation or full snake_case name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "atk" | "attack" => Some(StatKind::Attack),
            "def" | "defense" => Some(StatKind::Defense),
            "spa" | "special_attack" => Some(StatKind::SpecialAttack),
            "spd" | "special_defense" => Some(StatKind::SpecialDefense),
            "spe" | "speed" => Some(StatKind::Speed),
            "evasion" => Some(StatKind::Evasion),
            _ => None,
        }
    }

    /// Protocol abbreviation ("atk", "spa", ...)
    pub fn as_protocol(&self) -> &'static str {
        match self {
            StatKind::Attack => "atk",
            StatKind::Defense => "def",
            StatKind::SpecialAttack => "spa",
            StatKind::SpecialDefense => "spd",
            StatKind::Speed => "spe",
            StatKind::Evasion => "evasion",
        }
    }

    pub fn is_offensive(&self) -> bool {
        matches!(self, StatKind::Attack | StatKind::SpecialAttack)
    }

    pub fn is_defensive(&self) -> bool {
        matches!(self, StatKind::Defense | StatKind::SpecialDefense)
    }
}
