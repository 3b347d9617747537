//! Species, attack and item catalog
//!
//! The builtin tables are embedded JSON parsed once into an immutable
//! [`Catalog`]. Every lookup is a pure function over that data; a name that is
//! not in the tables is an error, never a default.

use once_cell::sync::OnceCell;
use rand::RngCore;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::attack::{Attack, Category, StatBoost};
use crate::combatant::{Combatant, MAX_ATTACKS};
use crate::item::Item;
use crate::types::{ElementType, Stats, StatusCode};
use crate::BattleError;

const SPECIES_JSON: &str = include_str!("data/species.json");
const ATTACKS_JSON: &str = include_str!("data/attacks.json");
const ITEMS_JSON: &str = include_str!("data/items.json");

/// Largest roster a coach may field
pub const MAX_ROSTER: usize = 6;

/// Items every coach starts with when no bag is given
const STARTER_BAG: [&str; 7] = [
    "Potion",
    "Potion",
    "Super Potion",
    "Revive",
    "Full Heal",
    "X Attack",
    "X Defense",
];

#[derive(Deserialize)]
struct RawSpecies {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    hp: u32,
    attack: u32,
    defense: u32,
    special_attack: u32,
    special_defense: u32,
    speed: u32,
    #[serde(default)]
    evasion: u32,
    #[serde(default)]
    moves: Vec<String>,
}

#[derive(Deserialize)]
struct RawAttack {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    category: Category,
    power: u32,
    accuracy: u8,
    pp: u32,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    effect_chance: u8,
    #[serde(default)]
    boost: Option<StatBoost>,
}

/// A species entry: the template combatants are spawned from
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub name: String,
    pub kind: ElementType,
    pub max_hp: u32,
    pub stats: Stats,
    /// Default move set
    pub moves: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    species: Vec<Species>,
    attacks: Vec<Attack>,
    items: Vec<Item>,
}

impl Catalog {
    /// The embedded tables, parsed on first use
    pub fn builtin() -> Result<&'static Catalog, BattleError> {
        static BUILTIN: OnceCell<Catalog> = OnceCell::new();
        BUILTIN.get_or_try_init(|| Catalog::from_json(SPECIES_JSON, ATTACKS_JSON, ITEMS_JSON))
    }

    /// Parse and cross-check catalog tables
    pub fn from_json(species: &str, attacks: &str, items: &str) -> Result<Self, BattleError> {
        let raw_attacks: Vec<RawAttack> = serde_json::from_str(attacks)
            .map_err(|e| BattleError::Catalog(format!("attacks: {}", e)))?;
        let raw_species: Vec<RawSpecies> = serde_json::from_str(species)
            .map_err(|e| BattleError::Catalog(format!("species: {}", e)))?;
        let items: Vec<Item> = serde_json::from_str(items)
            .map_err(|e| BattleError::Catalog(format!("items: {}", e)))?;

        let attacks = raw_attacks
            .into_iter()
            .map(convert_attack)
            .collect::<Result<Vec<_>, _>>()?;

        let mut catalog = Catalog {
            species: Vec::with_capacity(raw_species.len()),
            attacks,
            items,
        };

        for raw in raw_species {
            let species = catalog.convert_species(raw)?;
            catalog.species.push(species);
        }

        Ok(catalog)
    }

    fn convert_species(&self, raw: RawSpecies) -> Result<Species, BattleError> {
        let kind = ElementType::parse(&raw.kind)?;
        if raw.moves.len() > MAX_ATTACKS {
            return Err(BattleError::Catalog(format!(
                "{} lists {} moves",
                raw.name,
                raw.moves.len()
            )));
        }
        if let Some(missing) = raw.moves.iter().find(|m| self.find_attack(m).is_none()) {
            return Err(BattleError::Catalog(format!(
                "{} references unknown attack {}",
                raw.name, missing
            )));
        }

        Ok(Species {
            name: raw.name,
            kind,
            max_hp: raw.hp,
            stats: Stats {
                attack: raw.attack,
                defense: raw.defense,
                special_attack: raw.special_attack,
                special_defense: raw.special_defense,
                speed: raw.speed,
                evasion: raw.evasion,
            },
            moves: raw.moves,
        })
    }

    fn find_attack(&self, name: &str) -> Option<&Attack> {
        self.attacks
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn species(&self, name: &str) -> Result<&Species, BattleError> {
        self.species
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| BattleError::UnknownSpecies(name.to_string()))
    }

    /// A fresh copy of an attack, full PP
    pub fn attack(&self, name: &str) -> Result<Attack, BattleError> {
        self.find_attack(name)
            .cloned()
            .ok_or_else(|| BattleError::UnknownAttack(name.to_string()))
    }

    pub fn item(&self, name: &str) -> Result<Item, BattleError> {
        self.items
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name.trim()))
            .cloned()
            .ok_or_else(|| BattleError::UnknownItem(name.to_string()))
    }

    pub fn species_names(&self) -> impl Iterator<Item = &str> {
        self.species.iter().map(|s| s.name.as_str())
    }

    pub fn attack_names(&self) -> impl Iterator<Item = &str> {
        self.attacks.iter().map(|a| a.name.as_str())
    }

    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.name.as_str())
    }

    /// Spawn a combatant with its species' default moves
    pub fn spawn(&self, species: &str, nickname: Option<&str>) -> Result<Combatant, BattleError> {
        self.spawn_with_attacks(species, nickname, &[])
    }

    /// Spawn a combatant with the given moves (species default when empty)
    pub fn spawn_with_attacks(
        &self,
        species: &str,
        nickname: Option<&str>,
        attacks: &[String],
    ) -> Result<Combatant, BattleError> {
        let entry = self.species(species)?;
        let names = if attacks.is_empty() {
            entry.moves.as_slice()
        } else {
            attacks
        };

        let mut combatant = Combatant::new(
            nickname.unwrap_or(entry.name.as_str()),
            entry.name.clone(),
            entry.kind,
            entry.max_hp,
            entry.stats,
        );
        for name in names {
            combatant.learn(self.attack(name)?)?;
        }
        Ok(combatant)
    }

    /// Roster of `size` distinct random species (clamped to 1..=6)
    pub fn random_roster(
        &self,
        size: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Combatant>, BattleError> {
        let size = size.clamp(1, MAX_ROSTER);
        self.species
            .choose_multiple(rng, size)
            .map(|s| self.spawn(&s.name, None))
            .collect()
    }

    /// Default bag handed to coaches that bring none
    pub fn starter_inventory(&self) -> Result<Vec<Item>, BattleError> {
        STARTER_BAG.iter().map(|name| self.item(name)).collect()
    }
}

fn convert_attack(raw: RawAttack) -> Result<Attack, BattleError> {
    let kind = ElementType::parse(&raw.kind)?;
    let mut attack = Attack::new(raw.name, kind, raw.category, raw.power, raw.accuracy, raw.pp);

    if let Some(code) = raw.status {
        let status = StatusCode::from_protocol(&code).ok_or_else(|| {
            BattleError::Catalog(format!("{} has unknown status {}", attack.name, code))
        })?;
        attack = attack.with_status(status, raw.effect_chance);
    }
    if let Some(boost) = raw.boost {
        attack = attack.with_boost(boost.stat, boost.amount);
    }
    Ok(attack)
}
