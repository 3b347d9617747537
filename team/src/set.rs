//! Team sets: what a coach brings to the arena before anything is spawned

use coliseum_battle::{Catalog, Combatant, Item, MAX_ATTACKS, MAX_ROSTER};
use serde::{Deserialize, Serialize};

use crate::TeamError;

/// One roster entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSet {
    pub species: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    /// Empty means the species' default moves
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub moves: Vec<String>,
}

impl MemberSet {
    pub fn new(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            nickname: None,
            moves: Vec::new(),
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn with_moves<S: Into<String>>(mut self, moves: impl IntoIterator<Item = S>) -> Self {
        self.moves = moves.into_iter().map(Into::into).collect();
        self
    }

    /// Nickname if set, species otherwise
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.species)
    }

    fn spawn(&self, catalog: &Catalog) -> Result<Combatant, TeamError> {
        Ok(catalog.spawn_with_attacks(&self.species, self.nickname.as_deref(), &self.moves)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSet {
    pub members: Vec<MemberSet>,

    /// Item names, duplicates allowed
    #[serde(default)]
    pub bag: Vec<String>,
}

impl TeamSet {
    pub fn new(members: Vec<MemberSet>) -> Self {
        Self {
            members,
            bag: Vec::new(),
        }
    }

    pub fn with_bag<S: Into<String>>(mut self, bag: impl IntoIterator<Item = S>) -> Self {
        self.bag = bag.into_iter().map(Into::into).collect();
        self
    }

    /// Describe an existing roster and inventory
    ///
    /// A member only gets a nickname when its name differs from its species.
    pub fn from_roster(roster: &[Combatant], inventory: &[Item]) -> Self {
        let members = roster
            .iter()
            .map(|c| MemberSet {
                species: c.species.clone(),
                nickname: (c.name != c.species).then(|| c.name.clone()),
                moves: c.attacks().iter().map(|a| a.name.clone()).collect(),
            })
            .collect();

        Self {
            members,
            bag: inventory.iter().map(|i| i.name.clone()).collect(),
        }
    }

    /// Check the size limits; no catalog lookups
    pub fn validate(&self) -> Result<(), TeamError> {
        if self.members.is_empty() {
            return Err(TeamError::Empty);
        }
        if self.members.len() > MAX_ROSTER {
            return Err(TeamError::TooManyMembers(self.members.len()));
        }
        if let Some(member) = self.members.iter().find(|m| m.moves.len() > MAX_ATTACKS) {
            return Err(TeamError::TooManyMoves {
                member: member.display_name().to_string(),
                count: member.moves.len(),
            });
        }
        Ok(())
    }

    /// Spawn the roster and fill the bag from the catalog
    pub fn build(&self, catalog: &Catalog) -> Result<(Vec<Combatant>, Vec<Item>), TeamError> {
        self.validate()?;

        let roster = self
            .members
            .iter()
            .map(|m| m.spawn(catalog))
            .collect::<Result<Vec<_>, _>>()?;
        let inventory = self
            .bag
            .iter()
            .map(|name| catalog.item(name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((roster, inventory))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
