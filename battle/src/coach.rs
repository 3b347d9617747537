//! Battle participants
//!
//! A [`Coach`] owns a roster, an inventory and the index of its active
//! combatant. Whether it is played by a person or by a [`DecisionPolicy`] is
//! decided by its [`Controller`]; the arena treats both the same except that
//! it asks automated coaches for their moves.

use std::fmt;

use coliseum_protocol::PlayerSlot;
use rand::RngCore;

use crate::catalog::MAX_ROSTER;
use crate::combatant::Combatant;
use crate::item::{Item, ItemEffect};
use crate::strategy::{BattleView, Decision, DecisionPolicy, StrategyKind, build_policy};
use crate::BattleError;

/// Who makes a coach's decisions
pub enum Controller {
    Human,
    Automated(Box<dyn DecisionPolicy>),
}

impl Controller {
    pub fn automated(kind: StrategyKind) -> Self {
        Controller::Automated(build_policy(kind))
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Controller::Human => f.write_str("Human"),
            Controller::Automated(policy) => write!(f, "Automated({})", policy.kind()),
        }
    }
}

#[derive(Debug)]
pub struct Coach {
    pub name: String,
    pub color: String,
    roster: Vec<Combatant>,
    active: usize,
    inventory: Vec<Item>,
    fled: bool,
    score: u32,
    turns_taken: u32,
    /// `turns_taken` when the last voluntary switch was made
    last_switch_turn: Option<u32>,
    controller: Controller,
}

impl Coach {
    pub fn new(name: impl Into<String>, controller: Controller) -> Self {
        Self {
            name: name.into(),
            color: String::from("white"),
            roster: Vec::new(),
            active: 0,
            inventory: Vec::new(),
            fled: false,
            score: 0,
            turns_taken: 0,
            last_switch_turn: None,
            controller,
        }
    }

    pub fn human(name: impl Into<String>) -> Self {
        Self::new(name, Controller::Human)
    }

    pub fn automated(name: impl Into<String>, kind: StrategyKind) -> Self {
        Self::new(name, Controller::automated(kind))
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_roster(mut self, roster: Vec<Combatant>) -> Self {
        self.roster = roster;
        self.active = 0;
        self
    }

    pub fn with_inventory(mut self, inventory: Vec<Item>) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn roster(&self) -> &[Combatant] {
        &self.roster
    }

    pub fn inventory(&self) -> &[Item] {
        &self.inventory
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn has_fled(&self) -> bool {
        self.fled
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    pub fn last_switch_turn(&self) -> Option<u32> {
        self.last_switch_turn
    }

    /// The previous turn of this coach was spent switching
    pub fn just_switched(&self) -> bool {
        self.last_switch_turn
            .is_some_and(|turn| turn + 1 == self.turns_taken)
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn set_controller(&mut self, controller: Controller) {
        self.controller = controller;
    }

    pub fn is_automated(&self) -> bool {
        matches!(self.controller, Controller::Automated(_))
    }

    pub fn strategy_kind(&self) -> Option<StrategyKind> {
        match &self.controller {
            Controller::Human => None,
            Controller::Automated(policy) => Some(policy.kind()),
        }
    }

    pub fn add_to_roster(&mut self, combatant: Combatant) -> Result<(), BattleError> {
        if self.roster.len() >= MAX_ROSTER {
            return Err(BattleError::RosterFull);
        }
        self.roster.push(combatant);
        Ok(())
    }

    /// Active combatant, fainted or not
    pub fn active(&self) -> Result<&Combatant, BattleError> {
        self.roster.get(self.active).ok_or(BattleError::NoActiveCombatant)
    }

    pub fn active_mut(&mut self) -> Result<&mut Combatant, BattleError> {
        self.roster
            .get_mut(self.active)
            .ok_or(BattleError::NoActiveCombatant)
    }

    /// Active combatant if it can still act
    pub fn conscious_active(&self) -> Result<&Combatant, BattleError> {
        self.active().and_then(|c| {
            if c.is_fainted() {
                Err(BattleError::NoActiveCombatant)
            } else {
                Ok(c)
            }
        })
    }

    /// Validate a switch to `index` without performing it
    pub fn check_switch(&self, index: usize) -> Result<(), BattleError> {
        let target = self
            .roster
            .get(index)
            .ok_or(BattleError::InvalidRosterIndex(index))?;
        if target.is_fainted() {
            return Err(BattleError::TargetFainted(target.name.clone()));
        }
        if index == self.active {
            return Err(BattleError::AlreadyActive(target.name.clone()));
        }
        Ok(())
    }

    pub fn switch_to(&mut self, index: usize) -> Result<&Combatant, BattleError> {
        self.check_switch(index)?;
        self.active = index;
        Ok(&self.roster[index])
    }

    /// Switch that spends this coach's turn
    pub fn switch_voluntarily(&mut self, index: usize) -> Result<&Combatant, BattleError> {
        self.check_switch(index)?;
        self.last_switch_turn = Some(self.turns_taken);
        self.active = index;
        Ok(&self.roster[index])
    }

    pub fn add_item(&mut self, item: Item) {
        self.inventory.push(item);
    }

    /// Remove the first item called `name`
    pub fn take_item(&mut self, name: &str) -> Result<Item, BattleError> {
        let index = self.find_item(name)?;
        Ok(self.inventory.remove(index))
    }

    fn find_item(&self, name: &str) -> Result<usize, BattleError> {
        self.inventory
            .iter()
            .position(|i| i.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| BattleError::UnknownItem(name.to_string()))
    }

    /// Use an item on a roster member (the active combatant by default)
    ///
    /// The item is consumed only when it takes effect. Returns the index it
    /// was used on with what it did.
    pub fn use_item(
        &mut self,
        name: &str,
        target: Option<usize>,
    ) -> Result<(usize, Item, ItemEffect), BattleError> {
        let position = self.find_item(name)?;
        let target = target.unwrap_or(self.active);
        let combatant = self
            .roster
            .get_mut(target)
            .ok_or(BattleError::InvalidRosterIndex(target))?;

        let effect = self.inventory[position].apply(combatant)?;
        let item = self.inventory.remove(position);
        Ok((target, item, effect))
    }

    /// Penalty for letting the turn timer run out
    pub fn on_turn_timeout(&mut self) {
        if let Ok(active) = self.active_mut() {
            active.drain_pp(1);
        }
    }

    pub fn record_turn(&mut self) {
        self.turns_taken += 1;
    }

    pub fn add_point(&mut self) {
        self.score += 1;
    }

    pub fn alive_names(&self) -> Vec<String> {
        self.roster
            .iter()
            .filter(|c| !c.is_fainted())
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn fainted_names(&self) -> Vec<String> {
        self.roster
            .iter()
            .filter(|c| c.is_fainted())
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn item_names(&self) -> Vec<String> {
        self.inventory.iter().map(|i| i.name.clone()).collect()
    }

    pub fn is_defeated(&self) -> bool {
        self.roster.iter().all(Combatant::is_fainted)
    }

    pub fn first_alive(&self) -> Option<usize> {
        self.roster.iter().position(|c| !c.is_fainted())
    }

    /// Give up: every combatant drops to 0 HP
    pub fn forfeit(&mut self) {
        self.fled = true;
        for combatant in &mut self.roster {
            let hp = combatant.hp();
            combatant.take_damage(hp);
        }
    }

    /// Replace the whole roster and bring in its first member
    pub(crate) fn replace_roster(&mut self, roster: Vec<Combatant>) {
        self.roster = roster;
        self.active = 0;
        self.last_switch_turn = None;
    }

    pub(crate) fn restore_state(
        &mut self,
        active: usize,
        fled: bool,
        score: u32,
        turns_taken: u32,
        last_switch_turn: Option<u32>,
    ) {
        self.active = active;
        self.fled = fled;
        self.score = score;
        self.turns_taken = turns_taken;
        self.last_switch_turn = last_switch_turn;
    }

    /// Ask the policy for an action; `None` for human coaches
    pub fn decide(
        &mut self,
        player: PlayerSlot,
        opponent: Option<&Combatant>,
        rng: &mut dyn RngCore,
    ) -> Option<Decision> {
        let just_switched = self.just_switched();
        let Controller::Automated(policy) = &mut self.controller else {
            return None;
        };
        let view = BattleView {
            player,
            roster: &self.roster,
            active: self.active,
            inventory: &self.inventory,
            opponent,
            turn: self.turns_taken,
            just_switched,
        };
        Some(policy.decide(&view, rng))
    }

    /// Replacement for a fainted active combatant, always a legal index
    ///
    /// Automated coaches ask their policy; anything it returns that is not
    /// a legal switch falls back to the first conscious bench member.
    pub fn select_replacement(
        &mut self,
        player: PlayerSlot,
        opponent: Option<&Combatant>,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        let view = BattleView {
            player,
            roster: &self.roster,
            active: self.active,
            inventory: &self.inventory,
            opponent,
            turn: self.turns_taken,
            just_switched: self.just_switched(),
        };
        let picked = match &mut self.controller {
            Controller::Automated(policy) => policy.select_best_pokemon(&view, rng),
            Controller::Human => None,
        };

        picked
            .filter(|i| view.is_valid_switch(*i))
            .or_else(|| view.bench().first().map(|(i, _)| *i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::tests::create_test_combatant;
    use crate::item::ItemTarget;
    use crate::rng::seeded;
    use crate::types::ElementType;

    fn coach_with_three() -> Coach {
        Coach::human("Ash").with_roster(vec![
            create_test_combatant("Sparky", ElementType::Electric, 100),
            create_test_combatant("Shelly", ElementType::Water, 100),
            create_test_combatant("Leafy", ElementType::Grass, 100),
        ])
    }

    #[test]
    fn test_switch_out_of_range_keeps_active() {
        let mut coach = coach_with_three();
        assert_eq!(
            coach.switch_to(7).unwrap_err(),
            BattleError::InvalidRosterIndex(7)
        );
        assert_eq!(coach.active_index(), 0);
    }

    #[test]
    fn test_switch_to_fainted_and_active() {
        let mut coach = coach_with_three();
        coach.roster[2].take_damage(100);

        assert_eq!(
            coach.switch_to(2).unwrap_err(),
            BattleError::TargetFainted("Leafy".into())
        );
        assert_eq!(
            coach.switch_to(0).unwrap_err(),
            BattleError::AlreadyActive("Sparky".into())
        );
        assert_eq!(coach.switch_to(1).unwrap().name, "Shelly");
        assert_eq!(coach.active_index(), 1);
    }

    #[test]
    fn test_roster_limit() {
        let mut coach = Coach::human("Ash");
        for i in 0..MAX_ROSTER {
            coach
                .add_to_roster(create_test_combatant(&format!("C{i}"), ElementType::Normal, 50))
                .unwrap();
        }
        assert_eq!(
            coach.add_to_roster(create_test_combatant("Extra", ElementType::Normal, 50)),
            Err(BattleError::RosterFull)
        );
    }

    #[test]
    fn test_item_consumed_only_on_success() {
        let mut coach = coach_with_three().with_inventory(vec![
            Item::new("Potion", 20, ItemTarget::Hp),
            Item::new("Revive", 50, ItemTarget::Revive),
        ]);

        assert_eq!(
            coach.use_item("Potion", None).unwrap_err(),
            BattleError::ItemOnFullHealth("Sparky".into())
        );
        assert_eq!(coach.item_names(), vec!["Potion", "Revive"]);

        coach.roster[2].take_damage(100);
        let (target, item, effect) = coach.use_item("revive", Some(2)).unwrap();
        assert_eq!(target, 2);
        assert_eq!(item.name, "Revive");
        assert_eq!(effect, ItemEffect::Revived(50));
        assert_eq!(coach.item_names(), vec!["Potion"]);

        assert_eq!(
            coach.use_item("Ether", None).unwrap_err(),
            BattleError::UnknownItem("Ether".into())
        );
        assert_eq!(
            coach.use_item("Potion", Some(9)).unwrap_err(),
            BattleError::InvalidRosterIndex(9)
        );
    }

    #[test]
    fn test_timeout_drains_active_pp() {
        let mut coach = coach_with_three();
        coach.on_turn_timeout();

        let active = coach.active().unwrap();
        assert_eq!(active.attack(0).unwrap().pp, 34);
        assert_eq!(active.attack(1).unwrap().pp, 39);
        assert_eq!(coach.roster()[1].attack(0).unwrap().pp, 35);
    }

    #[test]
    fn test_forfeit_faints_everyone() {
        let mut coach = coach_with_three();
        coach.forfeit();

        assert!(coach.has_fled());
        assert!(coach.is_defeated());
        assert!(coach.roster().iter().all(|c| c.hp() == 0));
        assert_eq!(coach.fainted_names().len(), 3);
        assert!(coach.alive_names().is_empty());
    }

    #[test]
    fn test_human_coach_never_decides() {
        let mut coach = coach_with_three();
        let mut rng = seeded(1);
        assert!(!coach.is_automated());
        assert_eq!(coach.decide(PlayerSlot::P1, None, rng.as_mut()), None);
    }

    #[test]
    fn test_replacement_is_conscious() {
        let mut coach = Coach::automated("Gary", StrategyKind::Defensive).with_roster(vec![
            create_test_combatant("Down", ElementType::Fire, 100),
            create_test_combatant("Also Down", ElementType::Fire, 100),
            create_test_combatant("Up", ElementType::Water, 100),
        ]);
        coach.roster[0].take_damage(100);
        coach.roster[1].take_damage(100);
        let mut rng = seeded(1);

        assert_eq!(coach.strategy_kind(), Some(StrategyKind::Defensive));
        assert_eq!(
            coach.select_replacement(PlayerSlot::P2, None, rng.as_mut()),
            Some(2)
        );
    }

    #[test]
    fn test_controller_debug() {
        assert_eq!(format!("{:?}", Controller::Human), "Human");
        assert_eq!(
            format!("{:?}", Controller::automated(StrategyKind::Expert)),
            "Automated(expert)"
        );
    }
}
