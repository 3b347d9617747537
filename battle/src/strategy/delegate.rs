//! Strategy that asks an external decision provider
//!
//! The provider is consulted at most once per coach turn. Its answer is
//! checked against the legal options of the moment; anything it names that
//! is not legal, and any provider failure, falls back to a uniform random
//! pick among the legal options. A [`CircuitBreaker`] keeps a failing
//! provider from being hammered on every decision.

use coliseum_protocol::{
    CombatantInfo, DecisionChoice, DecisionRequest, DecisionResponse, SwitchOption,
};
use rand::RngCore;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{BattleView, Decision, DecisionPolicy, StrategyKind, pick_best};
use crate::combatant::Combatant;
use crate::error::ProviderError;

/// Remote source of decisions
///
/// Implementations may block up to their own timeout; the async runtime
/// calls automated turns from a blocking task.
pub trait DecisionProvider: Send {
    fn is_reachable(&self) -> bool;

    fn decide(&self, request: &DecisionRequest) -> Result<DecisionResponse, ProviderError>;
}

/// Provider that is never reachable
#[derive(Debug, Clone, Copy, Default)]
pub struct UnreachableProvider;

impl DecisionProvider for UnreachableProvider {
    fn is_reachable(&self) -> bool {
        false
    }

    fn decide(&self, _request: &DecisionRequest) -> Result<DecisionResponse, ProviderError> {
        Err(ProviderError::Unreachable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures that open the breaker
    pub failure_threshold: u32,
    /// Decisions skipped while open before a half-open probe
    pub cooldown_decisions: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_decisions: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open { skipped: u32 },
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    state: BreakerState,
    failures: u32,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            state: BreakerState::Closed,
            failures: 0,
        }
    }

    pub fn state(&self) -> BreakerState {
        self.state
    }

    /// Whether the provider may be called for this decision
    ///
    /// Each refused call while open counts toward the cooldown.
    pub fn allow(&mut self) -> bool {
        match self.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open { skipped } if skipped >= self.config.cooldown_decisions => {
                self.state = BreakerState::HalfOpen;
                true
            }
            BreakerState::Open { skipped } => {
                self.state = BreakerState::Open {
                    skipped: skipped + 1,
                };
                false
            }
        }
    }

    pub fn record_success(&mut self) {
        self.state = BreakerState::Closed;
        self.failures = 0;
    }

    pub fn record_failure(&mut self) {
        match self.state {
            BreakerState::HalfOpen => self.trip(),
            BreakerState::Closed => {
                self.failures += 1;
                if self.failures >= self.config.failure_threshold {
                    self.trip();
                }
            }
            BreakerState::Open { .. } => {}
        }
    }

    fn trip(&mut self) {
        self.state = BreakerState::Open { skipped: 0 };
        self.failures = 0;
    }
}

pub struct DelegatePolicy {
    provider: Box<dyn DecisionProvider>,
    breaker: CircuitBreaker,
    /// Provider answer for the turn it was requested on
    cached: Option<(u32, DecisionChoice)>,
}

impl DelegatePolicy {
    pub fn new(provider: Box<dyn DecisionProvider>, config: BreakerConfig) -> Self {
        Self {
            provider,
            breaker: CircuitBreaker::new(config),
            cached: None,
        }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Swap in a new provider; the breaker starts over closed
    pub fn set_provider(&mut self, provider: Box<dyn DecisionProvider>) {
        self.provider = provider;
        self.breaker.record_success();
        self.cached = None;
    }

    fn consult(&mut self, view: &BattleView<'_>) -> Option<DecisionChoice> {
        if let Some((turn, choice)) = &self.cached
            && *turn == view.turn
        {
            return Some(choice.clone());
        }
        if !self.breaker.allow() {
            tracing::debug!(
                target: "coliseum::strategy",
                player = %view.player,
                "Decision provider skipped while breaker is open"
            );
            return None;
        }

        let request = build_request(view)?;
        let result = if self.provider.is_reachable() {
            self.provider.decide(&request)
        } else {
            Err(ProviderError::Unreachable)
        };

        match result {
            Ok(response) => {
                self.breaker.record_success();
                self.cached = Some((view.turn, response.choice.clone()));
                Some(response.choice)
            }
            Err(e) => {
                self.breaker.record_failure();
                tracing::warn!(
                    target: "coliseum::strategy",
                    player = %view.player,
                    error = %e,
                    breaker = ?self.breaker.state(),
                    "Decision provider failed"
                );
                None
            }
        }
    }
}

fn combatant_info(c: &Combatant) -> CombatantInfo {
    CombatantInfo {
        name: c.name.clone(),
        species: c.species.clone(),
        kind: c.kind.as_str().to_string(),
        hp: c.hp(),
        max_hp: c.max_hp(),
        status: c.status().to_protocol().map(str::to_string),
    }
}

/// Describe the coach's situation and legal options to the provider
pub fn build_request(view: &BattleView<'_>) -> Option<DecisionRequest> {
    let active = view.active()?;
    let moves = view
        .usable_moves()
        .into_iter()
        .map(|(_, a)| a.name.clone())
        .collect();
    let switches = view
        .bench()
        .into_iter()
        .map(|(index, c)| SwitchOption {
            index,
            name: c.name.clone(),
        })
        .collect();
    let items = view
        .inventory
        .iter()
        .enumerate()
        .filter(|(i, _)| view.is_usable_item(*i))
        .map(|(_, item)| item.name.clone())
        .collect();

    Some(DecisionRequest {
        player: view.player,
        turn: view.turn,
        active: combatant_info(active),
        opponent: view.opponent.map(combatant_info),
        moves,
        switches,
        items,
    })
}

/// Every action the coach may legally take right now
///
/// A fainted active may only be replaced; with no opponent only attacks are
/// offered.
fn legal_options(view: &BattleView<'_>) -> Vec<Decision> {
    let Some(active) = view.active() else {
        return Vec::new();
    };
    let switches = view
        .bench()
        .into_iter()
        .map(|(index, _)| Decision::Switch { index });
    if active.is_fainted() {
        return switches.collect();
    }

    let mut options: Vec<Decision> = view
        .usable_moves()
        .into_iter()
        .map(|(slot, _)| Decision::Attack { slot })
        .collect();
    if view.opponent.is_none() {
        return options;
    }

    options.extend(switches);
    options.extend(
        (0..view.inventory.len())
            .filter(|i| view.is_usable_item(*i))
            .map(|index| Decision::UseItem { index }),
    );
    options
}

fn resolve_choice(choice: &DecisionChoice, view: &BattleView<'_>) -> Option<Decision> {
    match choice {
        DecisionChoice::Move { name } => view
            .active()?
            .find_attack(name)
            .map(|slot| Decision::Attack { slot }),
        DecisionChoice::Switch { index } => Some(Decision::Switch { index: *index }),
        DecisionChoice::Item { name } => view
            .inventory
            .iter()
            .enumerate()
            .position(|(i, item)| {
                item.name.eq_ignore_ascii_case(name.trim()) && view.is_usable_item(i)
            })
            .map(|index| Decision::UseItem { index }),
    }
}

impl DecisionPolicy for DelegatePolicy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Delegate
    }

    fn select_move(&mut self, view: &BattleView<'_>, rng: &mut dyn RngCore) -> Option<usize> {
        view.usable_moves().choose(rng).map(|(slot, _)| *slot)
    }

    fn select_best_pokemon(
        &mut self,
        view: &BattleView<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        if let Some(DecisionChoice::Switch { index }) = self.consult(view)
            && view.is_valid_switch(index)
        {
            return Some(index);
        }
        pick_best(view.bench().into_iter().map(|(i, c)| (i, c.hp_ratio())), rng)
    }

    fn should_switch(&mut self, _view: &BattleView<'_>, _rng: &mut dyn RngCore) -> bool {
        false
    }

    fn should_use_item(&mut self, _view: &BattleView<'_>, _rng: &mut dyn RngCore) -> bool {
        false
    }

    fn select_item(&mut self, _view: &BattleView<'_>, _rng: &mut dyn RngCore) -> Option<usize> {
        None
    }

    fn decide(&mut self, view: &BattleView<'_>, rng: &mut dyn RngCore) -> Decision {
        let options = legal_options(view);
        if options.is_empty() {
            return Decision::Wait;
        }

        if let Some(choice) = self.consult(view) {
            match resolve_choice(&choice, view) {
                Some(decision) if options.contains(&decision) => return decision,
                _ => tracing::warn!(
                    target: "coliseum::strategy",
                    player = %view.player,
                    choice = ?choice,
                    "Provider named an invalid option, picking at random"
                ),
            }
        }

        options.choose(rng).copied().unwrap_or(Decision::Wait)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::rng::seeded;
    use crate::strategy::tests::{assert_always_legal, bag, ember, fighter, surf, tackle, view};
    use crate::types::ElementType;

    /// Provider that replays a fixed answer and counts calls
    struct ScriptedProvider {
        answer: Result<DecisionChoice, ProviderError>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedProvider {
        fn boxed(answer: Result<DecisionChoice, ProviderError>) -> (Box<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let provider = Box::new(Self {
                answer,
                calls: calls.clone(),
            });
            (provider, calls)
        }
    }

    impl DecisionProvider for ScriptedProvider {
        fn is_reachable(&self) -> bool {
            true
        }

        fn decide(&self, _request: &DecisionRequest) -> Result<DecisionResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone().map(DecisionResponse::new)
        }
    }

    #[test]
    fn test_always_legal() {
        assert_always_legal(StrategyKind::Delegate);
    }

    #[test]
    fn test_follows_valid_provider_choice() {
        let roster = vec![
            fighter("Lead", ElementType::Fire, vec![tackle(), ember()]),
            fighter("Back", ElementType::Water, vec![surf()]),
        ];
        let foe = fighter("Foe", ElementType::Grass, vec![tackle()]);
        let mut rng = seeded(1);

        let (provider, _) = ScriptedProvider::boxed(Ok(DecisionChoice::Move {
            name: "ember".into(),
        }));
        let mut policy = DelegatePolicy::new(provider, BreakerConfig::default());
        let decision = policy.decide(&view(&roster, &[], Some(&foe), 0), rng.as_mut());
        assert_eq!(decision, Decision::Attack { slot: 1 });

        let (provider, _) = ScriptedProvider::boxed(Ok(DecisionChoice::Switch { index: 1 }));
        let mut policy = DelegatePolicy::new(provider, BreakerConfig::default());
        let decision = policy.decide(&view(&roster, &[], Some(&foe), 0), rng.as_mut());
        assert_eq!(decision, Decision::Switch { index: 1 });
    }

    #[test]
    fn test_invalid_choice_falls_back_to_legal_option() {
        let roster = vec![fighter("Lead", ElementType::Fire, vec![ember()])];
        let foe = fighter("Foe", ElementType::Grass, vec![tackle()]);
        let inventory = bag();
        let mut rng = seeded(1);

        for choice in [
            DecisionChoice::Move { name: "Hyper Beam".into() },
            DecisionChoice::Switch { index: 4 },
            DecisionChoice::Item { name: "Potion".into() },
        ] {
            let (provider, _) = ScriptedProvider::boxed(Ok(choice));
            let mut policy = DelegatePolicy::new(provider, BreakerConfig::default());
            let v = view(&roster, &inventory, Some(&foe), 0);

            // Potion is not usable at full HP; boosters are
            match policy.decide(&v, rng.as_mut()) {
                Decision::Attack { slot } => assert_eq!(slot, 0),
                Decision::UseItem { index } => assert!(index == 1 || index == 2),
                other => panic!("unexpected fallback {other:?}"),
            }
        }
    }

    #[test]
    fn test_one_request_per_turn() {
        let roster = vec![fighter("Lead", ElementType::Fire, vec![ember()])];
        let foe = fighter("Foe", ElementType::Grass, vec![tackle()]);
        let mut rng = seeded(1);

        let (provider, calls) = ScriptedProvider::boxed(Ok(DecisionChoice::Move {
            name: "Ember".into(),
        }));
        let mut policy = DelegatePolicy::new(provider, BreakerConfig::default());

        policy.decide(&view(&roster, &[], Some(&foe), 3), rng.as_mut());
        policy.decide(&view(&roster, &[], Some(&foe), 3), rng.as_mut());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        policy.decide(&view(&roster, &[], Some(&foe), 4), rng.as_mut());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_breaker_opens_then_probes() {
        let config = BreakerConfig {
            failure_threshold: 3,
            cooldown_decisions: 2,
        };
        let mut breaker = CircuitBreaker::new(config);

        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Closed);
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open { skipped: 0 });

        assert!(!breaker.allow());
        assert!(!breaker.allow());
        assert!(breaker.allow());
        assert_eq!(breaker.state(), BreakerState::HalfOpen);

        // A failed probe reopens immediately
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open { skipped: 0 });

        assert!(!breaker.allow());
        assert!(!breaker.allow());
        assert!(breaker.allow());
        breaker.record_success();
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn test_success_resets_failure_count() {
        let mut breaker = CircuitBreaker::new(BreakerConfig::default());
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn test_failing_provider_is_skipped_while_open() {
        let roster = vec![fighter("Lead", ElementType::Fire, vec![ember()])];
        let foe = fighter("Foe", ElementType::Grass, vec![tackle()]);
        let mut rng = seeded(1);

        let (provider, calls) =
            ScriptedProvider::boxed(Err(ProviderError::Transport("connection reset".into())));
        let mut policy = DelegatePolicy::new(
            provider,
            BreakerConfig {
                failure_threshold: 2,
                cooldown_decisions: 3,
            },
        );

        for turn in 0..6 {
            let decision = policy.decide(&view(&roster, &[], Some(&foe), turn), rng.as_mut());
            assert_eq!(decision, Decision::Attack { slot: 0 });
        }
        // Two failures open the breaker, three turns are skipped, the sixth probes
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(policy.breaker().state(), BreakerState::Open { skipped: 0 });
    }

    #[test]
    fn test_request_lists_legal_options() {
        let mut roster = vec![
            fighter("Lead", ElementType::Fire, vec![tackle(), ember()]),
            fighter("Back", ElementType::Water, vec![surf()]),
            fighter("Down", ElementType::Grass, vec![tackle()]),
        ];
        roster[0].take_damage(50);
        roster[2].take_damage(500);
        let foe = fighter("Foe", ElementType::Grass, vec![tackle()]);
        let inventory = bag();

        let request = build_request(&view(&roster, &inventory, Some(&foe), 2)).unwrap();
        assert_eq!(request.turn, 2);
        assert_eq!(request.active.hp, 150);
        assert_eq!(request.active.kind, "Fire");
        assert_eq!(request.moves, vec!["Tackle", "Ember"]);
        assert_eq!(
            request.switches,
            vec![SwitchOption {
                index: 1,
                name: "Back".into()
            }]
        );
        assert_eq!(request.items, vec!["Potion", "X Attack", "X Defense"]);
        assert_eq!(request.opponent.map(|o| o.name), Some("Foe".to_string()));
    }
}
