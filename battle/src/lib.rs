//! Turn-based combat engine.
//!
//! This crate holds the whole battle model: the type chart, attacks and
//! damage, the status effect chain, coaches with their rosters and
//! inventories, the automated decision strategies, and the arena state
//! machine that ties them together.
//!
//! # Overview
//!
//! `coliseum-battle` sits between `coliseum-protocol` (wire formats) and the
//! drivers built on top of it:
//!
//! ```text
//! coliseum-protocol (commands, events, provider JSON)
//!        │
//!        ▼
//! coliseum-battle (combat model + arena) ← THIS CRATE
//!        │
//!        ├─> coliseum-team (team import/export)
//!        └─> coliseum-runtime (async driver, HTTP provider)
//! ```
//!
//! # Main Types
//!
//! ## Combat model
//! - [`ElementType`] - Elemental types with the effectiveness chart
//! - [`Attack`] - Physical, special and status attacks; [`attack::resolve`]
//! - [`EffectChain`] - Ordered status effects applied to a stat snapshot
//! - [`Combatant`] - HP, stats, moves and effects of one creature
//! - [`Item`] - Healing, boosting, reviving and curing consumables
//! - [`Catalog`] - Immutable species/attack/item tables
//!
//! ## Participants and decisions
//! - [`Coach`] - Roster, inventory and controller of one side
//! - [`DecisionPolicy`] - Contract every automated strategy implements
//! - [`StrategyKind`] - Attacking, defensive, changing, expert, delegate
//!
//! ## Orchestration
//! - [`Arena`] - The turn state machine
//! - [`ArenaSnapshot`] - Serializable deep copy of a battle
//!
//! # Example Usage
//!
//! ```ignore
//! use coliseum_battle::{Arena, ArenaConfig, BattleMode, Catalog, Coach, StrategyKind};
//! use coliseum_protocol::PlayerSlot;
//!
//! let catalog = Catalog::builtin()?;
//! let ash = Coach::human("Ash").with_roster(vec![catalog.spawn("Pikachu", Some("Sparky"))?]);
//! let gary = Coach::automated("Gary", StrategyKind::Expert)
//!     .with_roster(vec![catalog.spawn("Squirtle", None)?]);
//!
//! let mut arena = Arena::new(ArenaConfig::default());
//! arena.configure(BattleMode::HumanVsAutomated, ash, gary)?;
//!
//! if arena.current_turn() == PlayerSlot::P1 {
//!     arena.attack("Thunderbolt", false, PlayerSlot::P1)?;
//! }
//! arena.run_automated_turn();
//! ```

pub mod arena;
pub mod attack;
pub mod catalog;
pub mod coach;
pub mod combatant;
pub mod effects;
mod error;
pub mod item;
pub mod query;
pub mod rng;
pub mod strategy;
pub mod types;

pub use arena::{
    ActiveSummary, Arena, ArenaConfig, ArenaPhase, ArenaSnapshot, BattleMode, BattleResult,
    CoachSnapshot, MoveSummary, TurnTimer,
};
pub use attack::{Attack, Category, StatBoost, Strike, StrikeOutcome};
pub use catalog::{Catalog, MAX_ROSTER, Species};
pub use coach::{Coach, Controller};
pub use combatant::{Combatant, MAX_ATTACKS};
pub use effects::{EffectChain, StatusEffect};
pub use error::{BattleError, ProviderError};
pub use item::{Item, ItemEffect, ItemTarget};
pub use rng::ArenaRng;
pub use strategy::{
    BattleView, BreakerConfig, CircuitBreaker, Decision, DecisionPolicy, DecisionProvider,
    DelegatePolicy, StrategyKind, UnreachableProvider, build_policy,
};
pub use types::{ElementType, StatKind, Stats, StatusCode, TYPE_CHART, effectiveness};

// Re-export the protocol types that appear in this crate's API
pub use coliseum_protocol::{BattleEvent, CombatantRef, PlayerSlot};
