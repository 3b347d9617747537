//! Error types for the battle engine

use std::time::Duration;

use coliseum_protocol::PlayerSlot;
use thiserror::Error;

/// Errors raised by battle commands and catalog lookups
///
/// Every command validates before it mutates, so an `Err` always means the
/// arena is exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("Invalid roster index: {0}")]
    InvalidRosterIndex(usize),

    #[error("{0} has fainted")]
    TargetFainted(String),

    #[error("{0} is already at full health")]
    ItemOnFullHealth(String),

    #[error("Cannot use {item} on fainted {target}")]
    ItemOnFaintedTarget { item: String, target: String },

    #[error("Unknown attack: {0}")]
    UnknownAttack(String),

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("Unregistered elemental type: {0}")]
    UnregisteredType(String),

    #[error("No active combatant")]
    NoActiveCombatant,

    #[error("{0} is already active")]
    AlreadyActive(String),

    #[error("Roster is full")]
    RosterFull,

    #[error("{0} already knows four attacks")]
    MoveSlotsFull(String),

    #[error("{item} would have no effect on {target}")]
    ItemHasNoEffect { item: String, target: String },

    #[error("It is not {0}'s turn")]
    NotYourTurn(PlayerSlot),

    #[error("Battle is not in progress")]
    NotInProgress,

    #[error("Invalid setup: {0}")]
    InvalidSetup(String),

    #[error("Malformed catalog data: {0}")]
    Catalog(String),
}

impl BattleError {
    /// Configuration errors are fatal: they come from bad data, not bad input
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BattleError::UnregisteredType(_)
                | BattleError::UnknownSpecies(_)
                | BattleError::Catalog(_)
        )
    }
}

/// Failures of an external decision provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Decision provider is unreachable")]
    Unreachable,

    #[error("Decision provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors() {
        assert!(BattleError::UnregisteredType("Shadow".into()).is_configuration());
        assert!(BattleError::Catalog("bad json".into()).is_configuration());
        assert!(!BattleError::UnknownAttack("Splash".into()).is_configuration());
        assert!(!BattleError::InvalidRosterIndex(9).is_configuration());
    }

    #[test]
    fn test_error_messages() {
        let err = BattleError::ItemOnFaintedTarget {
            item: "Potion".into(),
            target: "Sparky".into(),
        };
        assert_eq!(err.to_string(), "Cannot use Potion on fainted Sparky");
        assert_eq!(
            BattleError::NotYourTurn(PlayerSlot::P2).to_string(),
            "It is not p2's turn"
        );
    }
}
