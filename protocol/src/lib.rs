use thiserror::Error;

pub mod command;
pub mod decision;
pub mod event;
pub mod slot;

pub use command::{Command, CommandMessage, parse_command, parse_command_message};
pub use decision::{CombatantInfo, DecisionChoice, DecisionRequest, DecisionResponse, SwitchOption};
pub use event::{BattleEvent, CombatantRef, parse_battle_event, parse_battle_log};
pub use slot::PlayerSlot;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Empty message")]
    EmptyMessage,
}
