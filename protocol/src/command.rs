//! Commands that coaches send to the arena

use crate::{ParseError, PlayerSlot};

/// Commands a coach can issue on its turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// /attack MOVE[, self]
    Attack { move_name: String, target_self: bool },

    /// /item ITEM[, SLOT]
    ///
    /// `target` is a roster index; `None` targets the active combatant.
    UseItem { item: String, target: Option<usize> },

    /// /switch SLOT
    ///
    /// Stored 0-indexed; the wire format is 1-indexed.
    Switch(usize),

    /// /flee
    Flee,
}

impl Command {
    /// Serialize command to protocol format
    pub fn to_protocol_string(&self) -> String {
        match self {
            Self::Attack {
                move_name,
                target_self: false,
            } => format!("/attack {}", move_name),
            Self::Attack {
                move_name,
                target_self: true,
            } => format!("/attack {}, self", move_name),
            Self::UseItem { item, target: None } => format!("/item {}", item),
            Self::UseItem {
                item,
                target: Some(index),
            } => format!("/item {}, {}", item, index + 1),
            Self::Switch(index) => format!("/switch {}", index + 1),
            Self::Flee => "/flee".to_string(),
        }
    }
}

/// Command with the issuing player attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage {
    pub player: PlayerSlot,
    pub command: Command,
}

impl CommandMessage {
    pub fn new(player: PlayerSlot, command: Command) -> Self {
        Self { player, command }
    }

    /// Serialize to wire format: PLAYER|COMMAND
    pub fn to_wire_format(&self) -> String {
        format!("{}|{}", self.player.as_str(), self.command.to_protocol_string())
    }
}

/// Parse a wire line like `p1|/switch 2`
pub fn parse_command_message(line: &str) -> Result<CommandMessage, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::EmptyMessage);
    }

    let (player, text) = line
        .split_once('|')
        .ok_or_else(|| ParseError::InvalidFormat(format!("missing player prefix: {}", line)))?;
    let player = PlayerSlot::parse(player.trim())
        .ok_or_else(|| ParseError::InvalidFormat(format!("unknown player: {}", player)))?;

    Ok(CommandMessage {
        player,
        command: parse_command(text)?,
    })
}

/// Parse the command part of a wire line (`/attack Tackle`)
pub fn parse_command(text: &str) -> Result<Command, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::EmptyMessage);
    }

    let body = text
        .strip_prefix('/')
        .ok_or_else(|| ParseError::InvalidFormat(format!("commands start with '/': {}", text)))?;
    let (verb, args) = match body.split_once(' ') {
        Some((verb, args)) => (verb, args.trim()),
        None => (body, ""),
    };

    match verb {
        "attack" => parse_attack(args),
        "item" => parse_item(args),
        "switch" => Ok(Command::Switch(parse_slot(args, "switch slot")?)),
        "flee" => Ok(Command::Flee),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn parse_attack(args: &str) -> Result<Command, ParseError> {
    let mut parts = args.split(',').map(str::trim);
    let move_name = parts
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ParseError::MissingField("move name".to_string()))?;

    let target_self = match parts.next() {
        None => false,
        Some("self") => true,
        Some("foe") => false,
        Some(other) => {
            return Err(ParseError::InvalidFormat(format!(
                "unknown attack target: {}",
                other
            )));
        }
    };

    Ok(Command::Attack {
        move_name: move_name.to_string(),
        target_self,
    })
}

fn parse_item(args: &str) -> Result<Command, ParseError> {
    let mut parts = args.split(',').map(str::trim);
    let item = parts
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ParseError::MissingField("item name".to_string()))?;

    let target = match parts.next() {
        Some(slot) => Some(parse_slot(slot, "item target slot")?),
        None => None,
    };

    Ok(Command::UseItem {
        item: item.to_string(),
        target,
    })
}

/// Parse a 1-indexed slot into a 0-indexed one
fn parse_slot(s: &str, field: &str) -> Result<usize, ParseError> {
    if s.is_empty() {
        return Err(ParseError::MissingField(field.to_string()));
    }
    match s.parse::<usize>() {
        Ok(0) | Err(_) => Err(ParseError::InvalidFormat(format!("{}: {}", field, s))),
        Ok(n) => Ok(n - 1),
    }
}
