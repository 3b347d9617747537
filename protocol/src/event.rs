//! Battle event log lines
//!
//! Every state change in the arena is recorded as a pipe-delimited line,
//! e.g. `|move|p1a: Sparky|Thunderbolt|p2a: Squirt`. Minor effects carry a
//! leading dash (`|-damage|...`), and optional tags are bracketed
//! (`[miss]`, `[from] brn`).

use crate::{ParseError, PlayerSlot};

/// Combatant identifier in the form "p1a: NAME"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CombatantRef {
    pub player: PlayerSlot,
    pub name: String,
}

impl CombatantRef {
    pub fn new(player: PlayerSlot, name: impl Into<String>) -> Self {
        Self {
            player,
            name: name.into(),
        }
    }

    /// Parse an identifier like "p1a: Pikachu" or "p2: Squirtle"
    pub fn parse(s: &str) -> Option<Self> {
        let (pos_part, name) = s.split_once(": ")?;
        let player = PlayerSlot::parse(pos_part.get(..2)?)?;
        if name.is_empty() {
            return None;
        }

        Some(Self {
            player,
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for CombatantRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}a: {}", self.player.as_str(), self.name)
    }
}

/// One entry of the battle log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleEvent {
    /// |start
    Start,

    /// |player|PLAYER|NAME|COLOR
    Player {
        player: PlayerSlot,
        name: String,
        color: String,
    },

    /// |turn|NUMBER
    Turn(u32),

    /// |switch|POKEMON|SPECIES|HP/MAX
    Switch {
        combatant: CombatantRef,
        species: String,
        hp: u32,
        max_hp: u32,
    },

    /// |move|POKEMON|MOVE|TARGET with optional [miss]
    Move {
        source: CombatantRef,
        move_name: String,
        target: CombatantRef,
        miss: bool,
    },

    /// |-damage|POKEMON|HP/MAX with optional [from] SOURCE
    Damage {
        target: CombatantRef,
        hp: u32,
        max_hp: u32,
        source: Option<String>,
    },

    /// |-heal|POKEMON|HP/MAX with optional [from] SOURCE
    Heal {
        target: CombatantRef,
        hp: u32,
        max_hp: u32,
        source: Option<String>,
    },

    /// |-boost|POKEMON|STAT|AMOUNT
    Boost {
        target: CombatantRef,
        stat: String,
        amount: u32,
    },

    /// |-status|POKEMON|STATUS
    Status {
        target: CombatantRef,
        status: String,
    },

    /// |-curestatus|POKEMON|STATUS
    CureStatus {
        target: CombatantRef,
        status: String,
    },

    /// |cant|POKEMON|REASON
    Cant {
        combatant: CombatantRef,
        reason: String,
    },

    /// |-supereffective|POKEMON
    SuperEffective(CombatantRef),

    /// |-resisted|POKEMON
    Resisted(CombatantRef),

    /// |-immune|POKEMON
    Immune(CombatantRef),

    /// |-item|POKEMON|ITEM
    UseItem { target: CombatantRef, item: String },

    /// |faint|POKEMON
    Faint(CombatantRef),

    /// |timeout|PLAYER
    Timeout(PlayerSlot),

    /// |pause
    Pause,

    /// |resume
    Resume,

    /// |flee|PLAYER
    Flee(PlayerSlot),

    /// |win|PLAYER
    Win(PlayerSlot),

    /// |tie
    Tie,
}

impl BattleEvent {
    /// Serialize the event to its log line
    pub fn to_protocol_string(&self) -> String {
        match self {
            Self::Start => "|start".to_string(),
            Self::Player {
                player,
                name,
                color,
            } => format!("|player|{}|{}|{}", player, name, color),
            Self::Turn(turn) => format!("|turn|{}", turn),
            Self::Switch {
                combatant,
                species,
                hp,
                max_hp,
            } => format!("|switch|{}|{}|{}/{}", combatant, species, hp, max_hp),
            Self::Move {
                source,
                move_name,
                target,
                miss,
            } => {
                let mut line = format!("|move|{}|{}|{}", source, move_name, target);
                if *miss {
                    line.push_str("|[miss]");
                }
                line
            }
            Self::Damage {
                target,
                hp,
                max_hp,
                source,
            } => with_source(format!("|-damage|{}|{}/{}", target, hp, max_hp), source),
            Self::Heal {
                target,
                hp,
                max_hp,
                source,
            } => with_source(format!("|-heal|{}|{}/{}", target, hp, max_hp), source),
            Self::Boost {
                target,
                stat,
                amount,
            } => format!("|-boost|{}|{}|{}", target, stat, amount),
            Self::Status { target, status } => format!("|-status|{}|{}", target, status),
            Self::CureStatus { target, status } => {
                format!("|-curestatus|{}|{}", target, status)
            }
            Self::Cant { combatant, reason } => format!("|cant|{}|{}", combatant, reason),
            Self::SuperEffective(target) => format!("|-supereffective|{}", target),
            Self::Resisted(target) => format!("|-resisted|{}", target),
            Self::Immune(target) => format!("|-immune|{}", target),
            Self::UseItem { target, item } => format!("|-item|{}|{}", target, item),
            Self::Faint(target) => format!("|faint|{}", target),
            Self::Timeout(player) => format!("|timeout|{}", player),
            Self::Pause => "|pause".to_string(),
            Self::Resume => "|resume".to_string(),
            Self::Flee(player) => format!("|flee|{}", player),
            Self::Win(player) => format!("|win|{}", player),
            Self::Tie => "|tie".to_string(),
        }
    }
}

impl std::fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_protocol_string())
    }
}

fn with_source(mut line: String, source: &Option<String>) -> String {
    if let Some(source) = source {
        line.push_str("|[from] ");
        line.push_str(source);
    }
    line
}

/// Parse a single log line
pub fn parse_battle_event(line: &str) -> Result<BattleEvent, ParseError> {
    let line = line.trim_end();
    if line.is_empty() {
        return Err(ParseError::EmptyMessage);
    }
    if !line.starts_with('|') {
        return Err(ParseError::InvalidFormat(format!(
            "event lines start with '|': {}",
            line
        )));
    }

    let parts: Vec<&str> = line.split('|').collect();
    let kind = parts.get(1).copied().unwrap_or("");

    let event = match kind {
        "start" => BattleEvent::Start,
        "player" => BattleEvent::Player {
            player: parse_player(&parts, 2)?,
            name: required(&parts, 3, "player name")?.to_string(),
            color: parts.get(4).unwrap_or(&"").to_string(),
        },
        "turn" => BattleEvent::Turn(parse_number(&parts, 2, "turn number")?),
        "switch" => {
            let (hp, max_hp) = parse_hp(&parts, 4)?;
            BattleEvent::Switch {
                combatant: parse_combatant(&parts, 2)?,
                species: required(&parts, 3, "species")?.to_string(),
                hp,
                max_hp,
            }
        }
        "move" => BattleEvent::Move {
            source: parse_combatant(&parts, 2)?,
            move_name: required(&parts, 3, "move name")?.to_string(),
            target: parse_combatant(&parts, 4)?,
            miss: parts.iter().skip(5).any(|tag| *tag == "[miss]"),
        },
        "-damage" | "-heal" => {
            let target = parse_combatant(&parts, 2)?;
            let (hp, max_hp) = parse_hp(&parts, 3)?;
            let source = parts
                .iter()
                .skip(4)
                .find_map(|tag| tag.strip_prefix("[from] "))
                .map(str::to_string);
            if kind == "-damage" {
                BattleEvent::Damage {
                    target,
                    hp,
                    max_hp,
                    source,
                }
            } else {
                BattleEvent::Heal {
                    target,
                    hp,
                    max_hp,
                    source,
                }
            }
        }
        "-boost" => BattleEvent::Boost {
            target: parse_combatant(&parts, 2)?,
            stat: required(&parts, 3, "stat")?.to_string(),
            amount: parse_number(&parts, 4, "boost amount")?,
        },
        "-status" => BattleEvent::Status {
            target: parse_combatant(&parts, 2)?,
            status: required(&parts, 3, "status")?.to_string(),
        },
        "-curestatus" => BattleEvent::CureStatus {
            target: parse_combatant(&parts, 2)?,
            status: required(&parts, 3, "status")?.to_string(),
        },
        "cant" => BattleEvent::Cant {
            combatant: parse_combatant(&parts, 2)?,
            reason: required(&parts, 3, "reason")?.to_string(),
        },
        "-supereffective" => BattleEvent::SuperEffective(parse_combatant(&parts, 2)?),
        "-resisted" => BattleEvent::Resisted(parse_combatant(&parts, 2)?),
        "-immune" => BattleEvent::Immune(parse_combatant(&parts, 2)?),
        "-item" => BattleEvent::UseItem {
            target: parse_combatant(&parts, 2)?,
            item: required(&parts, 3, "item")?.to_string(),
        },
        "faint" => BattleEvent::Faint(parse_combatant(&parts, 2)?),
        "timeout" => BattleEvent::Timeout(parse_player(&parts, 2)?),
        "pause" => BattleEvent::Pause,
        "resume" => BattleEvent::Resume,
        "flee" => BattleEvent::Flee(parse_player(&parts, 2)?),
        "win" => BattleEvent::Win(parse_player(&parts, 2)?),
        "tie" => BattleEvent::Tie,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(event)
}

/// Parse a multi-line log, skipping blank lines
pub fn parse_battle_log(log: &str) -> Result<Vec<BattleEvent>, ParseError> {
    log.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_battle_event)
        .collect()
}

fn required<'a>(parts: &[&'a str], index: usize, field: &str) -> Result<&'a str, ParseError> {
    parts
        .get(index)
        .copied()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ParseError::MissingField(field.to_string()))
}

fn parse_player(parts: &[&str], index: usize) -> Result<PlayerSlot, ParseError> {
    let raw = required(parts, index, "player")?;
    PlayerSlot::parse(raw).ok_or_else(|| ParseError::InvalidFormat(format!("player: {}", raw)))
}

fn parse_combatant(parts: &[&str], index: usize) -> Result<CombatantRef, ParseError> {
    let raw = required(parts, index, "combatant")?;
    CombatantRef::parse(raw)
        .ok_or_else(|| ParseError::InvalidFormat(format!("combatant id: {}", raw)))
}

fn parse_number(parts: &[&str], index: usize, field: &str) -> Result<u32, ParseError> {
    let raw = required(parts, index, field)?;
    raw.parse()
        .map_err(|_| ParseError::InvalidFormat(format!("{}: {}", field, raw)))
}

/// Parse "HP/MAX"
fn parse_hp(parts: &[&str], index: usize) -> Result<(u32, u32), ParseError> {
    let raw = required(parts, index, "hp")?;
    let bad = || ParseError::InvalidFormat(format!("hp: {}", raw));
    let (hp, max) = raw.split_once('/').ok_or_else(bad)?;
    Ok((
        hp.parse().map_err(|_| bad())?,
        max.parse().map_err(|_| bad())?,
    ))
}
