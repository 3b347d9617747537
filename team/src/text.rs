//! Plain-text team format
//!
//! ```text
//! Sparky (Pikachu)
//! - Thunderbolt
//! - Quick Attack
//!
//! Bulbasaur
//! - Vine Whip
//!
//! Bag: Potion, Potion, Revive
//! ```
//!
//! Members are separated by blank lines. A header is either `Species` or
//! `Nickname (Species)`; `- Move` lines follow it. A `Bag:` line may appear
//! in its own block anywhere in the text.

use crate::{MemberSet, TeamError, TeamSet};

const MOVE_PREFIX: char = '-';
const BAG_PREFIX: &str = "Bag:";

/// Parse and validate a team written in the text format
pub fn parse_team(text: &str) -> Result<TeamSet, TeamError> {
    let mut team = TeamSet::default();
    let mut current: Option<MemberSet> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() {
            if let Some(member) = current.take() {
                team.members.push(member);
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix(BAG_PREFIX) {
            if current.is_some() {
                return Err(TeamError::parse(line_no, "bag line must be in its own block"));
            }
            team.bag.extend(
                rest.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            );
            continue;
        }

        if let Some(rest) = line.strip_prefix(MOVE_PREFIX) {
            let Some(member) = current.as_mut() else {
                return Err(TeamError::parse(line_no, "move listed before any member"));
            };
            let name = rest.trim();
            if name.is_empty() {
                return Err(TeamError::parse(line_no, "empty move name"));
            }
            member.moves.push(name.to_string());
            continue;
        }

        if current.is_some() {
            return Err(TeamError::parse(
                line_no,
                format!("expected a move or a blank line, got '{}'", line),
            ));
        }
        current = Some(parse_header(line, line_no)?);
    }

    if let Some(member) = current {
        team.members.push(member);
    }

    team.validate()?;
    Ok(team)
}

/// `Species` or `Nickname (Species)`
fn parse_header(line: &str, line_no: usize) -> Result<MemberSet, TeamError> {
    let Some(inner) = line.strip_suffix(')') else {
        return Ok(MemberSet::new(line));
    };
    let open = inner
        .rfind('(')
        .ok_or_else(|| TeamError::parse(line_no, format!("unbalanced parenthesis in '{}'", line)))?;

    let nickname = inner[..open].trim();
    let species = inner[open + 1..].trim();
    if species.is_empty() {
        return Err(TeamError::parse(line_no, "missing species"));
    }
    if nickname.is_empty() {
        return Ok(MemberSet::new(species));
    }
    Ok(MemberSet::new(species).with_nickname(nickname))
}

impl TeamSet {
    /// Render in the text format accepted by [`parse_team`]
    pub fn to_text(&self) -> String {
        let mut blocks: Vec<String> = self
            .members
            .iter()
            .map(|member| {
                let mut block = match &member.nickname {
                    Some(nickname) => format!("{} ({})", nickname, member.species),
                    None => member.species.clone(),
                };
                for name in &member.moves {
                    block.push_str(&format!("\n{} {}", MOVE_PREFIX, name));
                }
                block
            })
            .collect();

        if !self.bag.is_empty() {
            blocks.push(format!("{} {}", BAG_PREFIX, self.bag.join(", ")));
        }

        let mut text = blocks.join("\n\n");
        text.push('\n');
        text
    }
}
