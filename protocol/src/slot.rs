//! Player slots in a two-sided battle

use serde::{Deserialize, Serialize};

/// One of the two sides of a battle (p1, p2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerSlot {
    P1,
    P2,
}

impl PlayerSlot {
    /// Both slots in turn order
    pub const BOTH: [PlayerSlot; 2] = [PlayerSlot::P1, PlayerSlot::P2];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "p1" => Some(PlayerSlot::P1),
            "p2" => Some(PlayerSlot::P2),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerSlot::P1 => "p1",
            PlayerSlot::P2 => "p2",
        }
    }

    /// Array index of this slot (p1 = 0, p2 = 1)
    pub fn index(&self) -> usize {
        match self {
            PlayerSlot::P1 => 0,
            PlayerSlot::P2 => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(PlayerSlot::P1),
            1 => Some(PlayerSlot::P2),
            _ => None,
        }
    }

    /// The other side
    pub fn opponent(&self) -> Self {
        match self {
            PlayerSlot::P1 => PlayerSlot::P2,
            PlayerSlot::P2 => PlayerSlot::P1,
        }
    }

    /// Convenience for callers that track "is player 1" flags
    pub fn from_is_player1(is_player1: bool) -> Self {
        if is_player1 {
            PlayerSlot::P1
        } else {
            PlayerSlot::P2
        }
    }
}

impl std::fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
