//! Status codes

use serde::{Deserialize, Serialize};

/// Numeric status tag mirrored on every combatant
///
/// `Normal` means no effect is active; the others name the most recently
/// applied effect that is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum StatusCode {
    #[default]
    Normal = 0,
    Paralyzed = 1,
    Asleep = 2,
    Burned = 3,
    Frozen = 4,
    Poisoned = 5,
}

impl StatusCode {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(StatusCode::Normal),
            1 => Some(StatusCode::Paralyzed),
            2 => Some(StatusCode::Asleep),
            3 => Some(StatusCode::Burned),
            4 => Some(StatusCode::Frozen),
            5 => Some(StatusCode::Poisoned),
            _ => None,
        }
    }

    /// Parse from protocol string ("par", "slp", "brn", "frz", "psn")
    pub fn from_protocol(s: &str) -> Option<Self> {
        match s {
            "par" => Some(StatusCode::Paralyzed),
            "slp" => Some(StatusCode::Asleep),
            "brn" => Some(StatusCode::Burned),
            "frz" => Some(StatusCode::Frozen),
            "psn" => Some(StatusCode::Poisoned),
            _ => None,
        }
    }

    /// Protocol string, `None` for `Normal`
    pub fn to_protocol(&self) -> Option<&'static str> {
        match self {
            StatusCode::Normal => None,
            StatusCode::Paralyzed => Some("par"),
            StatusCode::Asleep => Some("slp"),
            StatusCode::Burned => Some("brn"),
            StatusCode::Frozen => Some("frz"),
            StatusCode::Poisoned => Some("psn"),
        }
    }

    pub fn is_normal(&self) -> bool {
        *self == StatusCode::Normal
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Normal => "Normal",
            StatusCode::Paralyzed => "Paralysis",
            StatusCode::Asleep => "Sleep",
            StatusCode::Burned => "Burn",
            StatusCode::Frozen => "Freeze",
            StatusCode::Poisoned => "Poison",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
