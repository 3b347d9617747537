//! Request/response types for external decision providers
//!
//! A provider receives one [`DecisionRequest`] per automated turn and answers
//! with a single [`DecisionChoice`]. Both travel as JSON.

use serde::{Deserialize, Serialize};

use crate::{ParseError, PlayerSlot};

/// What the provider gets to know about a combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantInfo {
    pub name: String,
    pub species: String,

    /// Elemental type name ("Fire", "Water", ...)
    #[serde(rename = "type")]
    pub kind: String,

    pub hp: u32,
    pub max_hp: u32,

    /// Protocol status code (par, slp, brn, frz, psn)
    #[serde(default)]
    pub status: Option<String>,
}

/// A bench combatant the coach may switch to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchOption {
    /// Roster index (0-indexed)
    pub index: usize,
    pub name: String,
}

/// Snapshot sent to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub player: PlayerSlot,
    pub turn: u32,
    pub active: CombatantInfo,
    #[serde(default)]
    pub opponent: Option<CombatantInfo>,

    /// Moves that still have PP
    #[serde(default)]
    pub moves: Vec<String>,

    #[serde(default)]
    pub switches: Vec<SwitchOption>,

    #[serde(default)]
    pub items: Vec<String>,
}

impl DecisionRequest {
    /// Check if the request offers anything to choose from
    pub fn has_options(&self) -> bool {
        !self.moves.is_empty() || !self.switches.is_empty() || !self.items.is_empty()
    }
}

/// The single selection a provider makes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum DecisionChoice {
    Move { name: String },
    Switch { index: usize },
    Item { name: String },
}

/// Provider answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub choice: DecisionChoice,

    /// Free-form explanation, logged but otherwise ignored
    #[serde(default)]
    pub reason: Option<String>,
}

impl DecisionResponse {
    pub fn new(choice: DecisionChoice) -> Self {
        Self {
            choice,
            reason: None,
        }
    }

    /// Parse a response body
    ///
    /// Accepts both the wrapped form (`{"choice": {...}}`) and a bare choice
    /// object (`{"action": "move", "name": "Tackle"}`).
    pub fn parse(body: &str) -> Result<Self, ParseError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ParseError::EmptyMessage);
        }

        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| ParseError::InvalidFormat(format!("response is not JSON: {}", e)))?;

        if value.get("choice").is_some() {
            return serde_json::from_value(value)
                .map_err(|e| ParseError::InvalidFormat(format!("bad decision response: {}", e)));
        }

        let choice: DecisionChoice = serde_json::from_value(value)
            .map_err(|e| ParseError::InvalidFormat(format!("bad decision choice: {}", e)))?;
        Ok(Self::new(choice))
    }
}
