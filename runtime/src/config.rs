//! Runtime configuration
//!
//! Loaded from JSON; every field has a default so a partial file works.
//!
//! ```json
//! {
//!   "arena": { "turn_budget_ms": 15000, "seed": 42 },
//!   "provider": { "endpoint": "http://127.0.0.1:8080/decide", "timeout_ms": 1500 },
//!   "event_capacity": 512
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use coliseum_battle::{ArenaConfig, BreakerConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub arena: ArenaConfig,
    /// Decision provider for delegate coaches; they stay offline without it
    pub provider: Option<ProviderConfig>,
    pub breaker: BreakerConfig,
    /// Events buffered per subscriber before it starts lagging
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            provider: None,
            breaker: BreakerConfig::default(),
            event_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub endpoint: String,
    #[serde(default = "default_provider_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_provider_timeout_ms() -> u64 {
    2_000
}

impl ProviderConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_ms: default_provider_timeout_ms(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl RuntimeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse runtime configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read runtime configuration {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid configuration in {}", path.display()))
    }
}
