//! Session configuration
//!
//! Loaded from RON, with fallback to hardcoded defaults.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Default number of inventory stack slots
pub const DEFAULT_CAPACITY: usize = 30;

/// Tunables for one loadout session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadoutConfig {
    /// Inventory stack slots
    pub capacity: usize,
    /// Lowest max HP equipment penalties can push a character to
    pub max_hp_floor: i32,
}

impl Default for LoadoutConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_hp_floor: 1,
        }
    }
}

impl LoadoutConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn from_ron(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(source)
    }

    /// Load a RON config file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_ron(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Load a config file, using defaults if it is missing or malformed
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("{:#}. Using default config.", e);
            Self::default()
        })
    }
}
