//! # Game Configuration
//!
//! Tunables for the engine and the runtime, loaded from TOML. Every field has a default,
//! so an empty file (or no file at all) gives the standard game.
//!
//! ```toml
//! spawn_interval_ms = 2000
//! max_resources = 5
//! seed = 42
//! ```

use crate::model::Upgrades;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ===========================================================================
// Config
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Time between spawn attempts before upgrades.
    pub spawn_interval_ms: u64,
    /// Upgrades never push the spawn interval below this.
    pub min_spawn_interval_ms: u64,
    /// Period of the clock driver.
    pub tick_period_ms: u64,
    /// Pool capacity.
    pub max_resources: usize,
    /// Upper bound on requirements per randomized process.
    pub max_requirements: usize,
    /// Upper bound on copies of one kind inside a randomized process.
    pub max_duplicates: usize,
    /// Number of processes in a randomized level.
    pub process_slots: usize,
    /// Fixed RNG seed; drawn from the thread RNG when absent.
    pub seed: Option<u64>,
    /// Capacity of the game actor's mailbox.
    pub channel_buffer: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 2000,
            min_spawn_interval_ms: 500,
            tick_period_ms: 1000,
            max_resources: 5,
            max_requirements: 4,
            max_duplicates: 2,
            process_slots: 3,
            seed: None,
            channel_buffer: 32,
        }
    }
}

/// Bounds for the randomized process generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationLimits {
    pub process_slots: usize,
    pub max_requirements: usize,
    pub max_duplicates: usize,
}

impl GameConfig {
    /// Read and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_resources == 0 {
            return Err(ConfigError::Invalid("max_resources must be positive".into()));
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::Invalid("tick_period_ms must be positive".into()));
        }
        if self.max_requirements < 2 {
            return Err(ConfigError::Invalid(format!(
                "max_requirements must be at least 2, got {}",
                self.max_requirements
            )));
        }
        if self.max_duplicates == 0 {
            return Err(ConfigError::Invalid("max_duplicates must be positive".into()));
        }
        if self.process_slots == 0 {
            return Err(ConfigError::Invalid("process_slots must be positive".into()));
        }
        if self.channel_buffer == 0 {
            return Err(ConfigError::Invalid("channel_buffer must be positive".into()));
        }
        Ok(())
    }

    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    /// Spawn interval after upgrades, floored at `min_spawn_interval_ms`.
    pub fn spawn_interval_with(&self, upgrades: &Upgrades) -> Duration {
        let floor = Duration::from_millis(self.min_spawn_interval_ms);
        self.spawn_interval()
            .saturating_sub(upgrades.spawn_interval_reduction)
            .max(floor)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn generation_limits(&self) -> GenerationLimits {
        GenerationLimits {
            process_slots: self.process_slots,
            max_requirements: self.max_requirements,
            max_duplicates: self.max_duplicates,
        }
    }
}
