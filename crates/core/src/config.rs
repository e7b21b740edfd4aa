//! Configuration
//!
//! Retry behaviour is controlled by three knobs:
//!
//! | Key | Default | Effect |
//! |-----|---------|--------|
//! | `max_retries` | 3 | Upper bound on automatic attempts |
//! | `base_backoff_ms` | 100 | Delay before the 2nd attempt, doubled for each later one |
//! | `jitter_max_ms` | 100 | Random extra delay in `[0, jitter_max_ms)` |
//!
//! Values can be read from TOML, either as a bare table or under `[retry]`
//! in a full [`SlotlockConfig`] file:
//!
//! ```toml
//! [retry]
//! max_retries = 5
//! base_backoff_ms = 50
//!
//! [simulation]
//! actors = 4
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Bounded retry with exponential backoff and jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_retries: u32,
    /// Base delay in milliseconds
    pub base_backoff_ms: u64,
    /// Exclusive upper bound of the random jitter in milliseconds
    pub jitter_max_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff_ms: 100,
            jitter_max_ms: 100,
        }
    }
}

impl RetryConfig {
    /// Set the attempt bound
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base delay
    pub fn with_base_backoff_ms(mut self, base_backoff_ms: u64) -> Self {
        self.base_backoff_ms = base_backoff_ms;
        self
    }

    /// Set the jitter bound
    pub fn with_jitter_max_ms(mut self, jitter_max_ms: u64) -> Self {
        self.jitter_max_ms = jitter_max_ms;
        self
    }

    /// Base delay as a Duration
    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }

    /// Reject values the coordinators cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(Error::InvalidConfig(
                "max_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a bare `RetryConfig` table
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: RetryConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the `[retry]` section of a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(SlotlockConfig::load(path)?.retry)
    }
}

/// Parameters of the bundled two-actor demonstration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of concurrent actors
    pub actors: usize,
    /// Delay injected between mutation and commit, in milliseconds
    pub think_time_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            actors: 2,
            think_time_ms: 1000,
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotlockConfig {
    /// `[retry]`
    pub retry: RetryConfig,
    /// `[simulation]`
    pub simulation: SimulationConfig,
}

impl SlotlockConfig {
    /// Parse a full config document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: SlotlockConfig = toml::from_str(s)?;
        config.retry.validate()?;
        if config.simulation.actors == 0 {
            return Err(Error::InvalidConfig(
                "simulation.actors must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Read and parse a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
