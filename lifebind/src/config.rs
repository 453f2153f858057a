//! Configuration for resource registries and their sweepers.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::LifebindError;

/// Configuration for a [`ResourceRegistry`](crate::registry::ResourceRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Interval between two sweeps, in milliseconds.
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
    /// Name of the OS thread that hosts the sweeper.
    #[serde(default = "default_thread_name")]
    pub sweeper_thread_name: String,
    /// Whether the first registration starts the sweeper.
    #[serde(default = "default_true")]
    pub auto_start_sweeper: bool,
    /// Whether the sweeper emits `sweep.completed` events.
    #[serde(default = "default_true")]
    pub emit_sweep_events: bool,
}

fn default_sweep_interval_ms() -> u64 {
    100
}

fn default_thread_name() -> String {
    "lifebind-sweeper".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            sweep_interval_ms: default_sweep_interval_ms(),
            sweeper_thread_name: default_thread_name(),
            auto_start_sweeper: default_true(),
            emit_sweep_events: default_true(),
        }
    }
}

impl RegistryConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sweep interval.
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the sweeper thread name.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.sweeper_thread_name = name.into();
        self
    }

    /// Enables or disables starting the sweeper on first registration.
    #[must_use]
    pub fn with_auto_start(mut self, enabled: bool) -> Self {
        self.auto_start_sweeper = enabled;
        self
    }

    /// Enables or disables sweep events.
    #[must_use]
    pub fn with_sweep_events(mut self, enabled: bool) -> Self {
        self.emit_sweep_events = enabled;
        self
    }

    /// Returns the sweep interval as a duration.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Checks that the configuration can drive a sweeper.
    pub fn validate(&self) -> Result<(), LifebindError> {
        if self.sweep_interval_ms == 0 {
            return Err(LifebindError::InvalidConfig(
                "sweep_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.sweeper_thread_name.trim().is_empty() {
            return Err(LifebindError::InvalidConfig(
                "sweeper_thread_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a configuration from JSON.
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, LifebindError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
