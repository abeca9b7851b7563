//! TOML-based application configuration.
//!
//! Stores the tunable pieces of the engine:
//! - Trigger thresholds (minimum events, score threshold)
//! - The event-to-score catalog
//!
//! Configuration is stored at `~/.config/personatrace/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result};
use crate::events::EventCatalog;
use crate::trigger::TriggerConfig;

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/personatrace/config.toml`.
/// Missing sections fall back to built-in defaults, so a partial file
/// (say, just `[trigger]`) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub trigger: TriggerConfig,
    /// Event catalog; defaults to the built-in storefront signals.
    #[serde(default)]
    pub events: EventCatalog,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trigger: TriggerConfig::default(),
            events: EventCatalog::builtin(),
        }
    }
}

impl Config {
    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()
            .map_err(|e| CoreError::Custom(e.to_string()))?
            .join("config.toml"))
    }

    /// Load configuration, falling back to defaults when the file does
    /// not exist yet.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if the catalog fails validation.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let config: Config =
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration back to disk.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let text =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, text).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Validate the loaded values.
    ///
    /// # Errors
    /// Returns an error for an invalid catalog or a zero minimum event
    /// count (which would make rule 1 unreachable).
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.events.validate()?;
        if self.trigger.min_events_count == 0 {
            return Err(ConfigError::InvalidValue {
                key: "trigger.min_events_count".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.trigger.ai_trigger_threshold <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "trigger.ai_trigger_threshold".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.trigger.min_events_count, 3);
        assert_eq!(config.trigger.ai_trigger_threshold, 20);
        assert!(!config.events.is_empty());
    }

    #[test]
    fn toml_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            "[trigger]\nmin_events_count = 5\n",
        )
        .unwrap();
        assert_eq!(config.trigger.min_events_count, 5);
        assert_eq!(config.trigger.ai_trigger_threshold, 20);
        assert!(!config.events.is_empty());
    }

    #[test]
    fn zero_min_events_rejected() {
        let config: Config = toml::from_str(
            "[trigger]\nmin_events_count = 0\n",
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
