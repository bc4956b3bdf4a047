//! Store configuration.
//!
//! Every field has a default, so a missing or partial config file is fine.
//! Environment variables override the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::state::history::DEFAULT_MAX_STEPS;

/// Overrides `storage_dir`.
pub const ENV_STORAGE_DIR: &str = "LAYERSTACK_STORAGE_DIR";

/// Overrides `max_history_steps`.
pub const ENV_MAX_HISTORY: &str = "LAYERSTACK_MAX_HISTORY";

/// Default storage key of the auto-save record.
pub const DEFAULT_AUTOSAVE_KEY: &str = "layerstack-autosave";

/// Default storage key of the persisted UI preferences.
pub const DEFAULT_PREFERENCES_KEY: &str = "layerstack-ui";

/// Default quiet period before an auto-save, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    pub enabled: bool,
    pub debounce_ms: u64,
    pub key: String,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            key: DEFAULT_AUTOSAVE_KEY.to_string(),
        }
    }
}

impl AutosaveConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Undo depth.
    pub max_history_steps: usize,
    pub autosave: AutosaveConfig,
    pub preferences_key: String,
    /// Directory used by the file-backed storage.
    pub storage_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_history_steps: DEFAULT_MAX_STEPS,
            autosave: AutosaveConfig::default(),
            preferences_key: DEFAULT_PREFERENCES_KEY.to_string(),
            storage_dir: PathBuf::from(".layerstack"),
        }
    }
}

impl StoreConfig {
    /// Read a JSON config file, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| StoreError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: StoreConfig = serde_json::from_str(&content)?;
        config.with_env_overrides()?.validated()
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()?.validated()
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(
            std::env::var(ENV_STORAGE_DIR).ok(),
            std::env::var(ENV_MAX_HISTORY).ok(),
        )
    }

    fn with_overrides(
        mut self,
        storage_dir: Option<String>,
        max_history: Option<String>,
    ) -> Result<Self> {
        if let Some(dir) = storage_dir.filter(|d| !d.is_empty()) {
            self.storage_dir = PathBuf::from(dir);
        }
        if let Some(raw) = max_history {
            self.max_history_steps =
                raw.trim()
                    .parse()
                    .map_err(|_| StoreError::InvalidConfig {
                        reason: format!("{} must be a positive integer, got '{}'", ENV_MAX_HISTORY, raw),
                    })?;
        }
        Ok(self)
    }

    pub fn validated(self) -> Result<Self> {
        if self.max_history_steps == 0 {
            return Err(StoreError::InvalidConfig {
                reason: "max_history_steps must be at least 1".to_string(),
            });
        }
        if self.autosave.key.is_empty() || self.preferences_key.is_empty() {
            return Err(StoreError::InvalidConfig {
                reason: "storage keys must not be empty".to_string(),
            });
        }
        if self.autosave.key == self.preferences_key {
            return Err(StoreError::InvalidConfig {
                reason: "autosave and preferences keys must differ".to_string(),
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.max_history_steps, 20);
        assert_eq!(config.autosave.debounce(), Duration::from_millis(1000));
        assert!(config.validated().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"max_history_steps": 5, "autosave": {"debounce_ms": 250}}"#).unwrap();

        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.max_history_steps, 5);
        assert_eq!(config.autosave.debounce_ms, 250);
        assert!(config.autosave.enabled);
        assert_eq!(config.preferences_key, DEFAULT_PREFERENCES_KEY);
    }

    #[test]
    fn test_overrides() {
        let config = StoreConfig::default()
            .with_overrides(Some("/tmp/ls".to_string()), Some(" 7 ".to_string()))
            .unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/ls"));
        assert_eq!(config.max_history_steps, 7);

        let err = StoreConfig::default()
            .with_overrides(None, Some("lots".to_string()))
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_validation_rejects_zero_history_and_shared_keys() {
        let zero = StoreConfig {
            max_history_steps: 0,
            ..StoreConfig::default()
        };
        assert!(zero.validated().is_err());

        let mut shared = StoreConfig::default();
        shared.preferences_key = shared.autosave.key.clone();
        assert!(shared.validated().is_err());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = StoreConfig::load(&path).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_READ");
        assert!(err.to_string().starts_with("Failed to read config file"));
        assert!(err.to_string().contains("nope.json"));
    }
}
