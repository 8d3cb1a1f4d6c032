//! User settings for Keystash
//!
//! Persists the chosen storage layout, the store location and the timing
//! parameters used when talking to the store.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::KeystashPaths;
use crate::error::{KeystashError, KeystashResult};
use crate::layout::{PathGenerator, Strategy};
use crate::migration::RetryPolicy;

/// Storage layout preference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSettings {
    #[serde(default)]
    pub strategy: Strategy,

    /// Prefix for the custom strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prefix: Option<String>,

    /// Namespace for the universal strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl LayoutSettings {
    /// Build the path generator for this layout
    pub fn generator(&self) -> PathGenerator {
        PathGenerator::new(self.strategy)
            .with_custom_prefix(self.custom_prefix.clone().unwrap_or_default())
            .with_namespace(self.namespace.clone().unwrap_or_default())
    }
}

/// Backing store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Root of the file store; defaults to `store/` in the config directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Deadline for each store call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StorageSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Store root, falling back to the config directory
    pub fn root_or_default(&self, paths: &KeystashPaths) -> PathBuf {
        self.root
            .clone()
            .unwrap_or_else(|| paths.default_store_dir())
    }
}

/// Polling settings for confirming deletions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms.max(self.initial_delay_ms)),
        }
    }
}

/// User settings for Keystash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub layout: LayoutSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay_ms() -> u64 {
    200
}

fn default_max_delay_ms() -> u64 {
    2000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            layout: LayoutSettings::default(),
            storage: StorageSettings::default(),
            retry: RetrySettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &KeystashPaths) -> KeystashResult<Self> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                KeystashError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                KeystashError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Not persisted until the caller saves
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &KeystashPaths) -> KeystashResult<()> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            KeystashError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| KeystashError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.layout.strategy, Strategy::MachineUser);
        assert_eq!(settings.storage.timeout(), Duration::from_secs(10));
        assert_eq!(settings.retry.policy(), RetryPolicy::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = KeystashPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.layout.strategy = Strategy::Universal;
        settings.layout.namespace = Some("personal".into());
        settings.storage.timeout_secs = 3;

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = KeystashPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(
            paths.settings_file(),
            r#"{ "layout": { "strategy": "legacy" } }"#,
        )
        .unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.layout.strategy, Strategy::MachineUser);
        assert_eq!(loaded.storage.timeout_secs, 10);
        assert_eq!(loaded.retry.max_attempts, 5);
    }

    #[test]
    fn test_invalid_strategy_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = KeystashPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(
            paths.settings_file(),
            r#"{ "layout": { "strategy": "per-team" } }"#,
        )
        .unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_layout_generator() {
        let layout = LayoutSettings {
            strategy: Strategy::Custom,
            custom_prefix: Some("ops".into()),
            namespace: None,
        };
        let generator = layout.generator();
        assert_eq!(generator.strategy(), Strategy::Custom);
        assert_eq!(generator.custom_prefix(), "ops");
    }
}
