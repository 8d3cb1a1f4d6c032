//! Path management for Keystash
//!
//! Resolves where local configuration, the audit journal and the default
//! file store live.
//!
//! ## Path Resolution Order
//!
//! 1. `KEYSTASH_CONFIG_DIR` environment variable (if set)
//! 2. The platform config directory (`~/.config/keystash` on Linux,
//!    `~/Library/Application Support/keystash` on macOS, `%APPDATA%\keystash`
//!    on Windows)

use std::path::PathBuf;

use crate::error::KeystashError;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "KEYSTASH_CONFIG_DIR";

/// Manages all local paths used by Keystash
#[derive(Debug, Clone)]
pub struct KeystashPaths {
    base_dir: PathBuf,
}

impl KeystashPaths {
    /// Create a new KeystashPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, KeystashError> {
        let base_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create KeystashPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit journal
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Root of the file store when none is configured
    pub fn default_store_dir(&self) -> PathBuf {
        self.base_dir.join("store")
    }

    /// Ensure the config directory exists
    pub fn ensure_directories(&self) -> Result<(), KeystashError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| KeystashError::Io(format!("Failed to create config directory: {}", e)))
    }

    /// Check if Keystash has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, KeystashError> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join("keystash"))
        .ok_or_else(|| KeystashError::Config("Could not determine home directory".into()))
}
