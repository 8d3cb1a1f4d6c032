//! Storage layer for Keystash
//!
//! Defines the [`StorageProvider`] contract the rest of the crate talks to,
//! plus two providers:
//!
//! - `FileStorageProvider`: hierarchical store on the local filesystem
//! - `MemoryStorageProvider`: in-process store for tests and embedding
//!
//! # Layout
//!
//! Inside any base path the store holds:
//! - `{base_path}/backups/{name}`: one record per backup
//! - `{base_path}/metadata`: the backup index document

pub mod file;
pub mod file_io;
pub mod memory;
pub mod metadata;

pub use file::FileStorageProvider;
pub use file_io::{read_json_optional, write_json_atomic};
pub use memory::MemoryStorageProvider;
pub use metadata::{BackupIndex, IndexEntry};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{KeystashError, KeystashResult};

/// Segment under a base path that holds backup records
pub const BACKUPS_DIR: &str = "backups";

/// A stored backup
///
/// The payload is produced and consumed by the encryption layer and is
/// passed through untouched. Only `metadata` is ever annotated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BackupRecord {
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub payload: Value,
}

impl BackupRecord {
    pub fn new(payload: Value) -> Self {
        Self {
            metadata: Map::new(),
            payload,
        }
    }

    /// Add a metadata field
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Contract with the backing secret store
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Check that the store is reachable
    async fn test_connection(&self) -> KeystashResult<()>;

    /// Names of all backups under a base path; empty if there are none
    async fn list_backups(&self, base_path: &str) -> KeystashResult<Vec<String>>;

    /// Read one backup; `NotFound` if absent
    async fn get_backup(&self, base_path: &str, name: &str) -> KeystashResult<BackupRecord>;

    /// Write one backup, replacing any existing record of the same name
    async fn store_backup(
        &self,
        base_path: &str,
        name: &str,
        record: &BackupRecord,
    ) -> KeystashResult<()>;

    /// Remove one backup; `NotFound` if absent
    async fn delete_backup(&self, base_path: &str, name: &str) -> KeystashResult<()>;

    /// Read the metadata document of a base path, if any
    async fn get_metadata(&self, base_path: &str) -> KeystashResult<Option<Value>>;

    /// Replace the metadata document of a base path
    async fn store_metadata(&self, base_path: &str, data: &Value) -> KeystashResult<()>;
}

/// Full store key of a backup record
pub fn backup_key(base_path: &str, name: &str) -> String {
    format!("{}/{}/{}", base_path, BACKUPS_DIR, name)
}

/// Reject backup names that would escape their `backups/` directory
pub fn validate_backup_name(name: &str) -> KeystashResult<()> {
    if name.trim().is_empty() {
        return Err(KeystashError::Validation("Backup name cannot be empty".into()));
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(KeystashError::Validation(format!(
            "Backup name '{}' must be a single path segment",
            name
        )));
    }
    Ok(())
}

/// Reject base paths with empty, relative or absolute segments
pub fn validate_base_path(base_path: &str) -> KeystashResult<()> {
    if base_path.is_empty()
        || base_path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(KeystashError::Validation(format!(
            "Invalid base path '{}'",
            base_path
        )));
    }
    Ok(())
}
