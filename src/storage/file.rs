//! Filesystem-backed storage provider
//!
//! Maps the store's hierarchical namespace onto directories below a root:
//!
//! - `{root}/{base_path}/backups/{name}.backup.json`
//! - `{root}/{base_path}/metadata.json`
//!
//! Base paths nest, so the `backups/` directory of one base path can hold
//! the metadata document of another. Only files carrying the record suffix
//! are treated as backups.
//!
//! Filesystem calls run on tokio's blocking pool so that a caller's
//! deadline still fires when the disk stalls.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use super::file_io::{read_json_optional, write_json_atomic};
use super::{
    backup_key, validate_backup_name, validate_base_path, BackupRecord, StorageProvider,
    BACKUPS_DIR,
};
use crate::error::{KeystashError, KeystashResult};

const RECORD_SUFFIX: &str = ".backup.json";
const METADATA_FILE: &str = "metadata.json";

/// Storage provider rooted at a local directory
#[derive(Debug, Clone)]
pub struct FileStorageProvider {
    root: PathBuf,
}

impl FileStorageProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if missing
    pub fn ensure_root(&self) -> KeystashResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            KeystashError::Io(format!(
                "Failed to create store root {}: {}",
                self.root.display(),
                e
            ))
        })
    }

    fn base_dir(&self, base_path: &str) -> KeystashResult<PathBuf> {
        validate_base_path(base_path)?;
        Ok(base_path
            .split('/')
            .fold(self.root.clone(), |dir, segment| dir.join(segment)))
    }

    fn backups_dir(&self, base_path: &str) -> KeystashResult<PathBuf> {
        Ok(self.base_dir(base_path)?.join(BACKUPS_DIR))
    }

    fn record_path(&self, base_path: &str, name: &str) -> KeystashResult<PathBuf> {
        validate_backup_name(name)?;
        Ok(self
            .backups_dir(base_path)?
            .join(format!("{}{}", name, RECORD_SUFFIX)))
    }
}

/// Run a filesystem operation on the blocking pool
async fn run_blocking<T, F>(operation: &'static str, f: F) -> KeystashResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> KeystashResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        KeystashError::Storage(format!("{} task failed: {}", operation, e))
    })?
}

/// Backup names in a records directory, sorted
fn read_record_names(dir: &Path) -> KeystashResult<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| {
        KeystashError::Storage(format!("Failed to read {}: {}", dir.display(), e))
    })? {
        let entry = entry.map_err(|e| {
            KeystashError::Storage(format!("Failed to read directory entry: {}", e))
        })?;

        // Nested base paths show up here as directories
        let is_dir = entry.file_type().map_or(false, |kind| kind.is_dir());
        if is_dir {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if let Some(name) = file_name.strip_suffix(RECORD_SUFFIX) {
            if !name.is_empty() {
                names.push(name.to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}

#[async_trait]
impl StorageProvider for FileStorageProvider {
    async fn test_connection(&self) -> KeystashResult<()> {
        let root = self.root.clone();
        run_blocking("test_connection", move || {
            if root.is_dir() {
                Ok(())
            } else {
                Err(KeystashError::Connectivity(format!(
                    "store root {} does not exist or is not a directory",
                    root.display()
                )))
            }
        })
        .await
    }

    async fn list_backups(&self, base_path: &str) -> KeystashResult<Vec<String>> {
        let dir = self.backups_dir(base_path)?;
        run_blocking("list_backups", move || read_record_names(&dir)).await
    }

    async fn get_backup(&self, base_path: &str, name: &str) -> KeystashResult<BackupRecord> {
        let path = self.record_path(base_path, name)?;
        let key = backup_key(base_path, name);
        run_blocking("get_backup", move || {
            read_json_optional(&path)?.ok_or_else(|| KeystashError::backup_not_found(key))
        })
        .await
    }

    async fn store_backup(
        &self,
        base_path: &str,
        name: &str,
        record: &BackupRecord,
    ) -> KeystashResult<()> {
        let path = self.record_path(base_path, name)?;
        let record = record.clone();
        run_blocking("store_backup", move || write_json_atomic(&path, &record)).await
    }

    async fn delete_backup(&self, base_path: &str, name: &str) -> KeystashResult<()> {
        let path = self.record_path(base_path, name)?;
        let key = backup_key(base_path, name);
        run_blocking("delete_backup", move || {
            if !path.exists() {
                return Err(KeystashError::backup_not_found(key));
            }

            fs::remove_file(&path).map_err(|e| {
                KeystashError::Storage(format!("Failed to delete {}: {}", path.display(), e))
            })
        })
        .await
    }

    async fn get_metadata(&self, base_path: &str) -> KeystashResult<Option<Value>> {
        let path = self.base_dir(base_path)?.join(METADATA_FILE);
        run_blocking("get_metadata", move || read_json_optional(&path)).await
    }

    async fn store_metadata(&self, base_path: &str, data: &Value) -> KeystashResult<()> {
        let path = self.base_dir(base_path)?.join(METADATA_FILE);
        let data = data.clone();
        run_blocking("store_metadata", move || write_json_atomic(&path, &data)).await
    }
}
