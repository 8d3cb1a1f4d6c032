//! Backup index stored as a base path's metadata document
//!
//! The index is kept by callers; the migration engine never touches it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::StorageProvider;
use crate::error::{KeystashError, KeystashResult};

const INDEX_SCHEMA_VERSION: u32 = 1;

/// One backup's entry in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// When the entry was last written
    pub updated_at: DateTime<Utc>,
    /// Base path the backup was migrated from, if it arrived by migration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_from: Option<String>,
}

/// Index of the backups under one base path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupIndex {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub backups: BTreeMap<String, IndexEntry>,
}

fn default_schema_version() -> u32 {
    INDEX_SCHEMA_VERSION
}

impl Default for BackupIndex {
    fn default() -> Self {
        Self {
            schema_version: INDEX_SCHEMA_VERSION,
            updated_at: Utc::now(),
            backups: BTreeMap::new(),
        }
    }
}

impl BackupIndex {
    /// Parse a metadata document; a missing document is an empty index
    pub fn from_value(value: Option<Value>) -> KeystashResult<Self> {
        match value {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| KeystashError::Json(format!("Invalid backup index: {}", e))),
            None => Ok(Self::default()),
        }
    }

    pub fn to_value(&self) -> KeystashResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Record a backup as present
    pub fn record(&mut self, name: &str, migrated_from: Option<&str>) {
        let now = Utc::now();
        self.backups.insert(
            name.to_string(),
            IndexEntry {
                updated_at: now,
                migrated_from: migrated_from.map(str::to_string),
            },
        );
        self.updated_at = now;
    }

    /// Drop a backup from the index; returns whether it was present
    pub fn remove(&mut self, name: &str) -> bool {
        let removed = self.backups.remove(name).is_some();
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.backups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backups.is_empty()
    }

    /// Load the index of a base path
    pub async fn load(provider: &dyn StorageProvider, base_path: &str) -> KeystashResult<Self> {
        Self::from_value(provider.get_metadata(base_path).await?)
    }

    /// Persist the index of a base path
    pub async fn save(
        &self,
        provider: &dyn StorageProvider,
        base_path: &str,
    ) -> KeystashResult<()> {
        provider.store_metadata(base_path, &self.to_value()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorageProvider;
    use serde_json::json;

    #[test]
    fn test_missing_document_is_empty() {
        let index = BackupIndex::from_value(None).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.schema_version, 1);
    }

    #[test]
    fn test_invalid_document() {
        let err = BackupIndex::from_value(Some(json!({ "backups": 3 }))).unwrap_err();
        assert!(matches!(err, KeystashError::Json(_)));
    }

    #[test]
    fn test_record_and_remove() {
        let mut index = BackupIndex::default();
        index.record("daily", Some("users/alice-laptop-alice"));
        index.record("weekly", None);

        assert_eq!(index.len(), 2);
        assert_eq!(
            index.backups["daily"].migrated_from.as_deref(),
            Some("users/alice-laptop-alice")
        );

        assert!(index.remove("daily"));
        assert!(!index.remove("daily"));
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn test_load_and_save() {
        let store = MemoryStorageProvider::new();
        let mut index = BackupIndex::load(&store, "shared").await.unwrap();
        index.record("daily", None);
        index.save(&store, "shared").await.unwrap();

        let loaded = BackupIndex::load(&store, "shared").await.unwrap();
        assert_eq!(loaded, index);
    }
}
